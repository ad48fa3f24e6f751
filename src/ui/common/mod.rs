//! Common reusable UI components

pub mod spinner;

pub use spinner::{LoadingSpinner, Spinner, SpinnerSize};
