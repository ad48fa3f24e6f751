//! Session, authentication and HTTP plumbing for the marketplace client

pub mod auth;
pub mod config;
pub mod guard;
pub mod http;
pub mod navigation;
pub mod routes;
pub mod session;

pub use config::{ClientConfig, ConfigError};
pub use guard::{GuardDecision, RouteGuard};
pub use navigation::{Navigator, RecordingNavigator};
