//! Authentication for the marketplace client
//!
//! - Wire types and calls for the `/auth` routes
//! - Unverified access token decoding
//! - Login, registration, logout and startup restore flows

pub mod api;
pub mod jwt;
pub mod service;

pub use api::{AuthApi, AuthGrant, LoginRequest, RefreshGrant, RegisterRequest};
pub use jwt::{AccessClaims, JwtError};
pub use service::{AuthError, AuthService, ProfileUpdate, RegistrationOutcome};
