pub mod auth;
pub mod common;

pub use auth::{AuthContext, LoginForm, ProtectedRoute, provide_auth_context, use_auth_context};
