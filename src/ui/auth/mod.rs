//! Authentication UI module
//!
//! Session context, the login form and the role-gated route wrapper.

mod context;
mod login_form;
mod protected_route;

pub use context::{AuthContext, provide_auth_context, use_auth_context};
pub use login_form::LoginForm;
pub use protected_route::ProtectedRoute;
