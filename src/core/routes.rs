//! Client-side paths and post-login routing

use url::form_urlencoded;

use crate::core::session::{Role, UserSummary};

pub const HOME: &str = "/";
pub const LOGIN: &str = "/login";
pub const REGISTER: &str = "/register";
pub const ADMIN_DASHBOARD: &str = "/administrator";
pub const VENDOR_DASHBOARD: &str = "/vendor/dashboard";
pub const VENDOR_PENDING_VERIFICATION: &str = "/vendor/pending-verification";

/// Query parameter carrying the location to return to after login
pub const RETURN_PARAM: &str = "next";

/// Role-specific landing page
pub fn landing_for(user: &UserSummary) -> &'static str {
    match user.role {
        Role::Administrator => ADMIN_DASHBOARD,
        Role::Vendor if !user.is_verified => VENDOR_PENDING_VERIFICATION,
        Role::Vendor => VENDOR_DASHBOARD,
        Role::Buyer => HOME,
    }
}

/// Where to go after a successful login: the remembered location if it is
/// a usable local path, otherwise the role's landing page.
pub fn post_login_target(user: &UserSummary, from: Option<&str>) -> String {
    match from.filter(|path| is_return_target(path)) {
        Some(path) => path.to_string(),
        None => landing_for(user).to_string(),
    }
}

/// Login URL that remembers `from`
pub fn login_with_return(from: &str) -> String {
    if !is_return_target(from) {
        return LOGIN.to_string();
    }
    let encoded: String = form_urlencoded::byte_serialize(from.as_bytes()).collect();
    format!("{}?{}={}", LOGIN, RETURN_PARAM, encoded)
}

/// Extract the remembered location from a login page query string
pub fn return_target_from_query(query: &str) -> Option<String> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(key, _)| key == RETURN_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|path| is_return_target(path))
}

/// Local, non-auth path: starts with a single `/` and is not the home or
/// login page (returning there would be pointless). Backslashes are refused
/// since browsers read `/\host` as `//host`.
fn is_return_target(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && path != HOME
        && path != LOGIN
        && !path.starts_with("/login?")
}
