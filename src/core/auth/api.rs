//! Auth endpoints
//!
//! Thin wrappers over the server's auth routes. These calls bypass the
//! refreshing client: a 401 here is an answer, not a trigger.
//!
//! - POST /auth/login - exchange credentials for a session
//! - POST /auth/register - create a buyer or vendor account
//! - POST /auth/token/refresh - trade the refresh token for a new access token
//! - POST /auth/token/verify - check a token (startup sanity check)
//! - POST /auth/logout - invalidate the refresh token (best effort)
//! - GET /users/me - current user for a given access token

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::http::{ApiError, ApiRequest, ApiResponse, Method, Transport};
use crate::core::session::{Role, TokenPair, UserSummary};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const REFRESH_PATH: &str = "/auth/token/refresh";
pub const VERIFY_PATH: &str = "/auth/token/verify";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const CURRENT_USER_PATH: &str = "/users/me";

/// Login request
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip)]
    pub password_confirmation: String,
    pub display_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_description: Option<String>,
}

/// Minimum password length accepted by the registration form
pub const MIN_PASSWORD_LENGTH: usize = 6;

impl RegisterRequest {
    /// Client-side checks run before anything is sent.
    ///
    /// Returns field name to messages, empty when the form is valid.
    pub fn validate(&self) -> std::collections::BTreeMap<String, Vec<String>> {
        let mut errors = std::collections::BTreeMap::new();
        let mut push = |field: &str, message: &str| {
            errors
                .entry(field.to_string())
                .or_insert_with(Vec::new)
                .push(message.to_string());
        };

        if !self.email.contains('@') {
            push("email", "Invalid email address");
        }
        if self.display_name.trim().is_empty() {
            push("displayName", "Full name is required");
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            push("password", "Password must be at least 6 characters");
        }
        if self.password != self.password_confirmation {
            push("passwordConfirmation", "Passwords don't match");
        }
        if !self.role.is_self_service() {
            push("role", "Accounts can only be created as buyer or vendor");
        }
        if self.role == Role::Vendor {
            let missing = |value: &Option<String>| {
                value.as_deref().is_none_or(|v| v.trim().is_empty())
            };
            if missing(&self.store_name) || missing(&self.store_description) {
                push("storeName", "Store information is required for vendors");
            }
        }
        errors
    }
}

/// Tokens (and usually the user) returned by login or registration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthGrant {
    #[serde(alias = "access", alias = "access_token")]
    pub access_token: String,
    #[serde(alias = "refresh", alias = "refresh_token")]
    pub refresh_token: String,
    #[serde(default)]
    pub user: Option<UserSummary>,
}

impl AuthGrant {
    pub fn tokens(&self) -> TokenPair {
        TokenPair::new(self.access_token.clone(), self.refresh_token.clone())
    }
}

/// Refresh request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Refresh response: a new access token, or a rotated pair
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshGrant {
    #[serde(alias = "access", alias = "access_token")]
    pub access_token: String,
    #[serde(default, alias = "refresh", alias = "refresh_token")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

/// Unauthenticated access to the auth routes
#[derive(Clone)]
pub struct AuthApi {
    transport: Arc<dyn Transport>,
}

impl AuthApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        tracing::debug!(request_id = %request.id, "{} {}", request.method, request.path);

        let response = self.transport.execute(&request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_response(response))
        }
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthGrant, ApiError> {
        self.send(ApiRequest::json(Method::Post, LOGIN_PATH, credentials)?)
            .await?
            .json()
    }

    /// Register an account. Servers that sign the user in right away return
    /// a grant; others answer with the created profile only.
    pub async fn register(&self, form: &RegisterRequest) -> Result<Option<AuthGrant>, ApiError> {
        let response = self
            .send(ApiRequest::json(Method::Post, REGISTER_PATH, form)?)
            .await?;
        Ok(response.json::<AuthGrant>().ok())
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshGrant, ApiError> {
        let body = RefreshRequest { refresh_token };
        self.send(ApiRequest::json(Method::Post, REFRESH_PATH, &body)?)
            .await?
            .json()
    }

    /// `Ok(false)` when the server rejects the token, `Err` when it can't be asked
    pub async fn verify(&self, token: &str) -> Result<bool, ApiError> {
        let body = VerifyRequest { token };
        match self
            .send(ApiRequest::json(Method::Post, VERIFY_PATH, &body)?)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_client_error() => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<(), ApiError> {
        let body = RefreshRequest { refresh_token };
        self.send(ApiRequest::json(Method::Post, LOGOUT_PATH, &body)?)
            .await?;
        Ok(())
    }

    /// Fetch the profile belonging to a freshly issued access token
    pub async fn current_user(&self, access_token: &str) -> Result<UserSummary, ApiError> {
        let mut request = ApiRequest::get(CURRENT_USER_PATH);
        request.bearer = Some(access_token.to_string());
        self.send(request).await?.json()
    }
}
