//! Authentication service
//!
//! User-facing flows on top of the session store and the API client:
//! login, registration, logout, startup restore and the current profile.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::auth::api::{CURRENT_USER_PATH, LoginRequest, RegisterRequest};
use crate::core::auth::jwt;
use crate::core::http::{ApiClient, ApiError};
use crate::core::routes;
use crate::core::session::{Session, SessionState, SessionStore, StoreError, TokenPair, UserSummary};

/// Authentication service error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{message}")]
    InvalidCredentials { message: String },

    #[error("{message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    /// The session ended because its token could not be refreshed
    #[error("Your session has expired. Please sign in again.")]
    SessionExpired,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error(transparent)]
    Api(ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::SessionExpired => AuthError::SessionExpired,
            err => AuthError::Api(err),
        }
    }
}

impl AuthError {
    /// Messages for one form field
    pub fn field_errors(&self, field: &str) -> &[String] {
        match self {
            AuthError::Validation { fields, .. } => {
                fields.get(field).map(Vec::as_slice).unwrap_or_default()
            }
            _ => &[],
        }
    }
}

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_REGISTRATION: &str = "Please correct the highlighted fields";

/// Result of a successful registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The server signed the new user in
    SignedIn(Session),
    /// Account created; the user has to log in
    LoginRequired,
}

impl RegistrationOutcome {
    /// Where the client goes next
    pub fn target(&self) -> String {
        match self {
            RegistrationOutcome::SignedIn(session) => routes::post_login_target(&session.user, None),
            RegistrationOutcome::LoginRequired => routes::LOGIN.to_string(),
        }
    }
}

/// Fields a user may change on their own profile
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_description: Option<String>,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn store(&self) -> &SessionStore {
        self.client.store()
    }

    /// Sign in with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let credentials = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let grant = match self.client.auth_api().login(&credentials).await {
            Ok(grant) => grant,
            Err(e) if e.is_client_error() => {
                tracing::info!("Login rejected for {}", credentials.email);
                let message = e
                    .details()
                    .first_message()
                    .unwrap_or(INVALID_CREDENTIALS)
                    .to_string();
                return Err(AuthError::InvalidCredentials { message });
            }
            Err(e) => return Err(e.into()),
        };

        let tokens = grant.tokens();
        let user = match grant.user {
            Some(user) => user,
            None => self.resolve_user(&tokens).await?,
        };

        let session = Session::new(tokens, user);
        self.store().set_session(session.clone())?;

        tracing::info!("User {} logged in as {}", session.user.email, session.user.role);
        Ok(session)
    }

    /// Create an account. Form errors are reported before anything is sent.
    pub async fn register(&self, form: &RegisterRequest) -> Result<RegistrationOutcome, AuthError> {
        let fields = form.validate();
        if !fields.is_empty() {
            return Err(AuthError::Validation {
                message: INVALID_REGISTRATION.to_string(),
                fields,
            });
        }

        let grant = match self.client.auth_api().register(form).await {
            Ok(grant) => grant,
            Err(e) if e.is_client_error() => {
                let details = e.details();
                return Err(AuthError::Validation {
                    message: details
                        .first_message()
                        .unwrap_or(INVALID_REGISTRATION)
                        .to_string(),
                    fields: details.fields,
                });
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!("Registered {} as {}", form.email, form.role);

        let Some(grant) = grant else {
            self.client.navigator().navigate(routes::LOGIN);
            return Ok(RegistrationOutcome::LoginRequired);
        };

        let tokens = grant.tokens();
        let user = match grant.user {
            Some(user) => user,
            None => self.resolve_user(&tokens).await?,
        };
        let session = Session::new(tokens, user);
        self.store().set_session(session.clone())?;

        Ok(RegistrationOutcome::SignedIn(session))
    }

    /// End the session locally and on the server, then go to the login page.
    ///
    /// The server call is best effort; the local session is cleared either way.
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.store().refresh_token() {
            if let Err(e) = self.client.auth_api().logout(&refresh_token).await {
                tracing::warn!("Server logout failed: {}", e);
            }
        }

        self.store().clear_session();
        self.client.navigator().navigate(routes::LOGIN);
    }

    /// Resolve the startup session.
    ///
    /// With `verify` the stored access token is checked by the server first.
    /// A rejected token gets one refresh; an unreachable server keeps the
    /// stored session as it is.
    pub async fn restore(&self, verify: bool) -> SessionState {
        self.store().mark_loading();

        if !verify {
            return self.store().restore();
        }
        let Some(session) = self.store().load_persisted() else {
            return self.store().restore();
        };

        let auth = self.client.auth_api();
        let restored = match auth.verify(&session.access_token).await {
            Ok(true) => Some(session),
            Ok(false) => {
                tracing::info!("Stored access token rejected, refreshing");
                match auth.refresh(&session.refresh_token).await {
                    Ok(grant) => {
                        let tokens = TokenPair::new(
                            grant.access_token,
                            grant.refresh_token.unwrap_or(session.refresh_token),
                        );
                        Some(Session::new(tokens, session.user))
                    }
                    Err(ApiError::Transport(e)) => {
                        tracing::warn!("Refresh at startup failed to reach the server: {}", e);
                        Some(session)
                    }
                    Err(e) => {
                        tracing::info!("Stored session expired: {}", e);
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Could not verify stored session, keeping it: {}", e);
                Some(session)
            }
        };

        match restored {
            Some(session) => {
                if let Err(e) = self.store().set_session(session) {
                    tracing::error!("Failed to restore session: {}", e);
                    self.store().clear_session();
                }
            }
            None => {
                self.store().clear_session();
            }
        }
        self.store().state()
    }

    /// Fetch the signed-in user's profile and refresh the stored summary
    pub async fn current_user(&self) -> Result<UserSummary, AuthError> {
        if !self.store().is_authenticated() {
            return Err(AuthError::NotAuthenticated);
        }

        let user: UserSummary = self.client.get_json(CURRENT_USER_PATH).await?;
        self.store().update_user(user.clone())?;
        Ok(user)
    }

    /// Change the signed-in user's profile
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserSummary, AuthError> {
        if !self.store().is_authenticated() {
            return Err(AuthError::NotAuthenticated);
        }

        let user: UserSummary = match self.client.patch_json(CURRENT_USER_PATH, update).await {
            Ok(user) => user,
            Err(e) if e.is_client_error() && !e.is_unauthorized() => {
                let details = e.details();
                return Err(AuthError::Validation {
                    message: details
                        .first_message()
                        .unwrap_or("Profile update rejected")
                        .to_string(),
                    fields: details.fields,
                });
            }
            Err(e) => return Err(e.into()),
        };

        self.store().update_user(user.clone())?;
        tracing::info!("Profile updated for {}", user.email);
        Ok(user)
    }

    /// Redirect target after login
    pub fn post_login_target(&self, user: &UserSummary, from: Option<&str>) -> String {
        routes::post_login_target(user, from)
    }

    async fn resolve_user(&self, tokens: &TokenPair) -> Result<UserSummary, AuthError> {
        if let Some(user) = jwt::user_from_access_token(&tokens.access_token) {
            return Ok(user);
        }
        tracing::debug!("No user in grant, fetching profile");
        Ok(self.client.auth_api().current_user(&tokens.access_token).await?)
    }
}
