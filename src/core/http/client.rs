//! Authenticated API client
//!
//! Attaches the current access token to every request and recovers from an
//! expired token without the caller noticing: on a 401 it refreshes through
//! the [`RefreshCoordinator`], then resends the request exactly once. When
//! the refresh is refused the session is cleared, the user is sent to the
//! login page and [`ApiError::SessionExpired`] is returned.

use std::sync::Arc;

use futures::future::{AbortRegistration, Abortable};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::refresh::{RefreshCoordinator, RefreshError};
use super::retry::{self, Attempt, Next};
use super::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::core::auth::{AuthApi, jwt};
use crate::core::navigation::Navigator;
use crate::core::routes;
use crate::core::session::SessionStore;

/// Shared HTTP client; cheap to clone
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    store: Arc<SessionStore>,
    coordinator: Arc<RefreshCoordinator>,
    navigator: Arc<dyn Navigator>,
    auth: AuthApi,
    refresh_skew_secs: Option<i64>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let auth = AuthApi::new(Arc::clone(&transport));
        let coordinator = Arc::new(RefreshCoordinator::new(Arc::clone(&store), auth.clone()));

        Self {
            transport,
            store,
            coordinator,
            navigator,
            auth,
            refresh_skew_secs: None,
        }
    }

    /// Refresh before sending when the access token is a JWT expiring within `secs`
    pub fn with_refresh_skew(mut self, secs: i64) -> Self {
        self.refresh_skew_secs = Some(secs);
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn auth_api(&self) -> &AuthApi {
        &self.auth
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Send a request, refreshing the access token at most once
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut request = request;
        let mut attempt = Attempt::First;

        self.refresh_if_expiring().await?;

        loop {
            let token = self.store.access_token();
            request.bearer = token.clone();

            tracing::debug!(
                request_id = %request.id,
                authenticated = token.is_some(),
                "{} {}",
                request.method,
                request.path
            );

            let response = self.transport.execute(&request).await?;

            match retry::decide(response.status, attempt, token.is_some()) {
                Next::Deliver if response.is_success() => return Ok(response),
                Next::Deliver => return Err(ApiError::from_response(response)),
                Next::Fail => {
                    tracing::warn!(request_id = %request.id, "Request rejected after token refresh");
                    return Err(ApiError::from_response(response));
                }
                Next::RefreshAndRetry => {
                    attempt = Attempt::Retried;
                    tracing::debug!(request_id = %request.id, "Access token rejected, refreshing");

                    if let Err(failure) = self.coordinator.refresh(token.as_deref()).await {
                        return Err(self.refresh_failed(failure));
                    }
                }
            }
        }
    }

    /// [`send`](Self::send), abandoned when `registration`'s handle is aborted.
    ///
    /// An aborted request yields [`ApiError::Cancelled`]; its response, if
    /// any arrives, is dropped unread.
    pub async fn send_with_abort(
        &self,
        request: ApiRequest,
        registration: AbortRegistration,
    ) -> Result<ApiResponse, ApiError> {
        match Abortable::new(self.send(request), registration).await {
            Ok(result) => result,
            Err(_aborted) => Err(ApiError::Cancelled),
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::json(Method::Post, path, body)?)
            .await?
            .json()
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::json(Method::Patch, path, body)?)
            .await?
            .json()
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// Refresh ahead of the request when the token is about to expire.
    ///
    /// A refused refresh ends the session and the request is not sent. A
    /// network failure lets the request go out with the current token.
    async fn refresh_if_expiring(&self) -> Result<(), ApiError> {
        let Some(skew) = self.refresh_skew_secs else {
            return Ok(());
        };
        let Some(token) = self.store.access_token() else {
            return Ok(());
        };
        if !jwt::is_expiring(&token, skew) {
            return Ok(());
        }

        tracing::debug!("Access token about to expire, refreshing ahead of request");
        match self.coordinator.refresh(Some(&token)).await {
            Ok(_) => Ok(()),
            Err(RefreshError::Transport(e)) => {
                tracing::debug!("Proactive refresh failed: {}", e);
                Ok(())
            }
            Err(failure) => Err(self.refresh_failed(failure)),
        }
    }

    /// Apply the failure policy and pick the error for the caller
    fn refresh_failed(&self, failure: RefreshError) -> ApiError {
        match failure {
            RefreshError::Transport(e) => ApiError::Transport(e),
            failure => {
                if self.store.clear_session() {
                    tracing::info!("Session ended after failed refresh: {}", failure);
                    self.navigator.navigate(routes::LOGIN);
                }
                ApiError::SessionExpired
            }
        }
    }
}
