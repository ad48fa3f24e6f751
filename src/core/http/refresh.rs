//! Refresh coordinator
//!
//! Coalesces concurrent token refreshes: while one refresh call is in
//! flight every other caller waits on the same shared outcome instead of
//! starting its own. The slot is `None` when idle and holds the shared
//! future while refreshing.

use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{FutureExt, Shared};

use super::error::ApiError;
use super::transport::TransportError;
use crate::core::auth::AuthApi;
use crate::core::session::{SessionStore, StoreError, TokenPair};

/// Why a refresh did not produce a new access token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error("Refresh token was rejected")]
    Rejected,

    #[error("No refresh token available")]
    MissingToken,

    #[error("Session ended while refreshing")]
    SessionEnded,

    #[error("Failed to store refreshed tokens: {0}")]
    Storage(String),

    #[error(transparent)]
    Transport(TransportError),
}

impl RefreshError {
    /// Every failure except a network error is terminal for the session
    pub fn ends_session(&self) -> bool {
        !matches!(self, RefreshError::Transport(_))
    }
}

/// New access token or the reason there is none
pub type RefreshOutcome = Result<String, RefreshError>;

#[cfg(not(target_arch = "wasm32"))]
type RefreshFuture = futures::future::BoxFuture<'static, RefreshOutcome>;
#[cfg(target_arch = "wasm32")]
type RefreshFuture = futures::future::LocalBoxFuture<'static, RefreshOutcome>;

/// Ensures at most one refresh call is outstanding at a time
pub struct RefreshCoordinator {
    store: Arc<SessionStore>,
    auth: AuthApi,
    in_flight: Mutex<Option<Shared<RefreshFuture>>>,
}

impl RefreshCoordinator {
    pub fn new(store: Arc<SessionStore>, auth: AuthApi) -> Self {
        Self {
            store,
            auth,
            in_flight: Mutex::new(None),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Obtain a fresh access token after `stale_token` was rejected.
    ///
    /// If the store already holds a different token, someone refreshed in
    /// the meantime and that token is returned without a network call.
    /// The store is updated before the outcome is published.
    pub async fn refresh(&self, stale_token: Option<&str>) -> RefreshOutcome {
        if let (Some(stale), Some(current)) = (stale_token, self.store.access_token()) {
            if stale != current {
                tracing::debug!("Access token already replaced, reusing it");
                return Ok(current);
            }
        }

        let pending = {
            let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(pending) => {
                    tracing::debug!("Joining in-flight token refresh");
                    pending.clone()
                }
                None => {
                    let pending = self.start();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        let outcome = pending.clone().await;

        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&pending)) {
            *slot = None;
        }

        outcome
    }

    fn start(&self) -> Shared<RefreshFuture> {
        let store = Arc::clone(&self.store);
        let auth = self.auth.clone();

        let refresh: RefreshFuture = Box::pin(async move {
            let Some(refresh_token) = store.refresh_token() else {
                return Err(RefreshError::MissingToken);
            };

            tracing::info!("Refreshing access token");
            let grant = match auth.refresh(&refresh_token).await {
                Ok(grant) => grant,
                Err(ApiError::Transport(e)) => {
                    tracing::warn!("Token refresh failed to reach the server: {}", e);
                    return Err(RefreshError::Transport(e));
                }
                Err(e) => {
                    tracing::error!("Token refresh rejected: {}", e);
                    return Err(RefreshError::Rejected);
                }
            };

            let tokens = TokenPair::new(
                grant.access_token,
                grant.refresh_token.unwrap_or(refresh_token),
            );
            let access_token = tokens.access_token.clone();

            match store.update_tokens(tokens) {
                Ok(()) => {
                    tracing::info!("Access token refreshed");
                    Ok(access_token)
                }
                Err(StoreError::NoSession) => Err(RefreshError::SessionEnded),
                Err(e) => {
                    tracing::error!("Failed to store refreshed tokens: {}", e);
                    Err(RefreshError::Storage(e.to_string()))
                }
            }
        });

        refresh.shared()
    }
}
