//! Session store
//!
//! Single owner of the client session. Holds the current [`SessionState`]
//! in a watch channel so views can subscribe, and mirrors it to durable
//! storage. Storage writes run inside the channel's write lock, so the
//! token pair is never observed half-written.

use std::sync::Arc;

use tokio::sync::watch;

use super::model::{Session, SessionState, TokenPair, UserSummary};
use super::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, StorageError, TokenStorage, USER_KEY};
use crate::core::auth::jwt;

/// Session store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Session is malformed: {0}")]
    Malformed(&'static str),

    #[error("No active session")]
    NoSession,
}

/// Holds the current session and persists it
pub struct SessionStore {
    state: watch::Sender<SessionState>,
    storage: Arc<dyn TokenStorage>,
}

impl SessionStore {
    /// Create a store in the `Loading` state; call [`restore`](Self::restore) to resolve it
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self { state, storage }
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    pub fn user(&self) -> Option<UserSummary> {
        self.state.borrow().user().cloned()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().access_token().map(str::to_string)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state
            .borrow()
            .session()
            .map(|s| s.refresh_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_active()
    }

    /// Replace the session and persist both tokens in the same call
    pub fn set_session(&self, session: Session) -> Result<(), StoreError> {
        if !session.is_well_formed() {
            return Err(StoreError::Malformed("token pair"));
        }

        let mut result = Ok(());
        self.state.send_if_modified(|state| {
            match persist(self.storage.as_ref(), &session) {
                Ok(()) => {
                    *state = SessionState::Active(session);
                    true
                }
                Err(e) => {
                    result = Err(e.into());
                    false
                }
            }
        });

        if result.is_ok() {
            tracing::debug!("Session stored");
        }
        result
    }

    /// Swap in refreshed tokens, keeping the current user
    pub fn update_tokens(&self, tokens: TokenPair) -> Result<(), StoreError> {
        if !tokens.is_well_formed() {
            return Err(StoreError::Malformed("token pair"));
        }

        let mut result = Err(StoreError::NoSession);
        self.state.send_if_modified(|state| {
            let SessionState::Active(current) = state else {
                return false;
            };
            let next = Session::new(tokens, current.user.clone());
            match persist(self.storage.as_ref(), &next) {
                Ok(()) => {
                    *current = next;
                    result = Ok(());
                    true
                }
                Err(e) => {
                    result = Err(e.into());
                    false
                }
            }
        });
        result
    }

    /// Replace the user of the active session (profile update)
    pub fn update_user(&self, user: UserSummary) -> Result<(), StoreError> {
        let mut result = Err(StoreError::NoSession);
        self.state.send_if_modified(|state| {
            let SessionState::Active(current) = state else {
                return false;
            };
            if let Err(e) = write_user(self.storage.as_ref(), &user) {
                tracing::warn!("Failed to persist user summary: {}", e);
            }
            current.user = user;
            result = Ok(());
            true
        });
        result
    }

    /// Remove the session from memory and storage.
    ///
    /// Safe to call repeatedly. Returns `true` only when an active session
    /// was actually ended by this call.
    pub fn clear_session(&self) -> bool {
        let mut ended = false;
        self.state.send_if_modified(|state| {
            wipe(self.storage.as_ref());
            ended = state.is_active();
            if matches!(state, SessionState::Anonymous) {
                return false;
            }
            *state = SessionState::Anonymous;
            true
        });

        if ended {
            tracing::info!("Session cleared");
        }
        ended
    }

    /// Enter the `Loading` sub-state while startup verification runs
    pub fn mark_loading(&self) {
        self.state.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            *state = SessionState::Loading;
            true
        });
    }

    /// Read the persisted session without publishing it.
    ///
    /// A half-populated or unreadable pair is wiped from storage.
    pub fn load_persisted(&self) -> Option<Session> {
        let access = self.storage.get(ACCESS_TOKEN_KEY);
        let refresh = self.storage.get(REFRESH_TOKEN_KEY);

        let tokens = match (access, refresh) {
            (Ok(None), Ok(None)) => {
                let _ = self.storage.remove(USER_KEY);
                return None;
            }
            (Ok(Some(access)), Ok(Some(refresh))) => TokenPair::new(access, refresh),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Session storage unreadable: {}", e);
                return None;
            }
            _ => {
                tracing::warn!("Discarding half-populated session from storage");
                wipe(self.storage.as_ref());
                return None;
            }
        };

        if !tokens.is_well_formed() {
            tracing::warn!("Discarding malformed token pair from storage");
            wipe(self.storage.as_ref());
            return None;
        }

        let user = self
            .stored_user()
            .or_else(|| jwt::user_from_access_token(&tokens.access_token));

        match user {
            Some(user) => Some(Session::new(tokens, user)),
            None => {
                tracing::warn!("Stored session has no readable user, discarding");
                wipe(self.storage.as_ref());
                None
            }
        }
    }

    /// Resolve the startup state from storage and publish it
    pub fn restore(&self) -> SessionState {
        match self.load_persisted() {
            Some(session) => {
                self.state.send_replace(SessionState::Active(session));
            }
            None => {
                self.state.send_replace(SessionState::Anonymous);
            }
        }
        self.state()
    }

    fn stored_user(&self) -> Option<UserSummary> {
        let raw = self.storage.get(USER_KEY).ok()??;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Stored user summary is unreadable: {}", e);
                None
            }
        }
    }
}

/// Write both tokens, rolling back the access token if the refresh token fails
fn persist(storage: &dyn TokenStorage, session: &Session) -> Result<(), StorageError> {
    let previous_access = storage.get(ACCESS_TOKEN_KEY).ok().flatten();

    storage.set(ACCESS_TOKEN_KEY, &session.access_token)?;
    if let Err(e) = storage.set(REFRESH_TOKEN_KEY, &session.refresh_token) {
        let rollback = match previous_access {
            Some(previous) => storage.set(ACCESS_TOKEN_KEY, &previous),
            None => storage.remove(ACCESS_TOKEN_KEY),
        };
        if let Err(rollback_err) = rollback {
            tracing::error!("Failed to roll back access token: {}", rollback_err);
        }
        return Err(e);
    }

    if let Err(e) = write_user(storage, &session.user) {
        tracing::warn!("Failed to persist user summary: {}", e);
    }
    Ok(())
}

fn write_user(storage: &dyn TokenStorage, user: &UserSummary) -> Result<(), StorageError> {
    let json = serde_json::to_string(user).map_err(|e| StorageError::Write {
        key: USER_KEY.to_string(),
        reason: e.to_string(),
    })?;
    storage.set(USER_KEY, &json)
}

fn wipe(storage: &dyn TokenStorage) {
    for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
        if let Err(e) = storage.remove(key) {
            tracing::warn!("Failed to remove {} from storage: {}", key, e);
        }
    }
}
