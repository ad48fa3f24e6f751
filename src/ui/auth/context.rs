//! Auth context for the component tree
//!
//! Mirrors the session store into a Leptos signal so views re-render when
//! the user signs in or out, and exposes the login and logout actions.

use leptos::prelude::*;
#[cfg(feature = "hydrate")]
use leptos::task::spawn_local;

use crate::core::auth::{AuthError, AuthService};
use crate::core::routes;
use crate::core::session::{SessionState, UserSummary};

/// Auth context providing session state and actions
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// Current session state, kept in sync with the session store
    pub state: RwSignal<SessionState>,
    /// An auth operation is running
    pub loading: RwSignal<bool>,
    /// Error message from the last operation
    pub error: RwSignal<Option<String>>,
    /// The user asked to sign out
    signing_out: RwSignal<bool>,
    service: StoredValue<AuthService, LocalStorage>,
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        self.state.with(SessionState::is_active)
    }

    pub fn user(&self) -> Option<UserSummary> {
        self.state.with(|state| state.user().cloned())
    }

    pub fn clear_error(&self) {
        self.error.set(None);
    }

    pub fn service(&self) -> AuthService {
        self.service.get_value()
    }

    /// Sign in and return where to go next.
    ///
    /// `from` is the location remembered by the route guard. On failure the
    /// message lands in [`error`](Self::error) and `None` is returned.
    pub async fn login(&self, email: String, password: String, from: Option<String>) -> Option<String> {
        self.loading.set(true);
        self.error.set(None);

        let result = self.service().login(&email, &password).await;
        self.loading.set(false);

        match result {
            Ok(session) => Some(routes::post_login_target(&session.user, from.as_deref())),
            Err(e) => {
                self.error.set(Some(error_message(&e)));
                None
            }
        }
    }

    pub async fn logout(&self) {
        self.loading.set(true);
        self.signing_out.set(true);
        self.service().logout().await;
        self.signing_out.set(false);
        self.loading.set(false);
    }
}

/// Notice for a session that ended without the user signing out
#[cfg_attr(not(feature = "hydrate"), allow(dead_code))]
fn expiry_notice(previous: &SessionState, current: &SessionState, signing_out: bool) -> Option<String> {
    let ended = previous.is_active() && matches!(current, SessionState::Anonymous);
    (ended && !signing_out).then(|| AuthError::SessionExpired.to_string())
}

fn error_message(error: &AuthError) -> String {
    match error {
        AuthError::Api(e) if e.is_transport() => {
            "Unable to reach the server. Check your connection and try again.".to_string()
        }
        other => other.to_string(),
    }
}

/// Provide auth context to the component tree.
///
/// In the browser this also follows the session store and resolves the
/// startup session (`verify` asks the server to check a restored token).
pub fn provide_auth_context(service: AuthService, verify: bool) -> AuthContext {
    let state = RwSignal::new(service.store().state());
    let loading = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);
    let signing_out = RwSignal::new(false);

    let ctx = AuthContext {
        state,
        loading,
        error,
        signing_out,
        service: StoredValue::new_local(service),
    };

    #[cfg(feature = "hydrate")]
    {
        let mut changes = ctx.service().store().subscribe();
        spawn_local(async move {
            loop {
                let current = changes.borrow_and_update().clone();
                let previous = state.get_untracked();
                if let Some(notice) = expiry_notice(&previous, &current, signing_out.get_untracked()) {
                    error.set(Some(notice));
                }
                state.set(current);
                if changes.changed().await.is_err() {
                    break;
                }
            }
        });

        spawn_local(async move {
            let restored = ctx.service().restore(verify).await;
            tracing::debug!("Session restored, active: {}", restored.is_active());
        });
    }
    #[cfg(not(feature = "hydrate"))]
    let _ = verify;

    provide_context(ctx);
    ctx
}

/// Get auth context from the component tree
pub fn use_auth_context() -> AuthContext {
    expect_context::<AuthContext>()
}
