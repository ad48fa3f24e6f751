//! Role-gated route guard
//!
//! Decides, before a protected view renders, whether to show it, wait, or
//! send the user elsewhere. A role mismatch is a silent redirect to the
//! landing page, not an error.

use crate::core::routes;
use crate::core::session::{Role, SessionState};

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not determined yet; show a loading indicator
    Pending,
    /// Render the view
    Allow,
    /// No session: go to login, remembering where the user wanted to go
    RedirectToLogin { from: String, target: String },
    /// Signed in with the wrong role
    RedirectToLanding { target: &'static str },
}

impl GuardDecision {
    /// Path to redirect to, if any
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            GuardDecision::RedirectToLogin { target, .. } => Some(target),
            GuardDecision::RedirectToLanding { target } => Some(target),
            GuardDecision::Pending | GuardDecision::Allow => None,
        }
    }
}

/// Guard for one protected view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteGuard {
    required_role: Option<Role>,
}

impl RouteGuard {
    /// Any signed-in user
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Only users with `role`
    pub fn require(role: Role) -> Self {
        Self {
            required_role: Some(role),
        }
    }

    pub fn required_role(&self) -> Option<Role> {
        self.required_role
    }

    /// Check `state` for a visit to `location` (path plus optional query)
    pub fn check(&self, state: &SessionState, location: &str) -> GuardDecision {
        let session = match state {
            SessionState::Loading => return GuardDecision::Pending,
            SessionState::Anonymous => {
                return GuardDecision::RedirectToLogin {
                    from: location.to_string(),
                    target: routes::login_with_return(location),
                };
            }
            SessionState::Active(session) => session,
        };

        match self.required_role {
            Some(role) if session.user.role != role => {
                tracing::debug!(
                    "Route {} requires {}, user is {}",
                    location,
                    role,
                    session.user.role
                );
                GuardDecision::RedirectToLanding {
                    target: routes::HOME,
                }
            }
            _ => GuardDecision::Allow,
        }
    }
}
