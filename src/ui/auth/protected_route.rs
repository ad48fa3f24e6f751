//! Route wrapper that only renders its children for signed-in users
//! with the required role

use leptos::prelude::*;
use leptos_router::components::Redirect;
use leptos_router::hooks::use_location;

use super::context::use_auth_context;
use crate::core::guard::{GuardDecision, RouteGuard};
use crate::core::routes;
use crate::core::session::Role;
use crate::ui::common::LoadingSpinner;

/// Protected route component
///
/// Shows a spinner while the session is being resolved, sends anonymous
/// visitors to the login page (remembering where they were going) and users
/// with another role to the landing page.
#[component]
pub fn ProtectedRoute(
    /// Role required to see the content; any signed-in user when omitted
    #[prop(optional)]
    role: Option<Role>,
    children: ChildrenFn,
) -> impl IntoView {
    let auth = use_auth_context();
    let location = use_location();
    let guard = role.map(RouteGuard::require).unwrap_or_default();

    let decision = Memo::new(move |_| {
        let path = location.pathname.get();
        let search = location.search.get();
        let search = search.trim_start_matches('?');
        let here = if search.is_empty() {
            path
        } else {
            format!("{}?{}", path, search)
        };
        auth.state.with(|state| guard.check(state, &here))
    });

    move || match decision.get() {
        GuardDecision::Pending => view! {
            <LoadingSpinner message="Checking your session...".to_string() />
        }
        .into_any(),
        GuardDecision::Allow => children().into_any(),
        redirect => {
            let target = redirect.redirect_target().unwrap_or(routes::LOGIN).to_string();
            view! { <Redirect path=target /> }.into_any()
        }
    }
}
