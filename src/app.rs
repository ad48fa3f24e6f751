use leptos::prelude::*;
use leptos_router::components::{A, Route, Router, Routes};
use leptos_router::hooks::use_navigate;
use leptos_router::path;

use crate::core::auth::AuthService;
use crate::core::session::Role;
use crate::ui::{LoginForm, ProtectedRoute, provide_auth_context, use_auth_context};

#[component]
pub fn App(
    /// Auth service wired to the browser backends
    service: AuthService,
    /// Check a restored token with the server before trusting it
    #[prop(default = true)]
    verify: bool,
) -> impl IntoView {
    provide_auth_context(service, verify);

    view! {
        <Router>
            <main class="w-full min-h-screen bg-theme-primary">
                <Routes fallback=|| view! { <p class="p-8">"Page not found."</p> }>
                    <Route path=path!("/") view=HomePage />
                    <Route path=path!("/login") view=LoginPage />
                    <Route
                        path=path!("/administrator")
                        view=|| view! {
                            <ProtectedRoute role=Role::Administrator>
                                <Welcome title="Administration" />
                            </ProtectedRoute>
                        }
                    />
                    <Route
                        path=path!("/vendor/dashboard")
                        view=|| view! {
                            <ProtectedRoute role=Role::Vendor>
                                <Welcome title="Vendor dashboard" />
                            </ProtectedRoute>
                        }
                    />
                    <Route
                        path=path!("/vendor/pending-verification")
                        view=|| view! {
                            <ProtectedRoute role=Role::Vendor>
                                <p class="p-8">
                                    "Your store is waiting for approval by an administrator."
                                </p>
                            </ProtectedRoute>
                        }
                    />
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn HomePage() -> impl IntoView {
    let auth = use_auth_context();

    view! {
        <div class="p-8 space-y-4">
            <h1 class="text-2xl font-bold text-theme-primary">"Marketplace"</h1>
            {move || match auth.user() {
                Some(user) => view! {
                    <p>"Signed in as " {user.display_name} " (" {user.role.to_string()} ")"</p>
                    <button
                        class="text-accent-primary"
                        on:click=move |_| {
                            leptos::task::spawn_local(async move { auth.logout().await });
                        }
                    >
                        "Sign out"
                    </button>
                }.into_any(),
                None => view! { <A href="/login">"Sign in"</A> }.into_any(),
            }}
        </div>
    }
}

#[component]
fn LoginPage() -> impl IntoView {
    let auth = use_auth_context();
    let navigate = use_navigate();

    // already signed in: skip the form
    Effect::new(move |_| {
        if let Some(user) = auth.user() {
            navigate(&crate::core::routes::post_login_target(&user, None), Default::default());
        }
    });

    view! {
        <div class="flex items-center justify-center p-4">
            <div class="w-full max-w-md mx-auto rounded-xl shadow-lg p-6 border border-theme">
                <LoginForm />
            </div>
        </div>
    }
}

#[component]
fn Welcome(title: &'static str) -> impl IntoView {
    let auth = use_auth_context();
    let name = move || auth.user().map(|u| u.display_name).unwrap_or_default();

    view! {
        <div class="p-8">
            <h1 class="text-2xl font-bold text-theme-primary">{title}</h1>
            <p class="text-theme-secondary">"Welcome, " {name}</p>
        </div>
    }
}
