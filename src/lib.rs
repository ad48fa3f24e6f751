//! Marketplace client: session handling for a multi-vendor marketplace
//!
//! Keeps the signed-in user's tokens, attaches them to API requests,
//! refreshes an expired access token once for all concurrent callers and
//! guards role-specific pages. Built with Leptos for the browser; the same
//! core runs natively on tokio.

pub mod app;
pub mod core;
pub mod ui;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use std::sync::Arc;

    use leptos::prelude::*;

    use crate::app::*;
    use crate::core::ClientConfig;
    use crate::core::auth::AuthService;
    use crate::core::http::{ApiClient, FetchTransport};
    use crate::core::navigation::BrowserNavigator;
    use crate::core::session::{BrowserStorage, SessionStore};

    let config = ClientConfig::default();
    let store = Arc::new(SessionStore::new(Arc::new(BrowserStorage)));
    let client = ApiClient::new(
        Arc::new(FetchTransport::new(&config)),
        store,
        Arc::new(BrowserNavigator),
    )
    .with_refresh_skew(config.refresh_skew_secs);
    let service = AuthService::new(client);
    let verify = config.verify_on_startup;

    leptos::mount::mount_to_body(move || view! { <App service=service.clone() verify=verify /> });
}
