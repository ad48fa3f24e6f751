//! Command-line sign-in check for a marketplace API.
//!
//! Signs in with `MARKETPLACE_EMAIL` / `MARKETPLACE_PASSWORD`, prints where
//! the web client would land, then optionally fetches
//! `MARKETPLACE_FETCH_PATH` through the authenticated client.

use std::sync::Arc;

use marketplace_client::core::ClientConfig;
use marketplace_client::core::auth::AuthService;
use marketplace_client::core::http::{ApiClient, ReqwestTransport};
use marketplace_client::core::navigation::RecordingNavigator;
use marketplace_client::core::session::{MemoryStorage, SessionStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(
        "Config loaded: api={}, timeout={}s, refresh_skew={}s",
        config.api_base_url,
        config.request_timeout_secs,
        config.refresh_skew_secs
    );

    let email = std::env::var("MARKETPLACE_EMAIL")
        .map_err(|_| "MARKETPLACE_EMAIL is not set")?;
    let password = std::env::var("MARKETPLACE_PASSWORD")
        .map_err(|_| "MARKETPLACE_PASSWORD is not set")?;

    let transport = Arc::new(ReqwestTransport::new(&config)?);
    let store = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
    store.restore();
    let navigator = Arc::new(RecordingNavigator::new());

    let client = ApiClient::new(transport, store, navigator.clone())
        .with_refresh_skew(config.refresh_skew_secs);
    let auth = AuthService::new(client.clone());

    let session = auth.login(&email, &password).await?;
    println!(
        "Signed in as {} <{}> ({})",
        session.user.display_name, session.user.email, session.user.role
    );
    println!("Landing page: {}", auth.post_login_target(&session.user, None));

    if let Ok(path) = std::env::var("MARKETPLACE_FETCH_PATH") {
        let body: serde_json::Value = client.get_json(&path).await?;
        println!("{}", serde_json::to_string_pretty(&body)?);
    }

    for visit in navigator.visits() {
        tracing::warn!("Client was redirected to {}", visit);
    }

    Ok(())
}
