//! HTTP layer: transport seam, authenticated client and token refresh

mod client;
mod error;
mod refresh;
mod retry;
mod transport;

pub use client::ApiClient;
pub use error::{ApiError, ErrorDetails};
pub use refresh::{RefreshCoordinator, RefreshError, RefreshOutcome};
pub use retry::{Attempt, Next, decide};
#[cfg(feature = "hydrate")]
pub use transport::FetchTransport;
#[cfg(feature = "native")]
pub use transport::ReqwestTransport;
pub use transport::{ApiRequest, ApiResponse, Method, RequestId, Transport, TransportError};
