//! Client session: data model, durable storage and the reactive store
//!
//! All token reads and writes in the crate go through [`SessionStore`].

mod model;
mod storage;
mod store;

pub use model::{Role, Session, SessionState, TokenPair, UnknownRole, UserSummary};
#[cfg(feature = "hydrate")]
pub use storage::BrowserStorage;
pub use storage::{
    ACCESS_TOKEN_KEY, MemoryStorage, REFRESH_TOKEN_KEY, StorageError, TokenStorage, USER_KEY,
};
pub use store::{SessionStore, StoreError};
