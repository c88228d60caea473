//! Credential lifecycle: load from cache, authorize, refresh, persist.

pub mod credential;
pub mod manager;
pub mod store;

pub use credential::{Credential, TokenGrant};
pub use manager::CredentialManager;
pub use store::CredentialStore;
