//! Authentication for the file store.
//!
//! This module owns the credential state shared by every request (opaque
//! token or username/password fallback) and the login exchange that refreshes
//! the token when the store rejects it.

pub mod credentials;
pub mod manager;

pub use credentials::CredentialStore;
pub use manager::AuthManager;
