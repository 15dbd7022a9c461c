//! Session and credential handling.
//!
//! This module provides:
//! - `SessionStore`: the single owner of the persisted token + user pair
//! - `CredentialStore`: opt-in OS keychain storage for "remember me"
//!
//! Sessions are persisted to disk on every change and rehydrated (with
//! validation) at startup.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{SessionData, SessionStore};
