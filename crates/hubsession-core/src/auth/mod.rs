//! Authentication module for managing the API session and its credential.
//!
//! This module provides:
//! - `SessionController`: the sign-in state machine (login, restore, logout)
//! - `Credentials`: validated username/password, turned into a Basic header once
//! - `CredentialStore`: single-slot token persistence, with keychain,
//!   encrypted-file and in-memory backends
//!
//! Only the bearer token is persisted. Passwords never leave memory.

pub mod credentials;
pub mod error;
pub mod file_store;
pub mod session;
pub mod store;

pub use credentials::Credentials;
pub use error::{Rejection, SessionError, SessionResult, StoreError};
pub use file_store::EncryptedFileStore;
pub use session::{SessionController, SessionPolicy, SessionState};
pub use store::{CredentialStore, KeyringStore, MemoryStore};
