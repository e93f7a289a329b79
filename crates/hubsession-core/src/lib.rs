//! Sign-in session lifecycle for GitHub-style REST APIs.
//!
//! The crate exchanges a username/password for a scoped API token, keeps
//! that token in a credential store, proves it works by fetching the
//! account, and drops it as soon as the API rejects it.
//!
//! Wire it up once at the composition root:
//!
//! ```no_run
//! use std::sync::Arc;
//! use hubsession_core::{ApiClient, Config, MemoryStore, SessionController};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let api = Arc::new(ApiClient::from_config(&config)?);
//! let session = SessionController::new(
//!     api.clone(),
//!     api,
//!     Arc::new(MemoryStore::new()),
//!     config.oauth_app(),
//! );
//!
//! if session.restore().await?.is_none() {
//!     let user = session.login("alice", "secret123", false).await?;
//!     println!("Signed in as {}", user.login);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{AccountService, ApiClient, ApiError, AuthService};
pub use auth::{
    CredentialStore, Credentials, EncryptedFileStore, KeyringStore, MemoryStore, Rejection,
    SessionController, SessionError, SessionPolicy, SessionResult, SessionState, StoreError,
};
pub use config::{Config, StoreBackend};
pub use models::{AuthRequest, OAuthApp, Scope, Token, User};
