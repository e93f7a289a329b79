//! REST API client module.
//!
//! This module provides the `ApiClient` for the two endpoints the session
//! lifecycle needs: the token exchange (`POST /authorizations`, Basic auth)
//! and the account lookup (`GET /user`, token auth). The `AuthService` and
//! `AccountService` traits are the seams the session controller talks to.

pub mod client;
pub mod error;
pub mod service;

pub use client::ApiClient;
pub use error::ApiError;
pub use service::{AccountService, AuthService};
