//! Seams between the session logic and the HTTP API.
//!
//! Both traits are object-safe so the controller can hold them as
//! `Arc<dyn …>` and tests can substitute scripted fakes.

use futures::future::BoxFuture;

use crate::models::{AuthRequest, Token, User};

use super::ApiError;

/// Exchanges Basic credentials for a bearer token.
pub trait AuthService: Send + Sync {
    /// `basic_auth` is the complete header value, `Basic <base64>`.
    fn exchange<'a>(
        &'a self,
        request: &'a AuthRequest,
        basic_auth: &'a str,
    ) -> BoxFuture<'a, Result<Token, ApiError>>;
}

/// Reads the account that owns a token.
pub trait AccountService: Send + Sync {
    fn fetch_current_user<'a>(&'a self, token: &'a Token) -> BoxFuture<'a, Result<User, ApiError>>;
}
