//! Data models for the GitHub-style REST API.
//!
//! This module contains the types exchanged with the API during sign-in:
//! - `User`: the account record returned by `GET /user`
//! - `Token`, `Scope`, `AuthRequest`: the token exchange
//! - `OAuthApp`: the application key/secret the exchange is made on behalf of

pub mod token;
pub mod user;

pub use token::{AuthRequest, OAuthApp, Scope, Token};
pub use user::User;
