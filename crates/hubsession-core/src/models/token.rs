use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Note attached to tokens issued for this client when none is configured
pub const DEFAULT_TOKEN_NOTE: &str = "hubsession";

/// Opaque bearer credential issued by the token exchange.
///
/// The value is never printed through `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
}

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Value of the `Authorization` header for authenticated requests
    pub fn authorization_header(&self) -> String {
        format!("token {}", self.value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Permission set requested for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum Scope {
    /// Read/write access to public repositories only
    #[serde(rename = "public_repo")]
    PublicRepo,
    /// Full access to public and private repositories
    #[serde(rename = "repo")]
    AllRepo,
}

impl Scope {
    /// Pick the scope for the private-access toggle
    pub fn for_access(wants_private_access: bool) -> Self {
        if wants_private_access {
            Scope::AllRepo
        } else {
            Scope::PublicRepo
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::PublicRepo => "public_repo",
            Scope::AllRepo => "repo",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application key/secret that tokens are issued to.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthApp {
    pub client_id: String,
    pub client_secret: String,
    pub note: String,
}

impl OAuthApp {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            note: DEFAULT_TOKEN_NOTE.to_string(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Build the exchange request for a single scope
    pub fn request(&self, scope: Scope) -> AuthRequest {
        AuthRequest {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            scopes: BTreeSet::from([scope]),
            note: self.note.clone(),
        }
    }
}

impl fmt::Debug for OAuthApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthApp")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("note", &self.note)
            .finish()
    }
}

/// JSON body of `POST /authorizations`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct AuthRequest {
    pub client_id: String,
    pub client_secret: String,
    pub scopes: BTreeSet<Scope>,
    pub note: String,
}

impl fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRequest")
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .field("note", &self.note)
            .finish_non_exhaustive()
    }
}
