use thiserror::Error;

use crate::api::ApiError;

/// Why the token exchange refused the supplied credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// HTTP 401: wrong username or password
    Unauthorized,
    /// HTTP 403: account locked, 2FA required, or too many attempts
    Forbidden,
}

impl Rejection {
    pub fn status(&self) -> u16 {
        match self {
            Rejection::Unauthorized => 401,
            Rejection::Forbidden => 403,
        }
    }

    fn from_api(err: &ApiError) -> Option<Self> {
        match err {
            ApiError::Unauthorized => Some(Rejection::Unauthorized),
            ApiError::AccessDenied(_) => Some(Rejection::Forbidden),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed token file: {0}")]
    Format(String),

    #[error("Failed to decrypt token: {0}")]
    Crypto(String),
}

/// Outcome of a failed session operation. Every variant leaves the
/// controller in a settled state; none is fatal.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Username and password are required")]
    MissingInput,

    #[error("Invalid credentials (HTTP {})", .code.status())]
    InvalidCredentials { code: Rejection },

    #[error("Session revoked (HTTP {status}) - sign in again")]
    SessionRevoked { status: u16 },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Unexpected response from server (HTTP {status})")]
    UnknownResponse { status: u16 },

    #[error("A sign-in is already in progress")]
    Busy,

    #[error("Credential store error: {0}")]
    Storage(#[from] StoreError),
}

pub type SessionResult<T> = Result<T, SessionError>;

impl SessionError {
    /// Classify a failed token exchange
    pub(crate) fn from_exchange(err: ApiError) -> Self {
        if let Some(code) = Rejection::from_api(&err) {
            return SessionError::InvalidCredentials { code };
        }
        match err {
            ApiError::NetworkError(reason) => SessionError::Connection(reason),
            other => SessionError::UnknownResponse {
                status: other.status().unwrap_or_default(),
            },
        }
    }
}
