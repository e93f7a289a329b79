//! User-facing alerts for session outcomes.

use hubsession_core::{Rejection, SessionError};

/// Title and body of the alert shown for a failed sign-in
pub fn alert_for(err: &SessionError) -> (&'static str, String) {
    match err {
        SessionError::MissingInput => (
            "Missing credentials",
            "Please enter both your username and password.".to_string(),
        ),
        SessionError::InvalidCredentials {
            code: Rejection::Unauthorized,
        } => (
            "Authentication failed",
            "The username or password is incorrect.".to_string(),
        ),
        SessionError::InvalidCredentials {
            code: Rejection::Forbidden,
        } => (
            "Authentication failed",
            "Access was refused. The account may require two-factor authentication \
             or have exceeded its sign-in attempts."
                .to_string(),
        ),
        SessionError::SessionRevoked { .. } => (
            "Session expired",
            "Your saved session is no longer valid. Please sign in again.".to_string(),
        ),
        SessionError::Connection(_) => (
            "Connection error",
            "Could not reach the server. Check your network connection and try again."
                .to_string(),
        ),
        SessionError::UnknownResponse { status } => (
            "Unexpected error",
            format!("The server returned an unexpected response (HTTP {}).", status),
        ),
        SessionError::Busy => (
            "Please wait",
            "A sign-in is already in progress.".to_string(),
        ),
        SessionError::Storage(e) => (
            "Credential storage error",
            format!("Could not access saved credentials: {}", e),
        ),
    }
}
