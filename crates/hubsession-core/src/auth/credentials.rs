use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::SessionError;

/// Username/password pair typed in by the user.
///
/// Never persisted. Consumed by `into_basic_auth` so the password does not
/// outlive the token exchange.
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Validate and capture a sign-in attempt. Blank input is rejected here,
    /// before anything reaches the network.
    pub fn new(username: &str, password: &str) -> Result<Self, SessionError> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return Err(SessionError::MissingInput);
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// `Authorization` header value: `Basic base64(username:password)`
    pub fn into_basic_auth(self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw.as_bytes()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_header() {
        let creds = Credentials::new("alice", "secret123").unwrap();
        assert_eq!(creds.into_basic_auth(), "Basic YWxpY2U6c2VjcmV0MTIz");
    }

    #[test]
    fn test_long_credentials_have_no_line_breaks() {
        let password = "p".repeat(200);
        let header = Credentials::new("alice", &password).unwrap().into_basic_auth();
        assert!(!header.contains('\n'));
        assert!(!header.contains('\r'));
    }

    #[test]
    fn test_blank_input_rejected() {
        assert!(matches!(
            Credentials::new("", "pw"),
            Err(SessionError::MissingInput)
        ));
        assert!(matches!(
            Credentials::new("alice", "   "),
            Err(SessionError::MissingInput)
        ));
        assert!(matches!(
            Credentials::new(" \t", "pw"),
            Err(SessionError::MissingInput)
        ));
    }

    #[test]
    fn test_username_trimmed_password_kept() {
        let creds = Credentials::new("  alice ", " pass word ").unwrap();
        assert_eq!(creds.username(), "alice");
        let decoded = STANDARD
            .decode(creds.into_basic_auth().trim_start_matches("Basic "))
            .unwrap();
        assert_eq!(decoded, b"alice: pass word ");
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("alice", "hunter2").unwrap();
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }
}
