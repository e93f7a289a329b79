use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account record returned by `GET /user`.
///
/// Only `login` is needed to establish a session; the remaining fields are
/// carried along for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub public_repos: Option<u32>,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Name to greet the user with: display name if set, login otherwise
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_response() {
        let json = r#"{"login":"octocat","id":583231,"node_id":"MDQ6VXNlcjU4MzIzMQ==","avatar_url":"https://avatars.githubusercontent.com/u/583231?v=4","html_url":"https://github.com/octocat","type":"User","site_admin":false,"name":"The Octocat","company":"@github","email":null,"public_repos":8,"created_at":"2011-01-25T18:44:36Z"}"#;

        let user: User = serde_json::from_str(json).expect("Failed to parse user test JSON");
        assert_eq!(user.login, "octocat");
        assert_eq!(user.id, 583231);
        assert_eq!(user.name.as_deref(), Some("The Octocat"));
        assert_eq!(user.email, None);
        assert_eq!(user.public_repos, Some(8));
        assert_eq!(
            user.created_at.map(|d| d.to_rfc3339()),
            Some("2011-01-25T18:44:36+00:00".to_string())
        );
    }

    #[test]
    fn test_parse_minimal_user() {
        let user: User = serde_json::from_str(r#"{"login":"alice"}"#)
            .expect("Failed to parse minimal user");
        assert_eq!(user.login, "alice");
        assert_eq!(user.id, 0);
        assert!(user.created_at.is_none());
    }

    #[test]
    fn test_display_name_falls_back_to_login() {
        let mut user: User = serde_json::from_str(r#"{"login":"alice"}"#).unwrap();
        assert_eq!(user.display_name(), "alice");

        user.name = Some("   ".to_string());
        assert_eq!(user.display_name(), "alice");

        user.name = Some("Alice Liddell".to_string());
        assert_eq!(user.display_name(), "Alice Liddell");
    }
}
