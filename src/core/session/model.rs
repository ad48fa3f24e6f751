//! Session data model
//!
//! A session is the authenticated identity of the client plus the
//! credential pair that proves it. Both tokens are present or the
//! session does not exist.

use serde::{Deserialize, Deserializer, Serialize};

/// Marketplace role. The server vocabulary is `buyer`, `vendor` and
/// `administrator`; any other spelling is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Vendor,
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Vendor => "vendor",
            Role::Administrator => "administrator",
        }
    }

    /// Roles a visitor may pick when creating an account
    pub fn is_self_service(&self) -> bool {
        matches!(self, Role::Buyer | Role::Vendor)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is outside the canonical vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Role::Buyer),
            "vendor" => Ok(Role::Vendor),
            "administrator" => Ok(Role::Administrator),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Summary of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub email: String,
    #[serde(default, alias = "full_name", alias = "username")]
    pub display_name: String,
    #[serde(alias = "user_type", alias = "userType")]
    pub role: Role,
    /// Vendors stay unverified until an administrator approves them
    #[serde(default = "verified_by_default", alias = "is_verified")]
    pub is_verified: bool,
}

fn verified_by_default() -> bool {
    true
}

impl UserSummary {
    /// Whether this user is a vendor still waiting for approval
    pub fn is_pending_vendor(&self) -> bool {
        self.role == Role::Vendor && !self.is_verified
    }
}

/// Servers hand out numeric ids (Django) or string ids; the client keeps a string
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Access and refresh token pair as persisted in client storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Both tokens are non-empty and free of whitespace
    pub fn is_well_formed(&self) -> bool {
        is_token(&self.access_token) && is_token(&self.refresh_token)
    }
}

fn is_token(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(char::is_whitespace)
}

/// Current authenticated identity with its credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

impl Session {
    pub fn new(tokens: TokenPair, user: UserSummary) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user,
        }
    }

    pub fn tokens(&self) -> TokenPair {
        TokenPair::new(self.access_token.clone(), self.refresh_token.clone())
    }

    pub fn is_well_formed(&self) -> bool {
        is_token(&self.access_token) && is_token(&self.refresh_token)
    }
}

/// Reactive session state observed by the view layer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Startup: storage or server verification still pending
    #[default]
    Loading,
    /// No session
    Anonymous,
    /// Signed in
    Active(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Active(session) => Some(session),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&UserSummary> {
        self.session().map(|s| &s.user)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session().map(|s| s.access_token.as_str())
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendor() -> UserSummary {
        UserSummary {
            id: "7".to_string(),
            email: "shop@example.com".to_string(),
            display_name: "Corner Shop".to_string(),
            role: Role::Vendor,
            is_verified: false,
        }
    }

    #[test]
    fn test_role_parses_canonical_names_only() {
        assert_eq!("buyer".parse::<Role>(), Ok(Role::Buyer));
        assert_eq!("administrator".parse::<Role>(), Ok(Role::Administrator));
        assert_eq!(
            "admin".parse::<Role>(),
            Err(UnknownRole("admin".to_string()))
        );
    }

    #[test]
    fn test_role_rejects_legacy_spelling_in_json() {
        let result = serde_json::from_str::<Role>("\"admin\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_self_service_roles() {
        assert!(Role::Buyer.is_self_service());
        assert!(Role::Vendor.is_self_service());
        assert!(!Role::Administrator.is_self_service());
    }

    #[test]
    fn test_user_summary_accepts_server_field_names() {
        let json = r#"{
            "id": 42,
            "email": "a@b.com",
            "full_name": "Ada Buyer",
            "user_type": "buyer",
            "is_verified": true
        }"#;

        let user: UserSummary = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.display_name, "Ada Buyer");
        assert_eq!(user.role, Role::Buyer);
        assert!(user.is_verified);
    }

    #[test]
    fn test_user_summary_camel_case_roundtrip_keeps_fields() {
        let user = vendor();
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"displayName\""));
        assert!(json.contains("\"isVerified\":false"));

        let parsed: UserSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, user);
    }

    #[test]
    fn test_user_summary_verified_defaults_to_true() {
        let json = r#"{"id": "1", "email": "x@y.z", "role": "vendor"}"#;
        let user: UserSummary = serde_json::from_str(json).unwrap();
        assert!(user.is_verified);
        assert!(!user.is_pending_vendor());
    }

    #[test]
    fn test_pending_vendor() {
        assert!(vendor().is_pending_vendor());
    }

    #[test]
    fn test_token_pair_well_formed() {
        assert!(TokenPair::new("a", "r").is_well_formed());
        assert!(!TokenPair::new("", "r").is_well_formed());
        assert!(!TokenPair::new("a", "").is_well_formed());
        assert!(!TokenPair::new("a b", "r").is_well_formed());
    }

    #[test]
    fn test_session_state_accessors() {
        let session = Session::new(TokenPair::new("acc", "ref"), vendor());
        let state = SessionState::Active(session.clone());

        assert_eq!(state.access_token(), Some("acc"));
        assert_eq!(state.user(), Some(&session.user));
        assert!(state.is_active());
        assert!(SessionState::default().is_loading());
        assert_eq!(SessionState::Anonymous.access_token(), None);
    }
}
