//! Access token payload decoding
//!
//! The client holds no signing key, so tokens are decoded without signature
//! verification. The claims are only used to fill in a missing user summary
//! and to notice an access token that is about to expire; the server stays
//! the authority on validity.

use chrono::Utc;
use jsonwebtoken::dangerous::insecure_decode;
use serde::Deserialize;

use crate::core::session::{Role, UserSummary};

/// JWT errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwtError {
    #[error("Token decoding failed: {0}")]
    DecodingError(String),

    #[error("Invalid token")]
    InvalidToken,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => {
                JwtError::InvalidToken
            }
            _ => JwtError::DecodingError(err.to_string()),
        }
    }
}

/// Claims the marketplace server puts in access tokens.
///
/// Every field is optional: simplejwt only guarantees `user_id` and `exp`,
/// richer servers add the profile fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: Option<serde_json::Value>,
    /// User ID as issued by simplejwt
    pub user_id: Option<serde_json::Value>,
    pub email: Option<String>,
    #[serde(alias = "user_type")]
    pub role: Option<Role>,
    #[serde(alias = "full_name", alias = "username")]
    pub name: Option<String>,
    pub is_verified: Option<bool>,
    /// Expiration time (Unix timestamp)
    pub exp: Option<i64>,
}

impl AccessClaims {
    /// User ID from `user_id`, falling back to `sub`
    pub fn id(&self) -> Option<String> {
        self.user_id
            .as_ref()
            .or(self.sub.as_ref())
            .and_then(|value| match value {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }

    /// Build a user summary if the token carries id, email and role
    pub fn user_summary(&self) -> Option<UserSummary> {
        let id = self.id()?;
        let email = self.email.clone()?;
        let role = self.role?;

        Some(UserSummary {
            id,
            display_name: self.name.clone().unwrap_or_else(|| email.clone()),
            email,
            role,
            is_verified: self.is_verified.unwrap_or(true),
        })
    }

    /// True when the token expires within `skew_secs` of `now`
    pub fn expires_within(&self, skew_secs: i64, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now + skew_secs)
    }
}

/// Decode the payload of a JWT without verifying its signature
pub fn decode_claims(token: &str) -> Result<AccessClaims, JwtError> {
    let token_data = insecure_decode::<AccessClaims>(token)?;

    Ok(token_data.claims)
}

/// User summary carried by an access token, if any
pub fn user_from_access_token(token: &str) -> Option<UserSummary> {
    decode_claims(token).ok()?.user_summary()
}

/// Whether the access token is known to expire within `skew_secs`.
///
/// Opaque or undecodable tokens are never considered expiring; the server's
/// 401 is the fallback signal for those.
pub fn is_expiring(token: &str, skew_secs: i64) -> bool {
    decode_claims(token)
        .map(|claims| claims.expires_within(skew_secs, Utc::now().timestamp()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    fn sign(claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"server-side-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_simplejwt_payload() {
        let token = sign(json!({
            "token_type": "access",
            "user_id": 12,
            "exp": 4_102_444_800i64,
            "jti": "abc"
        }));

        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.id().as_deref(), Some("12"));
        assert_eq!(claims.exp, Some(4_102_444_800));
        assert!(claims.user_summary().is_none());
    }

    #[test]
    fn test_user_summary_from_rich_token() {
        let token = sign(json!({
            "sub": "u-1",
            "email": "v@shop.com",
            "user_type": "vendor",
            "full_name": "Vera Vendor",
            "is_verified": false,
            "exp": 4_102_444_800i64
        }));

        let user = user_from_access_token(&token).unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.role, Role::Vendor);
        assert_eq!(user.display_name, "Vera Vendor");
        assert!(user.is_pending_vendor());
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let token = sign(json!({"user_id": 3, "email": "b@b.com", "role": "buyer"}));
        let user = user_from_access_token(&token).unwrap();
        assert_eq!(user.display_name, "b@b.com");
    }

    #[test]
    fn test_opaque_token_is_invalid() {
        assert!(matches!(
            decode_claims("not-a-jwt"),
            Err(JwtError::InvalidToken)
        ));
        assert!(user_from_access_token("not-a-jwt").is_none());
        assert!(!is_expiring("not-a-jwt", 30));
    }

    #[test]
    fn test_expires_within() {
        let claims = AccessClaims {
            exp: Some(1_000),
            ..Default::default()
        };

        assert!(claims.expires_within(30, 980));
        assert!(claims.expires_within(0, 1_000));
        assert!(!claims.expires_within(30, 900));
        assert!(!AccessClaims::default().expires_within(30, 0));
    }

    #[test]
    fn test_is_expiring_with_expired_token() {
        let token = sign(json!({"user_id": 1, "exp": 1_000}));
        assert!(is_expiring(&token, 30));
    }

    #[test]
    fn test_expired_token_still_decodes() {
        let token = sign(json!({"user_id": 5, "exp": 1_000}));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.id().as_deref(), Some("5"));
    }

    #[test]
    fn test_is_expiring_with_fresh_token() {
        let exp = Utc::now().timestamp() + 3_600;
        let token = sign(json!({"user_id": 1, "exp": exp}));
        assert!(!is_expiring(&token, 30));
    }
}
