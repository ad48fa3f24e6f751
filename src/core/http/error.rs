//! HTTP layer errors

use std::collections::BTreeMap;

use serde::Deserialize;

use super::transport::{ApiResponse, TransportError};

/// Error returned by [`ApiClient`](super::ApiClient) calls
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No response at all. Never treated as an authentication failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// 401 that could not be recovered by a token refresh
    #[error("Authentication required")]
    Unauthorized { body: String },

    /// The token could not be refreshed and the session was ended
    #[error("Session expired, please sign in again")]
    SessionExpired,

    #[error("Request failed with status {status}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to encode request: {0}")]
    Encode(String),

    /// Aborted by the caller before the response was used
    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Map a non-success response to an error
    pub fn from_response(response: ApiResponse) -> Self {
        match response.status {
            401 => ApiError::Unauthorized {
                body: response.body,
            },
            status => ApiError::Status {
                status,
                body: response.body,
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } | ApiError::SessionExpired => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. } | ApiError::SessionExpired)
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// Error body of a 4xx/5xx response, parsed leniently
    pub fn details(&self) -> ErrorDetails {
        match self {
            ApiError::Unauthorized { body } | ApiError::Status { body, .. } => {
                ErrorDetails::parse(body)
            }
            _ => ErrorDetails::default(),
        }
    }
}

/// Human-readable message plus field-level validation errors from an error body.
///
/// Servers answer with `{"message": ...}`, `{"detail": ...}`, `{"error": ...}`
/// or a map of field name to a list of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDetails {
    pub message: Option<String>,
    pub fields: BTreeMap<String, Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldMessages {
    Many(Vec<String>),
    One(String),
}

impl ErrorDetails {
    pub fn parse(body: &str) -> Self {
        let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body)
        else {
            return Self::default();
        };

        let mut details = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "message" | "detail" | "error" => {
                    if details.message.is_none() {
                        details.message = value.as_str().map(str::to_string);
                    }
                }
                "code" => {}
                _ => match serde_json::from_value::<FieldMessages>(value) {
                    Ok(FieldMessages::Many(messages)) => {
                        details.fields.insert(key, messages);
                    }
                    Ok(FieldMessages::One(message)) => {
                        details.fields.insert(key, vec![message]);
                    }
                    Err(_) => {}
                },
            }
        }
        details
    }

    /// First message available: the top-level one, else the first field error
    pub fn first_message(&self) -> Option<&str> {
        self.message.as_deref().or_else(|| {
            self.fields
                .values()
                .flat_map(|messages| messages.iter())
                .map(String::as_str)
                .next()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_maps_401() {
        let err = ApiError::from_response(ApiResponse::new(401, "{}"));
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_from_response_other_status() {
        let err = ApiError::from_response(ApiResponse::new(404, "missing"));
        assert_eq!(
            err,
            ApiError::Status {
                status: 404,
                body: "missing".to_string()
            }
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_transport_is_not_client_error() {
        let err = ApiError::from(TransportError::Timeout);
        assert!(err.is_transport());
        assert!(!err.is_client_error());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_session_expired_reads_as_unauthorized() {
        let err = ApiError::SessionExpired;
        assert!(err.is_unauthorized());
        assert!(err.is_session_expired());
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "Session expired, please sign in again");
        assert_eq!(err.details(), ErrorDetails::default());
    }

    #[test]
    fn test_details_message_variants() {
        assert_eq!(
            ErrorDetails::parse(r#"{"detail": "No active account"}"#).message,
            Some("No active account".to_string())
        );
        assert_eq!(
            ErrorDetails::parse(r#"{"message": "Bad login", "code": "INVALID"}"#).message,
            Some("Bad login".to_string())
        );
    }

    #[test]
    fn test_details_field_errors() {
        let details = ErrorDetails::parse(
            r#"{"email": ["user with this email already exists."], "password": "too short"}"#,
        );

        assert_eq!(details.message, None);
        assert_eq!(
            details.fields.get("email"),
            Some(&vec!["user with this email already exists.".to_string()])
        );
        assert_eq!(
            details.fields.get("password"),
            Some(&vec!["too short".to_string()])
        );
        assert_eq!(
            details.first_message(),
            Some("user with this email already exists.")
        );
    }

    #[test]
    fn test_details_from_non_json_body() {
        assert_eq!(ErrorDetails::parse("<html>"), ErrorDetails::default());
    }
}
