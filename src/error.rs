// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types and backend error payload extraction.

use crate::config::ConfigError;
use crate::models::FieldErrors;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Message shown when the backend error body carries nothing usable.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Notice text for a forced logout.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

/// Client error type shared by the API client, auth flows and CLI.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Local form validation failed; nothing was sent.
    #[error("Validation failed: {}", summarize(.0))]
    Validation(FieldErrors),

    /// Backend rejected the bearer token (HTTP 401).
    #[error("Authentication required")]
    Unauthorized,

    /// Stored session could not be resolved and was cleared.
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    /// No stored session at all.
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("CuraPets API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Whether this error means the session is gone and the user must log in again.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized | ClientError::SessionExpired | ClientError::NotAuthenticated
        )
    }

    /// Message suitable for a transient user-facing notice.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Validation(errors) => summarize(errors),
            ClientError::Unauthorized | ClientError::SessionExpired => {
                SESSION_EXPIRED_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

fn summarize(errors: &FieldErrors) -> String {
    errors
        .values()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

// ─── Backend Error Payloads ──────────────────────────────────

/// Error body shapes the backend is known to return.
///
/// Variant order matters for untagged decoding: objects carrying `detail` or
/// `non_field_errors` are matched before the generic per-field map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ApiErrorPayload {
    Message(String),
    /// Bare `ValidationError("...")` raised outside a serializer field
    Messages(Vec<String>),
    Detail { detail: String },
    NonFieldErrors { non_field_errors: Vec<String> },
    Fields(BTreeMap<String, FieldMessages>),
}

/// Per-field error value: a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldMessages {
    One(String),
    Many(Vec<String>),
}

impl FieldMessages {
    fn joined(&self) -> String {
        match self {
            FieldMessages::One(msg) => msg.clone(),
            FieldMessages::Many(msgs) => msgs.join(" "),
        }
    }
}

impl ApiErrorPayload {
    /// Best-effort human readable message, `None` when the payload is empty.
    pub fn message(&self) -> Option<String> {
        let msg = match self {
            ApiErrorPayload::Message(msg) => msg.trim().to_string(),
            ApiErrorPayload::Messages(msgs) => msgs
                .iter()
                .map(|m| m.trim())
                .filter(|m| !m.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            ApiErrorPayload::Detail { detail } => detail.clone(),
            ApiErrorPayload::NonFieldErrors { non_field_errors } => {
                non_field_errors.first().cloned().unwrap_or_default()
            }
            ApiErrorPayload::Fields(fields) => fields
                .iter()
                .map(|(field, msgs)| format!("{}: {}", field, msgs.joined()))
                .collect::<Vec<_>>()
                .join("; "),
        };

        (!msg.is_empty()).then_some(msg)
    }
}

/// Extract a message from a raw error body, falling back to the generic text.
///
/// Non-JSON bodies (HTML error pages, proxies) never leak into notices.
pub fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorPayload>(body)
        .ok()
        .and_then(|payload| payload.message())
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_payload() {
        assert_eq!(
            extract_error_message(r#"{"detail": "Application already submitted."}"#),
            "Application already submitted."
        );
    }

    #[test]
    fn test_detail_wins_over_other_fields() {
        let body = r#"{"detail": "Not found.", "code": "not_found"}"#;
        assert_eq!(extract_error_message(body), "Not found.");
    }

    #[test]
    fn test_non_field_errors_takes_first() {
        let body = r#"{"non_field_errors": ["Invalid credentials", "second"]}"#;
        assert_eq!(extract_error_message(body), "Invalid credentials");
    }

    #[test]
    fn test_field_errors_joined() {
        let body = r#"{"age": ["Ensure this value is greater than 0."], "name": "Required"}"#;
        assert_eq!(
            extract_error_message(body),
            "age: Ensure this value is greater than 0.; name: Required"
        );
    }

    #[test]
    fn test_top_level_message_list() {
        assert_eq!(
            extract_error_message(r#"["You have already submitted an application."]"#),
            "You have already submitted an application."
        );
        assert_eq!(
            extract_error_message(r#"["First problem.", "Second problem."]"#),
            "First problem. Second problem."
        );
        assert_eq!(extract_error_message("[]"), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_plain_string_payload() {
        assert_eq!(extract_error_message(r#""Server busy""#), "Server busy");
    }

    #[test]
    fn test_fallback_for_html_and_empty() {
        assert_eq!(
            extract_error_message("<html>502 Bad Gateway</html>"),
            GENERIC_ERROR_MESSAGE
        );
        assert_eq!(extract_error_message("{}"), GENERIC_ERROR_MESSAGE);
        assert_eq!(extract_error_message(""), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_auth_error_classification() {
        assert!(ClientError::Unauthorized.is_auth_error());
        assert!(ClientError::SessionExpired.is_auth_error());
        assert!(!ClientError::Network("timeout".to_string()).is_auth_error());
        assert!(!ClientError::Api {
            status: 500,
            message: "boom".to_string()
        }
        .is_auth_error());
    }
}
