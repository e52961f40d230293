//! Gateway failure taxonomy.
//!
//! DESIGN
//! ======
//! Every non-success response and every transport failure is normalized into
//! one `ApiError` at the gateway boundary. The backend reports failures as
//! `{"detail": ...}` where `detail` is either a message or a list of
//! validation entries; `extract_detail` flattens both shapes so views never
//! inspect raw bodies.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde_json::Value;

/// HTTP status signalling a rejected or expired credential.
pub const UNAUTHORIZED: u16 = 401;

/// Errors produced by gateway calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The stored credential was rejected; session state has already been cleared.
    #[error("session expired or credential rejected")]
    Unauthorized { detail: Option<String> },

    /// The backend answered with a non-success status.
    #[error("request failed with status {status}")]
    Status { status: u16, detail: Option<String> },

    /// The backend could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// A success body did not match the expected record.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The request could not be built (e.g. an unserializable body).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Build the error for a non-success response that is not an expiry.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        Self::Status { status, detail: extract_detail(body) }
    }

    /// Backend-provided message, when the response carried one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { detail } | Self::Status { detail, .. } => detail.as_deref(),
            Self::Network(_) | Self::Decode(_) | Self::InvalidRequest(_) => None,
        }
    }

    /// HTTP status, when the failure came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(UNAUTHORIZED),
            Self::Status { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) | Self::InvalidRequest(_) => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// The backend message, or `fallback` when none was supplied.
    #[must_use]
    pub fn detail_or(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_owned()
    }
}

/// Pull the human-readable message out of a `{"detail": ...}` error body.
///
/// Validation failures arrive as a list of `{ "msg": ... }` entries; their
/// messages are joined with `"; "`.
#[must_use]
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(message) => {
            let message = message.trim();
            (!message.is_empty()).then(|| message.to_owned())
        }
        Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}
