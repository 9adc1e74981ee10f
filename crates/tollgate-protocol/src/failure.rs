//! The stable failure shape delivered to clients.
//!
//! Whatever goes wrong inside the core — a malformed request, a rejected
//! credential, a collaborator blowing up — the remote side only ever sees
//! this one shape. Implementation-specific error objects never cross the
//! boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A normalized failure: `{type, message, code?, data?}`.
///
/// `kind` is serialized as `"type"` and names the failure class
/// (`"ValidationError"`, `"ConfigurationError"`, `"NotAuthenticated"`,
/// `"CollaboratorError"`, `"Unavailable"`). `code` follows HTTP-style
/// conventions. `data` carries supplementary detail, e.g. the challenge
/// accompanying a credential rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// The failure class.
    #[serde(rename = "type")]
    pub kind: String,

    /// Human-readable description.
    pub message: String,

    /// HTTP-style numeric code, when one applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,

    /// Supplementary detail (e.g. a challenge).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorPayload {
    /// A malformed or incomplete request.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: "ValidationError".into(),
            message: message.into(),
            code: Some(400),
            data: None,
        }
    }

    /// The request named something the deployment doesn't provide.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            kind: "ConfigurationError".into(),
            message: message.into(),
            code: Some(500),
            data: None,
        }
    }

    /// Credentials rejected, or the strategy produced an outcome the
    /// socket flow can't complete.
    pub fn not_authenticated(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            kind: "NotAuthenticated".into(),
            message: message.into(),
            code: Some(401),
            data,
        }
    }

    /// A collaborator (strategy validator, token service) failed.
    pub fn collaborator(message: impl Into<String>) -> Self {
        Self {
            kind: "CollaboratorError".into(),
            message: message.into(),
            code: Some(502),
            data: None,
        }
    }

    /// The session behind a handle is gone.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: "Unavailable".into(),
            message: message.into(),
            code: Some(503),
            data: None,
        }
    }
}

impl std::fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
