//! Identity and payload types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// ConnectionId
// ---------------------------------------------------------------------------

/// A unique identifier for one socket connection.
///
/// Newtype over `u64` so a connection id can't be confused with any other
/// numeric id floating around the surrounding system. Serialized as the
/// plain number (`#[serde(transparent)]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AuthenticateRequest
// ---------------------------------------------------------------------------

/// The inbound `authenticate` payload.
///
/// A client names the strategy it wants to authenticate with and supplies
/// whatever credential fields that strategy expects. The credential fields
/// are deliberately schemaless — a password strategy wants
/// `username`/`password`, an API-key strategy wants `key`, and the core
/// never interprets them itself.
///
/// `strategy` stays an `Option` because "the client forgot to name a
/// strategy" is a request the handler must reject with a stable error, not
/// a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthenticateRequest {
    /// Which registered strategy should validate this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,

    /// Every other field of the payload, captured as-is.
    #[serde(flatten)]
    pub credentials: Map<String, Value>,
}

impl AuthenticateRequest {
    /// Creates a request for the named strategy with no credentials yet.
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            strategy: Some(strategy.into()),
            credentials: Map::new(),
        }
    }

    /// Adds one credential field (builder-style, mostly for tests).
    pub fn credential(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.credentials.insert(key.into(), value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// IssuedToken
// ---------------------------------------------------------------------------

/// An access token minted by the token service.
///
/// The service may attach arbitrary metadata (issue time, claims, TTL
/// echoes); it rides along in `metadata` and is flattened into the same
/// JSON object as `access_token` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// The opaque token string the client presents on later requests.
    pub access_token: String,

    /// Service-defined extras, flattened alongside the token.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl IssuedToken {
    /// Creates a token with empty metadata.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            metadata: Map::new(),
        }
    }

    /// Attaches one metadata field (builder-style).
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

// =========================================================================
// Tests
// =========================================================================
