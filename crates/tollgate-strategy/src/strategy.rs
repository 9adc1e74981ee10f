//! The strategy seam: validate a request, produce an outcome.

use async_trait::async_trait;
use serde_json::Value;
use tollgate_protocol::RequestContext;

use crate::StrategyError;

/// What a validator decided about a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The credentials check out; `principal` is the authenticated
    /// entity's record (a user row, a service account, ...).
    Granted { principal: Value },

    /// The credentials were rejected. `challenge` is optional
    /// supplementary data for building the user-facing message
    /// (conventionally carrying a `"message"` field).
    Denied { challenge: Option<Value> },

    /// The strategy produced something a socket flow can't complete —
    /// typically a redirect-oriented or multi-step result that only makes
    /// sense over the HTTP transport.
    Unsupported,
}

impl Outcome {
    /// Shorthand for a granted outcome.
    pub fn granted(principal: Value) -> Self {
        Self::Granted { principal }
    }

    /// Shorthand for a denial with an optional challenge.
    pub fn denied(challenge: Option<Value>) -> Self {
        Self::Denied { challenge }
    }

    /// Whether the outcome grants access.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }
}

/// Validates one request against one credential mechanism.
///
/// Implementations live outside the core: a password strategy compares
/// `context.body` against stored hashes, a header strategy inspects
/// `context.headers`, and so on. The core only cares about the
/// [`Outcome`].
///
/// `options` is the per-strategy configuration attached to the registry
/// entry (field names, issuer URLs, ...), `Value::Null` when none was
/// configured.
///
/// Object-safe (`Arc<dyn Strategy>`) so the registry can hold validators
/// of different concrete types behind one seam.
#[async_trait]
pub trait Strategy: Send + Sync + 'static {
    /// Evaluates the request context and decides.
    ///
    /// # Errors
    /// Returns [`StrategyError`] only when the validator itself fails
    /// (backend down, internal fault) — a rejection is
    /// [`Outcome::Denied`], not an error.
    async fn validate(
        &self,
        context: &RequestContext,
        options: &Value,
    ) -> Result<Outcome, StrategyError>;
}
