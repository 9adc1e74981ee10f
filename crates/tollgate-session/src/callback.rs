//! The callback adapter: one operation outcome, delivered both ways.
//!
//! Inbound events may carry an optional completion callback. Whatever the
//! operation did, the callback sees exactly one invocation with either the
//! result (as JSON) or the normalized [`ErrorPayload`] — never an internal
//! error type. The adapter also returns the normalized outcome, so
//! internal callers can await it; the callback has no effect on that
//! propagation.

use serde::Serialize;
use serde_json::Value;
use tollgate_protocol::ErrorPayload;

use crate::SessionError;

/// An optional completion callback for one inbound event.
pub type Ack = Box<dyn FnOnce(Result<Value, ErrorPayload>) + Send + 'static>;

/// Normalizes `outcome`, invokes `ack` exactly once if present, and
/// returns the normalized outcome for the internal caller.
///
/// Failures are logged here, before normalization strips them down to the
/// stable shape.
pub(crate) fn deliver<T: Serialize>(
    outcome: Result<T, SessionError>,
    ack: Option<Ack>,
) -> Result<T, ErrorPayload> {
    let normalized = match outcome {
        Ok(value) => Ok(value),
        Err(error) => {
            tracing::warn!(error = %error, "session operation failed");
            Err(error.to_payload())
        }
    };

    if let Some(ack) = ack {
        let for_ack = match &normalized {
            Ok(value) => serde_json::to_value(value).map_err(|error| {
                ErrorPayload::collaborator(format!("result serialization failed: {error}"))
            }),
            Err(payload) => Err(payload.clone()),
        };
        ack(for_ack);
    }

    normalized
}

// =========================================================================
// Tests
// =========================================================================
