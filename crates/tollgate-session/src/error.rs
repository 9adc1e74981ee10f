//! Error types for the session layer.

use serde_json::Value;
use tollgate_protocol::ErrorPayload;
use tollgate_strategy::StrategyError;
use tollgate_token::TokenError;

/// Failures at the session-handler boundary.
///
/// This is the whole taxonomy a client can provoke. Every variant
/// normalizes to one stable [`ErrorPayload`] shape before it leaves the
/// process; the internal representation never crosses the boundary.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The request is missing or malforms something required
    /// (e.g. no strategy named).
    #[error("{0}")]
    Validation(String),

    /// The request names something this deployment doesn't provide
    /// (e.g. an unregistered strategy).
    #[error("{0}")]
    Configuration(String),

    /// Credentials rejected, or the strategy produced an outcome the
    /// socket flow can't complete.
    #[error("{message}")]
    NotAuthenticated {
        message: String,
        /// The challenge accompanying the rejection, if any.
        challenge: Option<Value>,
    },

    /// The strategy validator itself failed.
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    /// The token service failed.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The session task behind a handle is gone (socket already closed).
    #[error("session is gone")]
    Terminated,
}

impl SessionError {
    /// Normalizes into the stable client-facing shape.
    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            Self::Validation(message) => ErrorPayload::validation(message.clone()),
            Self::Configuration(message) => ErrorPayload::configuration(message.clone()),
            Self::NotAuthenticated { message, challenge } => {
                ErrorPayload::not_authenticated(message.clone(), challenge.clone())
            }
            // Collaborator failures keep their message but never their
            // internal error type.
            Self::Strategy(error) => ErrorPayload::collaborator(error.to_string()),
            Self::Token(error) => ErrorPayload::collaborator(error.to_string()),
            Self::Terminated => ErrorPayload::unavailable("session is gone"),
        }
    }
}

impl From<SessionError> for ErrorPayload {
    fn from(error: SessionError) -> Self {
        error.to_payload()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_normalizes_to_400() {
        let payload = SessionError::Validation("strategy must be provided".into()).to_payload();
        assert_eq!(payload.kind, "ValidationError");
        assert_eq!(payload.code, Some(400));
        assert_eq!(payload.message, "strategy must be provided");
    }

    #[test]
    fn test_configuration_normalizes_to_500() {
        let payload =
            SessionError::Configuration("strategy `ldap` is not registered".into()).to_payload();
        assert_eq!(payload.kind, "ConfigurationError");
        assert_eq!(payload.code, Some(500));
    }

    #[test]
    fn test_not_authenticated_carries_challenge() {
        let challenge = serde_json::json!({"message": "bad password"});
        let payload = SessionError::NotAuthenticated {
            message: "bad password".into(),
            challenge: Some(challenge.clone()),
        }
        .to_payload();

        assert_eq!(payload.kind, "NotAuthenticated");
        assert_eq!(payload.code, Some(401));
        assert_eq!(payload.data, Some(challenge));
    }

    #[test]
    fn test_collaborator_failures_keep_message_not_type() {
        let payload =
            SessionError::from(StrategyError::Validator("backend exploded".into())).to_payload();
        assert_eq!(payload.kind, "CollaboratorError");
        assert_eq!(payload.code, Some(502));
        assert!(payload.message.contains("backend exploded"));

        let payload = SessionError::from(TokenError::UnknownToken).to_payload();
        assert_eq!(payload.kind, "CollaboratorError");
    }

    #[test]
    fn test_terminated_normalizes_to_unavailable() {
        let payload = SessionError::Terminated.to_payload();
        assert_eq!(payload.kind, "Unavailable");
        assert_eq!(payload.code, Some(503));
    }
}
