//! Process-wide authentication notifications.

use serde::{Deserialize, Serialize};

use crate::{ConnectionId, IssuedToken};

/// Where a notification came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventContext {
    /// The transport that produced the event (e.g. `"socket"`).
    pub provider: String,

    /// The path the authentication service is mounted on.
    pub path: String,

    /// Which connection the event belongs to.
    pub connection: ConnectionId,

    /// The connection's authenticated flag after the transition.
    pub authenticated: bool,
}

/// A login or logout broadcast.
///
/// Published after the corresponding transition completes; subscribers get
/// the token involved and enough context to correlate the connection.
/// Delivery is fire-and-forget — nothing in the core waits on subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// A connection completed `authenticate`.
    Login {
        token: IssuedToken,
        context: EventContext,
    },

    /// A connection left the authenticated state (explicit, timer-fired,
    /// removed-entity, or disconnect-triggered).
    Logout {
        token: IssuedToken,
        context: EventContext,
    },
}

impl AuthEvent {
    /// The token the event carries.
    pub fn token(&self) -> &IssuedToken {
        match self {
            Self::Login { token, .. } | Self::Logout { token, .. } => token,
        }
    }

    /// The connection context the event carries.
    pub fn context(&self) -> &EventContext {
        match self {
            Self::Login { context, .. } | Self::Logout { context, .. } => context,
        }
    }

    /// Whether this is a login event.
    pub fn is_login(&self) -> bool {
        matches!(self, Self::Login { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> EventContext {
        EventContext {
            provider: "socket".into(),
            path: "/authentication".into(),
            connection: ConnectionId(3),
            authenticated: true,
        }
    }

    #[test]
    fn test_login_json_format() {
        let event = AuthEvent::Login {
            token: IssuedToken::new("T1"),
            context: context(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "Login");
        assert_eq!(json["token"]["access_token"], "T1");
        assert_eq!(json["context"]["provider"], "socket");
        assert_eq!(json["context"]["connection"], 3);
    }

    #[test]
    fn test_logout_round_trip() {
        let event = AuthEvent::Logout {
            token: IssuedToken::new("T1"),
            context: EventContext {
                authenticated: false,
                ..context()
            },
        };
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: AuthEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_accessors() {
        let event = AuthEvent::Login {
            token: IssuedToken::new("T9"),
            context: context(),
        };
        assert!(event.is_login());
        assert_eq!(event.token().access_token, "T9");
        assert_eq!(event.context().connection, ConnectionId(3));
    }
}
