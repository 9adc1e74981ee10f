//! The session actor: one task per connection, owning its auth lifecycle.
//!
//! Inbound events (`authenticate`, `logout`, `disconnect`), entity-feed
//! events, and the expiry deadline all converge on one `tokio::select!`
//! loop, so every mutation of a connection's state is serialized — a
//! logout can never interleave with an authenticate that is suspended on
//! a collaborator call.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::{mpsc, oneshot};
use tollgate_protocol::{
    AuthEvent, AuthenticateRequest, ConnectionId, ErrorPayload, EventContext, IssuedToken,
};
use tollgate_strategy::{Outcome, StrategyRegistry};
use tollgate_token::{TokenParams, TokenService};
use tollgate_watch::{ChangeKind, EntityWatcher, ServiceEvent, WatcherBinding};

use crate::callback::{self, Ack};
use crate::{AuthConfig, ConnectionSession, EventSink, ExpiryTimer, SessionError};

/// Command channel size per session. Events on one socket are naturally
/// serial; the buffer only absorbs small bursts.
const COMMAND_CHANNEL_SIZE: usize = 16;

/// Commands sent to a session actor through its channel.
enum SessionCommand {
    Authenticate {
        request: AuthenticateRequest,
        ack: Option<Ack>,
        reply: oneshot::Sender<Result<IssuedToken, ErrorPayload>>,
    },
    Logout {
        ack: Option<Ack>,
        reply: oneshot::Sender<Result<Option<IssuedToken>, ErrorPayload>>,
    },
    Inspect {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Disconnect,
}

impl SessionCommand {
    /// Recovers the ack from a command that never reached the actor, so
    /// it can still be invoked exactly once.
    fn take_ack(self) -> Option<Ack> {
        match self {
            Self::Authenticate { ack, .. } | Self::Logout { ack, .. } => ack,
            Self::Inspect { .. } | Self::Disconnect => None,
        }
    }
}

/// A read-only view of a live session, served by its actor.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub connection: ConnectionId,
    pub authenticated: bool,
    pub access_token: Option<String>,
    pub principal: Option<Value>,
    pub headers: HashMap<String, String>,
    /// Whether an expiry deadline is currently armed.
    pub expiry_armed: bool,
    /// Whether an entity watcher is currently registered.
    pub watching: bool,
}

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// Handle to a running session actor. Cheap to clone; the transport layer
/// holds one per socket and forwards inbound events through it.
///
/// Once the actor is gone (disconnect already processed), every operation
/// resolves to the stable `"Unavailable"` payload instead of panicking.
#[derive(Clone)]
pub struct SessionHandle {
    connection: ConnectionId,
    commands: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// The connection this session belongs to.
    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    /// Authenticates the connection. The issued token is returned here
    /// and, when `ack` is given, also delivered to it — exactly once,
    /// error or result.
    pub async fn authenticate(
        &self,
        request: AuthenticateRequest,
        ack: Option<Ack>,
    ) -> Result<IssuedToken, ErrorPayload> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let command = SessionCommand::Authenticate {
            request,
            ack,
            reply: reply_tx,
        };
        match self.commands.send(command).await {
            Ok(()) => reply_rx
                .await
                .unwrap_or_else(|_| Err(SessionError::Terminated.to_payload())),
            Err(mpsc::error::SendError(command)) => {
                callback::deliver(Err(SessionError::Terminated), command.take_ack())
            }
        }
    }

    /// Logs the connection out. Resolves `None` (without failure) when it
    /// was not authenticated — logging out twice is not an error.
    pub async fn logout(&self, ack: Option<Ack>) -> Result<Option<IssuedToken>, ErrorPayload> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let command = SessionCommand::Logout {
            ack,
            reply: reply_tx,
        };
        match self.commands.send(command).await {
            Ok(()) => reply_rx
                .await
                .unwrap_or_else(|_| Err(SessionError::Terminated.to_payload())),
            Err(mpsc::error::SendError(command)) => {
                callback::deliver(Err(SessionError::Terminated), command.take_ack())
            }
        }
    }

    /// Signals that the socket closed. The actor logs out (if
    /// authenticated), tears everything down, and exits. Fire-and-forget;
    /// a second disconnect is harmless.
    pub async fn disconnect(&self) {
        let _ = self.commands.send(SessionCommand::Disconnect).await;
    }

    /// A read-only snapshot of the session's current state.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, ErrorPayload> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Inspect { reply: reply_tx })
            .await
            .map_err(|_| SessionError::Terminated.to_payload())?;
        reply_rx
            .await
            .map_err(|_| SessionError::Terminated.to_payload())
    }
}

/// Spawns the session actor for a newly opened connection and returns
/// its handle. `headers` are the transport handshake's headers.
pub fn spawn_session(
    connection: ConnectionId,
    headers: HashMap<String, String>,
    config: AuthConfig,
    registry: Arc<StrategyRegistry>,
    tokens: Arc<dyn TokenService>,
    events: Arc<dyn EventSink>,
) -> SessionHandle {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
    let (entity_tx, entity_rx) = mpsc::unbounded_channel();

    let actor = SessionActor {
        session: ConnectionSession::new(connection, headers),
        config,
        registry,
        tokens,
        events,
        timer: ExpiryTimer::new(),
        watcher: None,
        entity_tx,
        entity_rx,
        commands: command_rx,
    };
    tokio::spawn(actor.run());

    SessionHandle {
        connection,
        commands: command_tx,
    }
}

// ---------------------------------------------------------------------------
// SessionActor
// ---------------------------------------------------------------------------

struct SessionActor {
    session: ConnectionSession,
    config: AuthConfig,
    registry: Arc<StrategyRegistry>,
    tokens: Arc<dyn TokenService>,
    events: Arc<dyn EventSink>,
    timer: ExpiryTimer,
    watcher: Option<EntityWatcher>,
    /// Kept so watchers can be handed a sender at registration time; also
    /// keeps `entity_rx` from ever reporting closed.
    entity_tx: mpsc::UnboundedSender<ServiceEvent>,
    entity_rx: mpsc::UnboundedReceiver<ServiceEvent>,
    commands: mpsc::Receiver<SessionCommand>,
}

impl SessionActor {
    /// Runs the actor loop until the socket goes away.
    async fn run(mut self) {
        tracing::debug!(connection = %self.session.id(), "session started");

        loop {
            tokio::select! {
                maybe_command = self.commands.recv() => match maybe_command {
                    Some(SessionCommand::Authenticate { request, ack, reply }) => {
                        let result = callback::deliver(self.authenticate(request).await, ack);
                        let _ = reply.send(result);
                    }
                    Some(SessionCommand::Logout { ack, reply }) => {
                        let result = callback::deliver(self.logout().await, ack);
                        let _ = reply.send(result);
                    }
                    Some(SessionCommand::Inspect { reply }) => {
                        let _ = reply.send(self.snapshot());
                    }
                    // An explicit disconnect and every handle dropping
                    // are the same exit.
                    Some(SessionCommand::Disconnect) | None => break,
                },
                Some(event) = self.entity_rx.recv() => {
                    self.apply_entity_event(event).await;
                }
                access_token = self.timer.expired() => {
                    self.expire(access_token).await;
                }
            }
        }

        // Leaving Authenticated on the way out takes the ordinary logout
        // path: invalidate, notify, tear down.
        if self.session.authenticated {
            if let Err(error) = self.logout().await {
                tracing::warn!(
                    connection = %self.session.id(),
                    error = %error,
                    "logout on disconnect failed"
                );
            }
        }
        self.drop_watcher();

        tracing::debug!(connection = %self.session.id(), "session stopped");
    }

    /// The `authenticate` transition. See the crate docs for the order of
    /// operations; the short version: validate, issue, then — and only
    /// then — mutate.
    async fn authenticate(
        &mut self,
        request: AuthenticateRequest,
    ) -> Result<IssuedToken, SessionError> {
        // Scratch reset comes before any validation can fail, so even a
        // rejected request can't leak fields into the next one.
        self.session.begin_request(&request);

        let name = match request.strategy.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => return Err(SessionError::Validation("strategy must be provided".into())),
        };

        let entry = self.registry.get(name).ok_or_else(|| {
            SessionError::Configuration(format!("strategy `{name}` is not registered"))
        })?;
        let strategy = entry.strategy().clone();
        let options = entry.options().clone();
        let binding = entry.binding().cloned();

        let outcome = strategy.validate(self.session.context(), &options).await?;

        let principal = match outcome {
            Outcome::Granted { principal } => principal,
            Outcome::Denied { challenge } => {
                let message = self
                    .config
                    .failure_message
                    .clone()
                    .or_else(|| challenge_message(challenge.as_ref()))
                    .unwrap_or_else(|| "authentication failed".into());
                return Err(SessionError::NotAuthenticated { message, challenge });
            }
            Outcome::Unsupported => {
                return Err(SessionError::NotAuthenticated {
                    message: "unsupported strategy outcome".into(),
                    challenge: None,
                });
            }
        };

        // First side effect. Everything above must leave the connection
        // exactly as it was, so a failure here or earlier preserves any
        // previous session untouched.
        let token = self
            .tokens
            .issue(&principal, token_params(&principal))
            .await?;

        // One outstanding token per connection: the superseded token dies
        // once its replacement exists. Its invalidation failing must not
        // fail a re-login that already holds a valid token.
        if let Some(previous) = self.session.access_token.clone() {
            if let Err(error) = self.tokens.invalidate(&previous).await {
                tracing::warn!(
                    connection = %self.session.id(),
                    error = %error,
                    "superseded token invalidation failed"
                );
            }
        }

        self.session
            .apply_login(principal, &token, &self.config.header_name);
        self.timer
            .arm(self.config.token_ttl(), token.access_token.clone());
        self.swap_watcher(binding);

        self.events.publish(AuthEvent::Login {
            token: token.clone(),
            context: self.event_context(),
        });
        tracing::info!(
            connection = %self.session.id(),
            strategy = name,
            "connection authenticated"
        );

        Ok(token)
    }

    /// The `logout` transition: explicit requests, the expiry deadline,
    /// a removed principal, and disconnects all come through here.
    async fn logout(&mut self) -> Result<Option<IssuedToken>, SessionError> {
        // Idempotent: with no outstanding token there is nothing to do —
        // including a timer fire racing a just-finished logout.
        let Some(access_token) = self.session.access_token.clone() else {
            return Ok(None);
        };

        self.session.apply_logout();
        self.timer.disarm();
        self.drop_watcher();

        let invalidated = self.tokens.invalidate(&access_token).await?;

        self.events.publish(AuthEvent::Logout {
            token: invalidated.clone(),
            context: self.event_context(),
        });
        tracing::info!(connection = %self.session.id(), "connection logged out");

        Ok(Some(invalidated))
    }

    /// The expiry deadline fired for `access_token`.
    async fn expire(&mut self, access_token: String) {
        // A fire for anything but the current token lost a race with
        // re-login; the session it guarded is already gone.
        if self.session.access_token.as_deref() != Some(access_token.as_str()) {
            return;
        }

        tracing::info!(
            connection = %self.session.id(),
            "access token expired, forcing logout"
        );
        if let Err(error) = self.logout().await {
            tracing::warn!(
                connection = %self.session.id(),
                error = %error,
                "expiry logout failed"
            );
        }
    }

    /// An entity-feed event forwarded by the watcher.
    async fn apply_entity_event(&mut self, event: ServiceEvent) {
        let Some(watcher) = &self.watcher else { return };
        let id_field = watcher.id_field().to_string();

        // The watcher already filtered on the id captured at login; the
        // re-check against the current principal discards events a
        // replaced watcher queued before it was torn down.
        let matches = self
            .session
            .principal_id(&id_field)
            .is_some_and(|id| event.record.get(&id_field) == Some(id));
        if !matches {
            return;
        }

        match event.kind {
            ChangeKind::Updated | ChangeKind::Patched => {
                tracing::debug!(
                    connection = %self.session.id(),
                    kind = %event.kind,
                    "principal refreshed from entity feed"
                );
                self.session.refresh_principal(event.record);
            }
            ChangeKind::Removed => {
                tracing::info!(
                    connection = %self.session.id(),
                    "principal removed upstream, forcing logout"
                );
                if let Err(error) = self.logout().await {
                    tracing::warn!(
                        connection = %self.session.id(),
                        error = %error,
                        "removal logout failed"
                    );
                }
            }
        }
    }

    /// Replaces the entity watcher for a fresh login. The previous
    /// subscription always goes first, so repeated logins on one socket
    /// never accumulate listeners.
    fn swap_watcher(&mut self, binding: Option<WatcherBinding>) {
        self.drop_watcher();

        let Some(binding) = binding else { return };
        match self.session.principal_id(binding.id_field()) {
            Some(entity_id) => {
                self.watcher = Some(EntityWatcher::register(
                    &binding,
                    entity_id.clone(),
                    self.entity_tx.clone(),
                ));
            }
            None => tracing::warn!(
                connection = %self.session.id(),
                service = binding.path(),
                id_field = binding.id_field(),
                "principal has no id field, entity sync disabled for this login"
            ),
        }
    }

    fn drop_watcher(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.unregister();
        }
    }

    fn event_context(&self) -> EventContext {
        EventContext {
            provider: "socket".into(),
            path: self.config.service_path.clone(),
            connection: self.session.id(),
            authenticated: self.session.authenticated,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            connection: self.session.id(),
            authenticated: self.session.authenticated,
            access_token: self.session.access_token.clone(),
            principal: self.session.principal.clone(),
            headers: self.session.headers.clone(),
            expiry_armed: self.timer.is_armed(),
            watching: self.watcher.is_some(),
        }
    }
}

/// Issue-time params: the authenticated marker, then the principal's own
/// fields (which win on collision).
fn token_params(principal: &Value) -> TokenParams {
    let mut params = Map::new();
    params.insert("authenticated".into(), Value::Bool(true));
    if let Value::Object(fields) = principal {
        for (key, value) in fields {
            params.insert(key.clone(), value.clone());
        }
    }
    params
}

/// The `message` field of a challenge, when it carries one.
fn challenge_message(challenge: Option<&Value>) -> Option<String> {
    challenge?
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_token_params_marks_authenticated_and_spreads_principal() {
        let params = token_params(&json!({"id": 7, "email": "a@example.test"}));

        assert_eq!(params["authenticated"], true);
        assert_eq!(params["id"], 7);
        assert_eq!(params["email"], "a@example.test");
    }

    #[test]
    fn test_token_params_principal_fields_win_on_collision() {
        let params = token_params(&json!({"authenticated": "custom"}));
        assert_eq!(params["authenticated"], "custom");
    }

    #[test]
    fn test_token_params_non_object_principal_keeps_marker_only() {
        let params = token_params(&json!("service-account"));
        assert_eq!(params.len(), 1);
        assert_eq!(params["authenticated"], true);
    }

    #[test]
    fn test_challenge_message_extraction() {
        assert_eq!(
            challenge_message(Some(&json!({"message": "bad password"}))),
            Some("bad password".to_string())
        );
        assert_eq!(challenge_message(Some(&json!({"detail": "x"}))), None);
        assert_eq!(challenge_message(Some(&json!({"message": 42}))), None);
        assert_eq!(challenge_message(None), None);
    }
}
