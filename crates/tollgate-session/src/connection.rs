//! Per-connection authentication state.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tollgate_protocol::{AuthenticateRequest, ConnectionId, IssuedToken, RequestContext};

/// Everything one connection knows about who it is.
///
/// Owned exclusively by the connection's session actor for the lifetime
/// of the socket; mutated only inside the authenticate/logout
/// transitions. Created empty when the socket opens, populated on
/// successful authenticate, cleared again on logout, discarded when the
/// socket closes.
#[derive(Debug)]
pub struct ConnectionSession {
    id: ConnectionId,

    /// Snapshot of the authenticated entity, `None` while
    /// unauthenticated. Kept current by the entity watcher.
    pub principal: Option<Value>,

    /// The outstanding access token, `None` while unauthenticated.
    pub access_token: Option<String>,

    /// Metadata the token service attached to the outstanding token.
    pub token_metadata: Map<String, Value>,

    /// Whether the connection currently holds a live token.
    pub authenticated: bool,

    /// Connection headers: the transport handshake's contribution, plus
    /// the configured token header after login. Cleared on logout.
    pub headers: HashMap<String, String>,

    context: RequestContext,
}

impl ConnectionSession {
    /// Fresh, unauthenticated state for a newly opened socket.
    pub fn new(id: ConnectionId, headers: HashMap<String, String>) -> Self {
        Self {
            id,
            principal: None,
            access_token: None,
            token_metadata: Map::new(),
            authenticated: false,
            headers,
            context: RequestContext::default(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The per-request scratch, as last staged by
    /// [`begin_request`](Self::begin_request).
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Resets the per-request scratch and stages the request: `body`
    /// gets every payload field except `strategy`, `headers` a copy of
    /// the connection headers.
    ///
    /// Runs before any validation, unconditionally — a request that goes
    /// on to fail still must not leave the previous request's fields
    /// behind.
    pub fn begin_request(&mut self, request: &AuthenticateRequest) {
        self.context.reset();
        self.context.body = request.credentials.clone();
        self.context.headers = self.headers.clone();
    }

    /// The Authenticated transition: merge the principal, the token and
    /// its metadata, and the token header.
    pub fn apply_login(&mut self, principal: Value, token: &IssuedToken, header_name: &str) {
        self.principal = Some(principal);
        self.access_token = Some(token.access_token.clone());
        self.token_metadata = token.metadata.clone();
        self.headers
            .insert(header_name.to_string(), token.access_token.clone());
        self.authenticated = true;
    }

    /// The Unauthenticated transition: clear everything login merged in,
    /// plus the transient request body.
    pub fn apply_logout(&mut self) {
        self.principal = None;
        self.access_token = None;
        self.token_metadata = Map::new();
        self.authenticated = false;
        self.headers.clear();
        self.context.body.clear();
    }

    /// Replaces the cached principal with an authoritative record from
    /// the entity feed.
    pub fn refresh_principal(&mut self, record: Value) {
        self.principal = Some(record);
    }

    /// The cached principal's id under `id_field`, if authenticated and
    /// the field exists.
    pub fn principal_id(&self, id_field: &str) -> Option<&Value> {
        self.principal.as_ref().and_then(|p| p.get(id_field))
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn session() -> ConnectionSession {
        ConnectionSession::new(
            ConnectionId(1),
            HashMap::from([("host".to_string(), "example.test".to_string())]),
        )
    }

    fn token() -> IssuedToken {
        IssuedToken::new("T1").meta("authenticated", true)
    }

    #[test]
    fn test_new_session_is_unauthenticated() {
        let session = session();
        assert!(!session.authenticated);
        assert_eq!(session.access_token, None);
        assert_eq!(session.principal, None);
        assert!(session.context().is_empty());
    }

    #[test]
    fn test_begin_request_stages_body_without_strategy() {
        let mut session = session();
        let request = AuthenticateRequest::new("local")
            .credential("username", "a")
            .credential("password", "p");

        session.begin_request(&request);

        let body = &session.context().body;
        assert_eq!(body["username"], "a");
        assert_eq!(body["password"], "p");
        assert!(body.get("strategy").is_none());
        assert_eq!(session.context().headers["host"], "example.test");
    }

    #[test]
    fn test_begin_request_clears_previous_scratch() {
        let mut session = session();
        session.begin_request(
            &AuthenticateRequest::new("local").credential("username", "first"),
        );

        session.begin_request(&AuthenticateRequest::new("api-key").credential("key", "k"));

        let body = &session.context().body;
        assert!(body.get("username").is_none(), "no cross-request leakage");
        assert_eq!(body["key"], "k");
    }

    #[test]
    fn test_apply_login_merges_state() {
        let mut session = session();

        session.apply_login(json!({"id": 7}), &token(), "Authorization");

        assert!(session.authenticated);
        assert_eq!(session.access_token.as_deref(), Some("T1"));
        assert_eq!(session.principal, Some(json!({"id": 7})));
        assert_eq!(session.token_metadata["authenticated"], true);
        assert_eq!(session.headers["Authorization"], "T1");
        assert_eq!(session.headers["host"], "example.test");
    }

    #[test]
    fn test_apply_logout_clears_state() {
        let mut session = session();
        session.begin_request(&AuthenticateRequest::new("local").credential("username", "a"));
        session.apply_login(json!({"id": 7}), &token(), "Authorization");

        session.apply_logout();

        assert!(!session.authenticated);
        assert_eq!(session.access_token, None);
        assert_eq!(session.principal, None);
        assert!(session.token_metadata.is_empty());
        assert!(session.headers.is_empty());
        assert!(session.context().body.is_empty());
    }

    #[test]
    fn test_refresh_principal_replaces_snapshot() {
        let mut session = session();
        session.apply_login(json!({"id": 7, "name": "before"}), &token(), "Authorization");

        session.refresh_principal(json!({"id": 7, "name": "after"}));

        assert_eq!(session.principal, Some(json!({"id": 7, "name": "after"})));
        // The refresh touches only the snapshot, not the token state.
        assert!(session.authenticated);
        assert_eq!(session.access_token.as_deref(), Some("T1"));
    }

    #[test]
    fn test_principal_id_extraction() {
        let mut session = session();
        assert_eq!(session.principal_id("id"), None);

        session.apply_login(json!({"id": 7}), &token(), "Authorization");

        assert_eq!(session.principal_id("id"), Some(&json!(7)));
        assert_eq!(session.principal_id("uuid"), None);
    }
}
