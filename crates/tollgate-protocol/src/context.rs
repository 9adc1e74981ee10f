//! Per-request context: the scratch state a strategy validates against.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// The transient context of one inbound request.
///
/// Each connection owns exactly one of these; the session handler resets it
/// at the start of every `authenticate`, before any validation can fail, so
/// nothing from a previous request leaks into the next one. It is never
/// shared across connections.
///
/// Strategies read from it: a password strategy looks at `body`, a
/// header-token strategy at `headers`, a cookie strategy at `cookies`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    /// Query-string fields of the request, if the transport carries any.
    pub query: Map<String, Value>,

    /// Route/transport parameters.
    pub params: Map<String, Value>,

    /// The request body: for `authenticate`, every payload field except
    /// `strategy`.
    pub body: Map<String, Value>,

    /// The connection's handshake headers, copied in per request.
    pub headers: HashMap<String, String>,

    /// Server-side session fields, if the surrounding system uses any.
    pub session: Map<String, Value>,

    /// Cookies from the handshake.
    pub cookies: HashMap<String, String>,
}

impl RequestContext {
    /// Clears every field back to empty.
    pub fn reset(&mut self) {
        self.query.clear();
        self.params.clear();
        self.body.clear();
        self.headers.clear();
        self.session.clear();
        self.cookies.clear();
    }

    /// Whether all fields are empty.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
            && self.params.is_empty()
            && self.body.is_empty()
            && self.headers.is_empty()
            && self.session.is_empty()
            && self.cookies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_every_field() {
        let mut ctx = RequestContext::default();
        ctx.query.insert("page".into(), 1.into());
        ctx.params.insert("provider".into(), "socket".into());
        ctx.body.insert("username".into(), "a".into());
        ctx.headers.insert("host".into(), "example.test".into());
        ctx.session.insert("seen".into(), true.into());
        ctx.cookies.insert("sid".into(), "abc".into());
        assert!(!ctx.is_empty());

        ctx.reset();

        assert!(ctx.is_empty());
    }

    #[test]
    fn test_default_is_empty() {
        assert!(RequestContext::default().is_empty());
    }
}
