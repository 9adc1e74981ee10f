//! # Tollgate
//!
//! Authentication state for long-lived, bidirectional socket connections.
//!
//! A deployment wires a [`Tollgate`] once — strategies, token service,
//! event sink, configuration — and opens one session per accepted
//! connection. Each session is an isolated actor that authenticates the
//! connection against a pluggable strategy, issues a time-bound access
//! token, forces re-authentication when the token expires, and keeps the
//! connection's cached principal synchronized with out-of-band changes.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tollgate::{
//!     AuthConfig, AuthenticateRequest, StrategyEntry, StrategyRegistry, Tollgate,
//! };
//!
//! # async fn run(password_strategy: Arc<dyn tollgate::Strategy>) {
//! let gate = Tollgate::builder()
//!     .config(AuthConfig::default())
//!     .registry(
//!         StrategyRegistry::builder()
//!             .register("local", StrategyEntry::new(password_strategy))
//!             .build(),
//!     )
//!     .build();
//!
//! // One session per accepted socket.
//! let session = gate.open(Default::default());
//! let request = AuthenticateRequest::new("local")
//!     .credential("username", "a")
//!     .credential("password", "p");
//! let token = session.authenticate(request, None).await;
//! # let _ = token;
//! # }
//! ```

mod error;
mod events;
mod gate;

pub use error::TollgateError;
pub use events::BroadcastEvents;
pub use gate::{Tollgate, TollgateBuilder};

pub use tollgate_protocol::{
    AuthEvent, AuthenticateRequest, ConnectionId, ErrorPayload, EventContext, IssuedToken,
    RequestContext,
};
pub use tollgate_session::{
    Ack, AuthConfig, EventSink, NullSink, SessionError, SessionHandle, SessionSnapshot,
};
pub use tollgate_strategy::{
    Outcome, Strategy, StrategyEntry, StrategyError, StrategyRegistry,
};
pub use tollgate_token::{MemoryTokenService, TokenError, TokenService};
pub use tollgate_watch::{
    BroadcastService, ChangeKind, EntityWatcher, ServiceEvent, WatchedService, WatcherBinding,
};

/// Initializes a `tracing` fmt subscriber filtered by `RUST_LOG`.
///
/// Convenience for binaries and examples; calling it more than once is
/// harmless (later calls are no-ops).
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
