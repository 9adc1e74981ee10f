//! Per-connection authentication state for Tollgate.
//!
//! This crate is the core of the system: one actor task per socket
//! connection owning that connection's entire authentication lifecycle:
//!
//! 1. **Authenticate** — validate against a registered strategy, issue an
//!    access token, arm the expiry deadline, register the entity watcher,
//!    broadcast `login`.
//! 2. **Stay honest** — refresh the cached principal when its backing
//!    record changes, force logout when it's removed, force logout when
//!    the token's TTL lapses.
//! 3. **Logout** — explicit, timer-fired, or disconnect-triggered; all
//!    three take the same path: clear state, disarm the deadline,
//!    unregister the watcher, invalidate the token, broadcast `logout`.
//!
//! # Concurrency
//!
//! All mutations of one connection's state are serialized by its actor's
//! `tokio::select!` loop; an operation that suspends (strategy validation,
//! token issuance) cannot interleave with another operation on the same
//! connection. Sessions of different connections are fully independent
//! tasks.

mod callback;
mod config;
mod connection;
mod error;
mod events;
mod expiry;
mod handler;

pub use callback::Ack;
pub use config::AuthConfig;
pub use connection::ConnectionSession;
pub use error::SessionError;
pub use events::{EventSink, NullSink};
pub use expiry::ExpiryTimer;
pub use handler::{SessionHandle, SessionSnapshot, spawn_session};
