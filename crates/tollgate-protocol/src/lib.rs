//! Shared types for Tollgate.
//!
//! This crate defines the data that moves between the layers:
//!
//! - **Payloads** ([`AuthenticateRequest`], [`IssuedToken`],
//!   [`ErrorPayload`]) — what a client submits and what it gets back.
//! - **Context** ([`RequestContext`]) — the per-request scratch a strategy
//!   validates against.
//! - **Notifications** ([`AuthEvent`], [`EventContext`]) — the
//!   process-wide login/logout broadcasts.
//!
//! It sits below every other crate and knows nothing about connections,
//! strategies, or token stores — only the shapes they exchange.

mod context;
mod events;
mod failure;
mod types;

pub use context::RequestContext;
pub use events::{AuthEvent, EventContext};
pub use failure::ErrorPayload;
pub use types::{AuthenticateRequest, ConnectionId, IssuedToken};
