//! Pluggable authentication strategies for Tollgate.
//!
//! Tollgate doesn't validate credentials itself — that's the job of a
//! [`Strategy`] implementation (password check, API key lookup, an external
//! identity provider, whatever the deployment needs). This crate defines:
//!
//! 1. **The seam** — the [`Strategy`] trait: one async method from a
//!    request context to an [`Outcome`].
//! 2. **The wiring** — the [`StrategyRegistry`]: an immutable map from a
//!    strategy name to its validator, its per-strategy options, and the
//!    [`WatcherBinding`](tollgate_watch::WatcherBinding) used to keep the
//!    authenticated entity synchronized after login.
//!
//! The registry is built once at startup and shared read-only by every
//! connection, so lookups are lock-free and safe under any concurrency.

mod error;
mod registry;
mod strategy;

pub use error::StrategyError;
pub use registry::{StrategyEntry, StrategyRegistry, StrategyRegistryBuilder};
pub use strategy::{Outcome, Strategy};
