//! Access-token issuance and invalidation for Tollgate.
//!
//! The core never stores tokens itself — it asks a [`TokenService`] to
//! issue one on login and to invalidate it on logout. How tokens are
//! persisted (database, cache, signed JWTs with a revocation list) is the
//! service implementation's concern.
//!
//! [`MemoryTokenService`] is the in-process implementation: random 128-bit
//! tokens in a map. It's the default for development and tests, the same
//! way a JSON codec is the default wire format until production swaps in
//! something heavier.

mod error;
mod memory;
mod service;

pub use error::TokenError;
pub use memory::MemoryTokenService;
pub use service::{TokenParams, TokenService};
