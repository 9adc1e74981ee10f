//! Error types for the token layer.

/// Errors from a token service.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The service could not mint a token.
    #[error("token issue failed: {0}")]
    Issue(String),

    /// The token to invalidate is not outstanding — already invalidated,
    /// expired out of the store, or never issued.
    #[error("unknown access token")]
    UnknownToken,
}
