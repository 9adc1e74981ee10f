//! Unified error type for the Tollgate meta-crate.

use tollgate_session::SessionError;
use tollgate_strategy::StrategyError;
use tollgate_token::TokenError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `tollgate` meta-crate, embedders deal with this single
/// error type instead of importing errors from each sub-crate; `?`
/// converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TollgateError {
    /// A strategy-layer error (validator failed, backend unreachable).
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    /// A token-service error (issue refused, unknown token).
    #[error(transparent)]
    Token(#[from] TokenError),

    /// A session-layer error (validation, configuration, rejection).
    #[error(transparent)]
    Session(#[from] SessionError),
}
