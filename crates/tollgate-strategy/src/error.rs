//! Error types for the strategy layer.

/// Errors a strategy validator can raise.
///
/// These are collaborator failures — the validator itself broke, as
/// opposed to it deciding the credentials are bad (that's an
/// [`Outcome`](crate::Outcome), not an error).
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    /// The validator failed while evaluating the request.
    #[error("strategy validator failed: {0}")]
    Validator(String),

    /// The backend the strategy depends on could not be reached.
    #[error("strategy backend unavailable: {0}")]
    Unavailable(String),
}
