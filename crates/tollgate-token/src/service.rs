//! The token service seam.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tollgate_protocol::IssuedToken;

use crate::TokenError;

/// Issue-time parameters: the authenticated marker plus the principal's
/// fields, passed through to the service so it can bake claims into the
/// token or its metadata.
pub type TokenParams = Map<String, Value>;

/// Issues and invalidates access tokens.
///
/// Exactly one token is outstanding per authenticated connection; the
/// session handler enforces that by invalidating a superseded token
/// whenever it issues a replacement. The service itself is shared by
/// every connection and must be safe for concurrent use.
#[async_trait]
pub trait TokenService: Send + Sync + 'static {
    /// Mints a token for `principal`.
    ///
    /// # Errors
    /// Returns [`TokenError::Issue`] when the token cannot be minted.
    async fn issue(
        &self,
        principal: &Value,
        params: TokenParams,
    ) -> Result<IssuedToken, TokenError>;

    /// Removes an outstanding token, returning it.
    ///
    /// # Errors
    /// Returns [`TokenError::UnknownToken`] when the token is not
    /// outstanding.
    async fn invalidate(&self, access_token: &str) -> Result<IssuedToken, TokenError>;
}
