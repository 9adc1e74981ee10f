//! In-process token store.

use std::collections::HashMap;

use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;
use tokio::sync::Mutex;
use tollgate_protocol::IssuedToken;

use crate::{TokenError, TokenParams, TokenService};

/// A [`TokenService`] backed by a map in process memory.
///
/// Issued tokens are random 32-character hex strings (128 bits of
/// entropy — guessing one is computationally infeasible). The issue-time
/// params become the token's metadata verbatim, so whatever the handler
/// passed (`authenticated`, principal fields) rides along with the token.
///
/// Everything is lost on restart, which is exactly right for development
/// and tests and exactly wrong for production.
#[derive(Debug, Default)]
pub struct MemoryTokenService {
    outstanding: Mutex<HashMap<String, IssuedToken>>,
}

impl MemoryTokenService {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of currently outstanding tokens.
    pub async fn outstanding(&self) -> usize {
        self.outstanding.lock().await.len()
    }
}

#[async_trait]
impl TokenService for MemoryTokenService {
    async fn issue(
        &self,
        _principal: &Value,
        params: TokenParams,
    ) -> Result<IssuedToken, TokenError> {
        let token = IssuedToken {
            access_token: generate_access_token(),
            metadata: params,
        };

        self.outstanding
            .lock()
            .await
            .insert(token.access_token.clone(), token.clone());

        tracing::debug!("access token issued");
        Ok(token)
    }

    async fn invalidate(&self, access_token: &str) -> Result<IssuedToken, TokenError> {
        let token = self
            .outstanding
            .lock()
            .await
            .remove(access_token)
            .ok_or(TokenError::UnknownToken)?;

        tracing::debug!("access token invalidated");
        Ok(token)
    }
}

/// Generates a random 32-character hex string (128 bits of entropy).
fn generate_access_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::*;

    fn params() -> TokenParams {
        let mut params = Map::new();
        params.insert("authenticated".into(), json!(true));
        params.insert("id".into(), json!(7));
        params
    }

    #[tokio::test]
    async fn test_issue_returns_hex_token_with_params_as_metadata() {
        let service = MemoryTokenService::new();

        let token = service.issue(&json!({"id": 7}), params()).await.unwrap();

        assert_eq!(token.access_token.len(), 32);
        assert!(token.access_token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(token.metadata["authenticated"], true);
        assert_eq!(token.metadata["id"], 7);
    }

    #[tokio::test]
    async fn test_issue_generates_unique_tokens() {
        let service = MemoryTokenService::new();

        let a = service.issue(&json!({"id": 1}), params()).await.unwrap();
        let b = service.issue(&json!({"id": 1}), params()).await.unwrap();

        assert_ne!(a.access_token, b.access_token);
        assert_eq!(service.outstanding().await, 2);
    }

    #[tokio::test]
    async fn test_invalidate_known_token_removes_it() {
        let service = MemoryTokenService::new();
        let issued = service.issue(&json!({"id": 7}), params()).await.unwrap();

        let invalidated = service.invalidate(&issued.access_token).await.unwrap();

        assert_eq!(invalidated.access_token, issued.access_token);
        assert_eq!(service.outstanding().await, 0);
    }

    #[tokio::test]
    async fn test_invalidate_twice_returns_unknown_token() {
        let service = MemoryTokenService::new();
        let issued = service.issue(&json!({"id": 7}), params()).await.unwrap();

        service.invalidate(&issued.access_token).await.unwrap();
        let second = service.invalidate(&issued.access_token).await;

        assert!(matches!(second, Err(TokenError::UnknownToken)));
    }

    #[tokio::test]
    async fn test_invalidate_never_issued_returns_unknown_token() {
        let service = MemoryTokenService::new();

        let result = service.invalidate("not-a-real-token").await;

        assert!(matches!(result, Err(TokenError::UnknownToken)));
    }
}
