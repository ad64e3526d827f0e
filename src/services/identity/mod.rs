pub mod clerk;

use async_trait::async_trait;

/// Verified caller identity as reported by the identity provider.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` when the token is invalid or expired; `Err` only when the
    /// provider itself cannot be reached.
    async fn verify_token(&self, token: &str) -> anyhow::Result<Option<Identity>>;
}
