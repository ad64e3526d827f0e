pub mod openai;

use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Map free text to a fixed-dimension vector.
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}
