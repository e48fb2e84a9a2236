//! Model backends

pub mod ollama;

// Re-export for convenience
pub use ollama::OllamaClient;

use async_trait::async_trait;

/// Something that turns a prompt into model output
#[async_trait]
pub trait ModelClient: Send + Sync
{   /// Run one prompt with the given configuration snapshot
    async fn query(
      &self
    , prompt: &str
    , config: &crate::config::Configuration
    ) -> Result<String, crate::error::QueryError>;
}
