use async_trait::async_trait;
use std::sync::Arc;

use super::error::ProviderResult;

/// A text-completion backend: one prompt in, one answer out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> ProviderResult<String>;

    /// Model identifier, for logging.
    fn model_id(&self) -> &str;
}

pub type BoxedLanguageModel = Arc<dyn LanguageModel>;
