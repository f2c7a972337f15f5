use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::ChatResult;

/// Base trait for generative-language backends.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Fail fast when the provider is not able to make any request, e.g.
    /// because its credential is missing. Called before a turn is recorded.
    fn check_config(&self) -> ChatResult<()> {
        Ok(())
    }

    /// Ask the model `question` and return the raw reply text.
    async fn generate(&self, question: &str) -> ChatResult<String>;
}

#[async_trait]
impl<P: Provider + ?Sized> Provider for Arc<P> {
    fn check_config(&self) -> ChatResult<()> {
        (**self).check_config()
    }

    async fn generate(&self, question: &str) -> ChatResult<String> {
        (**self).generate(question).await
    }
}
