use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    base::Provider,
    configs::GeminiProviderConfig,
    types::content::GenerateContentRequest,
    utils::{reply_text, structured_prompt},
};
use crate::errors::{ChatError, ChatResult};

pub struct GeminiProvider {
    client: Client,
    config: GeminiProviderConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiProviderConfig) -> ChatResult<Self> {
        // No timeout: a request that never resolves keeps the caller waiting.
        let client = Client::builder().build()?;

        Ok(Self { client, config })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.host.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn post(&self, api_key: &str, payload: &GenerateContentRequest) -> ChatResult<Value> {
        let response = self
            .client
            .post(self.url())
            .query(&[("key", api_key)])
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "generateContent request failed");
            return Err(ChatError::Http {
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn check_config(&self) -> ChatResult<()> {
        match self.config.api_key {
            Some(_) => Ok(()),
            None => Err(ChatError::MissingApiKey),
        }
    }

    async fn generate(&self, question: &str) -> ChatResult<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ChatError::MissingApiKey)?;

        let payload = GenerateContentRequest::single(&structured_prompt(question));
        debug!(model = %self.config.model, "sending generateContent request");

        let response = self.post(api_key, &payload).await?;
        Ok(reply_text(&response))
    }
}
