//! Solar API Provider
//!
//! Chat completions client for Upstage Solar. Any OpenAI-compatible endpoint
//! works as long as it accepts `{model, messages, stream}` and a bearer key.

use async_trait::async_trait;
use futures::TryStreamExt;
use secrecy::{ExposeSecret, SecretString};
use tokio_util::io::StreamReader;
use tracing::{debug, info};

use super::{
    ChatCompletionResponse, ChatExchange, DeltaStream, LlmProvider, decode_events, strip_thinking,
};
use crate::config::LlmConfig;
use crate::types::{Result, SgitError};

/// Solar provider with secure API key handling
pub struct SolarProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for SolarProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolarProvider")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

impl SolarProvider {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config.api_key().ok_or(SgitError::MissingCredential)?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("sgit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SgitError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key.to_string()),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            client,
        })
    }

    async fn send(&self, prompt: &str, stream: bool) -> Result<reqwest::Response> {
        let exchange = ChatExchange::single(&self.model, prompt, stream);

        debug!(
            "POST {} (model: {}, stream: {}, prompt chars: {})",
            self.endpoint,
            self.model,
            stream,
            prompt.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&exchange)
            .send()
            .await
            .map_err(|e| SgitError::LlmApi(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SgitError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl LlmProvider for SolarProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        info!("Generating with {} (model: {})", self.name(), self.model);

        let response = self.send(prompt, false).await?;
        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| SgitError::LlmApi(format!("Failed to parse response: {}", e)))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SgitError::LlmApi("No choices in response".to_string()))?;
        let content = choice
            .message
            .content
            .ok_or_else(|| SgitError::LlmApi("No content in response".to_string()))?;

        Ok(strip_thinking(&content))
    }

    async fn stream(&self, prompt: &str) -> Result<DeltaStream> {
        info!("Streaming with {} (model: {})", self.name(), self.model);

        let response = self.send(prompt, true).await?;
        let body = StreamReader::new(response.bytes_stream().map_err(std::io::Error::other));
        Ok(decode_events(body))
    }

    fn name(&self) -> &str {
        "solar"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
