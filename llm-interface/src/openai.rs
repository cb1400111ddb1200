use crate::{CompletionRequest, LlmProvider};
use async_trait::async_trait;
use blastari_core::{ConfigError, CoreError, LlmError, OpenAiConfig};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

const PROVIDER: &str = "openai";

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u64,
}

#[derive(Debug, Serialize)]
struct ImageBody<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'static str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

/// Client for an OpenAI-compatible API (`/chat/completions`,
/// `/images/generations`).
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
    image_model: String,
}

impl OpenAiProvider {
    pub fn new(
        api_key: String,
        base_url: &str,
        model: String,
        image_model: String,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            image_model,
        })
    }

    pub fn from_config(config: &OpenAiConfig, timeout: Duration) -> Result<Self, CoreError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingField {
                field: "openai.api_key".to_string(),
            })?;
        Self::new(
            api_key,
            &config.base_url,
            config.model.clone(),
            config.image_model.clone(),
            timeout,
        )
    }

    async fn post_json<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!("OpenAI request to {} failed: {}", endpoint, e);
                if e.is_timeout() {
                    CoreError::Llm(LlmError::RequestTimeout {
                        provider: PROVIDER.to_string(),
                    })
                } else {
                    CoreError::Network(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        error!("OpenAI returned {} for {}: {}", status, endpoint, message);
        let err = match status.as_u16() {
            401 => LlmError::InvalidApiKey {
                provider: PROVIDER.to_string(),
            },
            429 => LlmError::RateLimitExceeded {
                provider: PROVIDER.to_string(),
            },
            code => LlmError::ProviderError {
                provider: PROVIDER.to_string(),
                status_code: code,
                message,
            },
        };
        Err(CoreError::Llm(err))
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CoreError> {
        if request.messages.is_empty() {
            return Err(CoreError::Llm(LlmError::InvalidPrompt {
                reason: "no messages".to_string(),
            }));
        }

        let body = ChatCompletionBody {
            model: &self.model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        debug!(
            "Requesting completion: model={}, messages={}, json={}",
            self.model,
            body.messages.len(),
            request.json_mode
        );
        let response = self.post_json("/chat/completions", &body).await?;
        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!("Failed to decode completion response: {}", e);
            CoreError::Llm(LlmError::InvalidResponseFormat {
                provider: PROVIDER.to_string(),
            })
        })?;

        if let Some(usage) = &parsed.usage {
            info!("Completion used {} tokens", usage.total_tokens);
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                CoreError::Llm(LlmError::InvalidResponseFormat {
                    provider: PROVIDER.to_string(),
                })
            })
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, CoreError> {
        if prompt.trim().is_empty() {
            return Err(CoreError::Llm(LlmError::InvalidPrompt {
                reason: "empty image prompt".to_string(),
            }));
        }

        let body = ImageBody {
            model: &self.image_model,
            prompt,
            n: 1,
            size: "1024x1024",
        };
        let response = self.post_json("/images/generations", &body).await?;
        let parsed: ImageResponse = response.json().await.map_err(|e| {
            error!("Failed to decode image response: {}", e);
            CoreError::Llm(LlmError::InvalidResponseFormat {
                provider: PROVIDER.to_string(),
            })
        })?;

        parsed
            .data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or_else(|| {
                CoreError::Llm(LlmError::InvalidResponseFormat {
                    provider: PROVIDER.to_string(),
                })
            })
    }
}
