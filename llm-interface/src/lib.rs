pub mod openai;
pub mod parse;

pub use openai::OpenAiProvider;
pub use parse::{parse_ai_json, parse_or_fallback, strip_code_fences, AiPayload};

use async_trait::async_trait;
use blastari_core::{ChatRole, CoreError};

#[derive(Debug, Clone, PartialEq)]
pub struct PromptMessage {
    pub role: ChatRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// One completion call. Handlers fix temperature and token budget per use.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<PromptMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub json_mode: bool,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![PromptMessage::system(system), PromptMessage::user(user)],
            temperature: 0.7,
            max_tokens: 1000,
            json_mode: false,
        }
    }

    pub fn with_history(mut self, history: Vec<PromptMessage>) -> Self {
        // History goes between the system prompt and the latest user turn.
        let latest = self.messages.pop();
        self.messages.extend(history);
        self.messages.extend(latest);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the text of the first choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CoreError>;

    /// Returns the URL of one generated image.
    async fn generate_image(&self, prompt: &str) -> Result<String, CoreError>;
}
