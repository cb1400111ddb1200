use crate::error::*;
use tracing::{error, warn};

/// Logging and presentation helpers shared by every crate.
pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    /// Stable, coarse code for the failing subsystem.
    fn error_code(&self) -> &'static str;
    /// Finer code naming the specific failure within the subsystem.
    fn detail_code(&self) -> &'static str {
        self.error_code()
    }
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!(code = self.detail_code(), "{}", self);
        if let CoreError::Database(DatabaseError::Sql(e)) = self {
            error!("SQL error details: {:?}", e);
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!(code = self.detail_code(), "{}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => reddit_message(e),
            CoreError::Database(DatabaseError::CorruptRow { .. }) => {
                "Saved results could not be read. Regenerate them to continue.".to_string()
            }
            CoreError::Database(_) => "Saving or loading your results failed.".to_string(),
            CoreError::Llm(e) => llm_message(e),
            CoreError::Config(ConfigError::MissingField { field }) => {
                format!("The server is missing the '{field}' setting.")
            }
            CoreError::Config(_) => "The server configuration is invalid.".to_string(),
            CoreError::Network(_) => "Could not reach an upstream service.".to_string(),
            CoreError::InvalidInput { message } => message.clone(),
            CoreError::NotFound { resource } => format!("Nothing found for {resource}."),
            CoreError::Unprocessable { .. } => {
                "We couldn't read enough of this website to analyze it.".to_string()
            }
            CoreError::RequestFailed { message, .. } => message.clone(),
            CoreError::Io(_) | CoreError::Serialization(_) | CoreError::Internal { .. } => {
                "Something went wrong on our side.".to_string()
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CoreError::RedditApi(_) => "REDDIT_API",
            CoreError::Database(_) => "DATABASE",
            CoreError::Llm(_) => "LLM",
            CoreError::Config(_) => "CONFIG",
            CoreError::Io(_) => "IO",
            CoreError::Serialization(_) => "SERIALIZATION",
            CoreError::Network(_) => "NETWORK",
            CoreError::InvalidInput { .. } => "INVALID_INPUT",
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::Unprocessable { .. } => "UNPROCESSABLE",
            CoreError::Internal { .. } => "INTERNAL",
            CoreError::RequestFailed { .. } => "REQUEST_FAILED",
        }
    }

    fn detail_code(&self) -> &'static str {
        match self {
            CoreError::RedditApi(e) => match e {
                RedditApiError::AuthenticationFailed { .. } | RedditApiError::InvalidToken => {
                    "REDDIT_AUTH"
                }
                RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT",
                RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN",
                RedditApiError::SubredditNotFound { .. } => "REDDIT_SUBREDDIT_NOT_FOUND",
                RedditApiError::RequestTimeout => "REDDIT_TIMEOUT",
                RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE",
                RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR",
            },
            CoreError::Database(e) => match e {
                DatabaseError::ConnectionFailed { .. } => "DB_CONNECTION_FAILED",
                DatabaseError::MigrationFailed { .. } => "DB_MIGRATION_FAILED",
                DatabaseError::CorruptRow { .. } => "DB_CORRUPT_ROW",
                DatabaseError::Sql(_) => "DB_SQL",
            },
            CoreError::Llm(e) => match e {
                LlmError::InvalidApiKey { .. } => "LLM_INVALID_API_KEY",
                LlmError::RateLimitExceeded { .. } => "LLM_RATE_LIMIT",
                LlmError::ProviderError { .. } => "LLM_PROVIDER_ERROR",
                LlmError::InvalidPrompt { .. } => "LLM_INVALID_PROMPT",
                LlmError::RequestTimeout { .. } => "LLM_TIMEOUT",
                LlmError::InvalidResponseFormat { .. } => "LLM_INVALID_RESPONSE",
            },
            CoreError::Config(e) => match e {
                ConfigError::MissingField { .. } => "CONFIG_MISSING_FIELD",
                ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE",
                ConfigError::Parse(_) => "CONFIG_PARSE",
            },
            other => other.error_code(),
        }
    }
}

fn reddit_message(error: &RedditApiError) -> String {
    match error {
        RedditApiError::SubredditNotFound { subreddit } => {
            format!("r/{subreddit} does not exist or is private.")
        }
        RedditApiError::Forbidden { resource } => {
            format!("{resource} is private or quarantined.")
        }
        RedditApiError::RateLimitExceeded { retry_after } => {
            format!("Reddit is limiting requests. Try again in {retry_after} seconds.")
        }
        RedditApiError::AuthenticationFailed { .. } | RedditApiError::InvalidToken => {
            "The server could not authenticate with Reddit.".to_string()
        }
        _ => "Reddit did not answer as expected. Try again shortly.".to_string(),
    }
}

fn llm_message(error: &LlmError) -> String {
    match error {
        LlmError::RateLimitExceeded { .. } => {
            "The AI service is busy. Wait a moment before generating again.".to_string()
        }
        LlmError::RequestTimeout { .. } => "The AI service took too long to answer.".to_string(),
        LlmError::InvalidApiKey { provider } => {
            format!("The server's {provider} credentials were rejected.")
        }
        _ => "The AI service failed to generate a response.".to_string(),
    }
}
