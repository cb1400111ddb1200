use thiserror::Error;

/// Every failure a BLASTari crate reports. Upstream messages are kept in the
/// `Display` text so they can be passed through to the caller unchanged.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Reddit request failed: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("Storage failure: {0}")]
    Database(#[from] DatabaseError),

    #[error("AI service failure: {0}")]
    Llm(#[from] LlmError),

    #[error("Bad configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP transport failure: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// The client shows its analysis error page for this prefix.
    #[error("Unable to analyze website: {reason}")]
    Unprocessable { reason: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("{message}")]
    RequestFailed {
        message: String,
        status_code: Option<u16>,
    },
}

impl CoreError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        CoreError::NotFound {
            resource: resource.into(),
        }
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(e: sqlx::Error) -> Self {
        CoreError::Database(DatabaseError::Sql(e))
    }
}

#[derive(Error, Debug, Clone)]
pub enum RedditApiError {
    #[error("token request rejected: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("rate limited, retry in {retry_after}s")]
    RateLimitExceeded { retry_after: u64 },

    #[error("access to {resource} is forbidden")]
    Forbidden { resource: String },

    #[error("r/{subreddit} does not exist")]
    SubredditNotFound { subreddit: String },

    #[error("access token rejected")]
    InvalidToken,

    #[error("timed out")]
    RequestTimeout,

    #[error("unexpected response: {details}")]
    InvalidResponse { details: String },

    #[error("Reddit returned HTTP {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("cannot open database: {reason}")]
    ConnectionFailed { reason: String },

    #[error("migration failed: {migration}")]
    MigrationFailed { migration: String },

    #[error("unreadable row in {table}: {details}")]
    CorruptRow { table: String, details: String },

    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("{provider} rejected the API key")]
    InvalidApiKey { provider: String },

    #[error("{provider} is rate limiting requests")]
    RateLimitExceeded { provider: String },

    #[error("{provider} returned HTTP {status_code}: {message}")]
    ProviderError {
        provider: String,
        status_code: u16,
        message: String,
    },

    #[error("prompt rejected: {reason}")]
    InvalidPrompt { reason: String },

    #[error("{provider} timed out")]
    RequestTimeout { provider: String },

    #[error("{provider} returned no usable content")]
    InvalidResponseFormat { provider: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} is required")]
    MissingField { field: String },

    #[error("{field} cannot be '{value}'")]
    InvalidValue { field: String, value: String },

    #[error("cannot load configuration: {0}")]
    Parse(#[from] config::ConfigError),
}
