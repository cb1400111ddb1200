use blastari_core::{ConfigError, CoreError, DatabaseError, ErrorExt, LlmError, RedditApiError};

#[test]
fn test_error_codes() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    assert_eq!(reddit_error.error_code(), "REDDIT_API");
    assert_eq!(reddit_error.detail_code(), "REDDIT_AUTH");

    let db_error = CoreError::Database(DatabaseError::CorruptRow {
        table: "website_analyses".to_string(),
        details: "bad json".to_string(),
    });
    assert_eq!(db_error.error_code(), "DATABASE");
    assert_eq!(db_error.detail_code(), "DB_CORRUPT_ROW");

    let llm_error = CoreError::Llm(LlmError::RateLimitExceeded {
        provider: "openai".to_string(),
    });
    assert_eq!(llm_error.detail_code(), "LLM_RATE_LIMIT");

    let blocked = CoreError::Unprocessable {
        reason: "content too short".to_string(),
    };
    assert_eq!(blocked.error_code(), "UNPROCESSABLE");
    assert_eq!(blocked.detail_code(), "UNPROCESSABLE");
}

#[test]
fn test_unprocessable_message_prefix() {
    let blocked = CoreError::Unprocessable {
        reason: "site returned 403".to_string(),
    };
    assert!(blocked.to_string().starts_with("Unable to analyze website"));
}

#[test]
fn test_sqlx_error_converts_to_database_error() {
    let error: CoreError = sqlx::Error::RowNotFound.into();
    assert!(matches!(error, CoreError::Database(DatabaseError::Sql(_))));
}

#[test]
fn test_user_friendly_messages() {
    let missing = CoreError::RedditApi(RedditApiError::SubredditNotFound {
        subreddit: "nosuchplace".to_string(),
    });
    assert_eq!(
        missing.user_friendly_message(),
        "r/nosuchplace does not exist or is private."
    );

    let config_error = CoreError::Config(ConfigError::MissingField {
        field: "openai.api_key".to_string(),
    });
    assert!(config_error.user_friendly_message().contains("openai.api_key"));

    let input_error = CoreError::invalid_input("url is required");
    assert_eq!(input_error.user_friendly_message(), "url is required");
}

#[test]
fn test_logging_returns_the_error() {
    let error = CoreError::Internal {
        message: "boom".to_string(),
    };
    assert_eq!(error.log_error().error_code(), "INTERNAL");
    assert_eq!(error.log_warn().error_code(), "INTERNAL");
}
