pub mod api;
pub mod auth;
pub mod metrics;


pub use api::{ListingPage, RedditApiClient, RedditPostData, RedditSubredditData, Thing};
pub use auth::{ClientCredentialsAuth, RedditOAuth2Config, RedditToken};

use async_trait::async_trait;
use blastari_core::{
    ConfigError, CoreError, Listing, RedditApiError, RedditConfig, RedditPost, SubredditAbout,
    SubredditSource,
};
use std::time::Duration;
use tracing::warn;

/// Application-authenticated Reddit access: the token lifecycle plus the
/// read-only endpoints the analytics need.
#[derive(Debug)]
pub struct RedditClient {
    auth: ClientCredentialsAuth,
    api: RedditApiClient,
}

impl RedditClient {
    pub fn new(
        config: RedditOAuth2Config,
        api_base_url: &str,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let api = RedditApiClient::with_base_url(&config.user_agent, api_base_url, timeout)?;
        let auth = ClientCredentialsAuth::new(config, timeout)?;
        Ok(Self { auth, api })
    }

    pub fn from_config(config: &RedditConfig, timeout: Duration) -> Result<Self, CoreError> {
        let client_id = config.client_id.clone().ok_or(ConfigError::MissingField {
            field: "reddit.client_id".to_string(),
        })?;
        let client_secret = config
            .client_secret
            .clone()
            .ok_or(ConfigError::MissingField {
                field: "reddit.client_secret".to_string(),
            })?;

        let oauth = RedditOAuth2Config::new(
            client_id,
            client_secret,
            config.user_agent.clone(),
            config.token_url.clone(),
        );
        Self::new(oauth, &config.api_base_url, timeout)
    }

    pub fn api(&self) -> &RedditApiClient {
        &self.api
    }

    pub fn auth(&self) -> &ClientCredentialsAuth {
        &self.auth
    }

    /// Shared handle to the outbound request counters, for reporting.
    pub fn metrics_collector(&self) -> std::sync::Arc<metrics::MetricsCollector> {
        self.api.metrics_collector()
    }

    pub async fn get_api_metrics(&self) -> metrics::ApiMetrics {
        self.api.metrics().await
    }

    /// A 401 means Reddit revoked the token early; forget it so the next
    /// request authenticates again. The failing call itself is not retried.
    async fn forget_token_on_401<T>(&self, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if let Err(CoreError::RedditApi(RedditApiError::InvalidToken)) = &result {
            warn!("Reddit rejected the cached token; it will be renewed on next use");
            self.auth.invalidate().await;
        }
        result
    }
}

#[async_trait]
impl SubredditSource for RedditClient {
    async fn about(&self, subreddit: &str) -> Result<SubredditAbout, CoreError> {
        let token = self.auth.access_token().await?;
        let result = self.api.get_subreddit_info(&token, subreddit).await;
        self.forget_token_on_401(result).await.map(Into::into)
    }

    async fn posts(
        &self,
        subreddit: &str,
        listing: Listing,
        limit: u32,
    ) -> Result<Vec<RedditPost>, CoreError> {
        let token = self.auth.access_token().await?;
        let result = self
            .api
            .get_subreddit_posts(&token, subreddit, listing, limit)
            .await;
        let page = self.forget_token_on_401(result).await?;

        Ok(page
            .children
            .into_iter()
            .map(|child| child.data)
            .filter(|post| !post.stickied)
            .map(RedditPost::from)
            .collect())
    }
}
