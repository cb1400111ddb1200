use crate::metrics::{ApiMetrics, MetricsCollector, RequestOutcome};
use blastari_core::{CoreError, Listing, RedditApiError, RedditPost, SubredditAbout};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

/// Reddit wraps every object as `{ kind, data }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thing<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPage<T> {
    pub children: Vec<Thing<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub author: String,
    pub subreddit: String,
    pub url: String,
    pub permalink: String,
    pub created_utc: f64,
    pub score: i64,
    pub num_comments: u64,
    pub upvote_ratio: Option<f64>,
    pub link_flair_text: Option<String>,
    pub stickied: bool,
    pub is_self: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditSubredditData {
    pub display_name: String,
    pub title: String,
    pub public_description: String,
    pub subscribers: Option<u64>,
    pub active_user_count: Option<u64>,
    pub accounts_active: Option<u64>,
    pub over18: bool,
}

/// Read-only calls against the OAuth API host. Tokens are supplied per call;
/// see `ClientCredentialsAuth` for where they come from.
#[derive(Debug)]
pub struct RedditApiClient {
    http: Client,
    metrics: Arc<MetricsCollector>,
    base_url: String,
}

impl RedditApiClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, CoreError> {
        Self::with_base_url(user_agent, REDDIT_API_BASE, timeout)
    }

    pub fn with_base_url(
        user_agent: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            metrics: Arc::new(MetricsCollector::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GETs `/r/{subreddit}/{tail}` and decodes the body. Every attempt is
    /// recorded under the route template, whatever the outcome.
    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        subreddit: &str,
        tail: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CoreError> {
        let url = format!("{}/r/{}/{}", self.base_url, subreddit, tail);
        let started = Instant::now();

        debug!("GET {}", url);
        let sent = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await;

        self.metrics
            .record(RequestOutcome {
                route: format!("/r/{{subreddit}}/{tail}"),
                status: sent.as_ref().ok().map(|r| r.status().as_u16()),
                elapsed: started.elapsed(),
            })
            .await;

        let response = sent.map_err(|e| {
            error!("Reddit unreachable for r/{}/{}: {}", subreddit, tail, e);
            if e.is_timeout() {
                CoreError::RedditApi(RedditApiError::RequestTimeout)
            } else {
                CoreError::Network(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("Reddit answered {} for r/{}/{}", status, subreddit, tail);
            return Err(CoreError::RedditApi(rejection(status, &response, subreddit)));
        }

        response.json::<T>().await.map_err(|e| {
            error!("Undecodable Reddit payload for r/{}/{}: {}", subreddit, tail, e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("r/{subreddit}/{tail}: {e}"),
            })
        })
    }

    pub async fn get_subreddit_posts(
        &self,
        token: &str,
        subreddit: &str,
        listing: Listing,
        limit: u32,
    ) -> Result<ListingPage<RedditPostData>, CoreError> {
        let limit = limit.min(100).to_string();
        let query = [("limit", limit.as_str()), ("raw_json", "1")];
        let page: Thing<ListingPage<RedditPostData>> = self
            .get_json(token, subreddit, listing.as_path(), &query)
            .await?;

        info!("r/{}: {} {} posts", subreddit, page.data.children.len(), listing.as_path());
        Ok(page.data)
    }

    pub async fn get_subreddit_info(
        &self,
        token: &str,
        subreddit: &str,
    ) -> Result<RedditSubredditData, CoreError> {
        let about: Thing<RedditSubredditData> =
            self.get_json(token, subreddit, "about", &[]).await?;

        // Unknown names can come back as an empty listing instead of a 404.
        if about.kind != "t5" {
            return Err(CoreError::RedditApi(RedditApiError::SubredditNotFound {
                subreddit: subreddit.to_string(),
            }));
        }
        Ok(about.data)
    }

    pub fn metrics_collector(&self) -> Arc<MetricsCollector> {
        Arc::clone(&self.metrics)
    }

    pub async fn metrics(&self) -> ApiMetrics {
        self.metrics.snapshot().await
    }
}

fn rejection(status: StatusCode, response: &Response, subreddit: &str) -> RedditApiError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(60);
            warn!("Reddit rate limit hit, retry-after {}s", retry_after);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        StatusCode::UNAUTHORIZED => RedditApiError::InvalidToken,
        StatusCode::FORBIDDEN => RedditApiError::Forbidden {
            resource: format!("r/{subreddit}"),
        },
        StatusCode::NOT_FOUND => RedditApiError::SubredditNotFound {
            subreddit: subreddit.to_string(),
        },
        s if s.is_server_error() => RedditApiError::ServerError {
            status_code: s.as_u16(),
        },
        s => RedditApiError::InvalidResponse {
            details: format!("unexpected status {}", s.as_u16()),
        },
    }
}

impl From<RedditPostData> for RedditPost {
    fn from(raw: RedditPostData) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            content: Some(raw.selftext).filter(|body| !body.is_empty()),
            subreddit: raw.subreddit,
            author: raw.author,
            score: raw.score,
            num_comments: raw.num_comments,
            upvote_ratio: raw.upvote_ratio.unwrap_or(0.0),
            url: raw.url,
            permalink: raw.permalink,
            flair: raw.link_flair_text.filter(|f| !f.trim().is_empty()),
            created_utc: raw.created_utc as i64,
        }
    }
}

impl From<RedditSubredditData> for SubredditAbout {
    fn from(raw: RedditSubredditData) -> Self {
        Self {
            name: raw.display_name,
            title: raw.title,
            public_description: raw.public_description,
            subscribers: raw.subscribers.unwrap_or(0),
            active_user_count: raw.active_user_count.or(raw.accounts_active),
            over18: raw.over18,
        }
    }
}
