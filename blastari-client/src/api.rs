use crate::session_cache::{SessionCache, SessionStorage};
use analytics_engine::DeepAnalytics;
use blastari_core::{
    AnalyzedPost, CampaignRecommendation, ChatChannel, ChatMessage, ChatRole, CoreError,
    GeneratedPost, PostRecommendation, SubredditAnalytics, UserAction, UserFeedback,
    WebsiteAnalysis,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Message prefix of failures that should send the user to the analysis
/// error page rather than a toast.
pub const ANALYSIS_ERROR_PREFIX: &str = "Unable to analyze website";

pub fn requires_error_page(error: &CoreError) -> bool {
    match error {
        CoreError::RequestFailed { message, .. } => message.starts_with(ANALYSIS_ERROR_PREFIX),
        CoreError::Unprocessable { .. } => true,
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteAnalysisResult {
    pub analysis: WebsiteAnalysis,
    pub campaigns: Vec<CampaignRecommendation>,
    pub cached: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedSubreddit {
    pub name: String,
    pub reason: String,
    #[serde(default)]
    pub analytics: Option<SubredditAnalytics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubredditsResult {
    pub subreddits: Vec<RecommendedSubreddit>,
    pub cached: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubredditRequest {
    pub website_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_type: Option<String>,
    pub force_regenerate: bool,
    pub exclude_subreddits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeepAnalyticsResult {
    pub analytics: DeepAnalytics,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostGenerationRequest {
    pub website_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_posts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostRecommendationsResult {
    pub recommendations: Vec<PostRecommendation>,
    pub cached: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratedContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

fn analysis_key(url: &str) -> String {
    format!("analysis_{}", url.trim().trim_end_matches('/'))
}

fn subreddits_key(url: &str) -> String {
    format!("subreddits_{}", url.trim().trim_end_matches('/'))
}

/// Typed client for the BLASTari HTTP service. Website analyses and
/// subreddit lists are kept in the session cache between calls.
pub struct BlastariClient<S: SessionStorage> {
    http: Client,
    base_url: String,
    cache: SessionCache<S>,
}

impl<S: SessionStorage> BlastariClient<S> {
    pub fn new(base_url: &str, storage: S, timeout: Duration) -> Result<Self, CoreError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: SessionCache::new(storage),
        })
    }

    pub fn cache(&mut self) -> &mut SessionCache<S> {
        &mut self.cache
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CoreError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&raw)
                .map(|body| body.error)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            debug!("Service returned {}: {}", status, message);
            return Err(CoreError::RequestFailed {
                message,
                status_code: Some(status.as_u16()),
            });
        }
        Ok(response.json::<T>().await?)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, CoreError> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn analyze_website(&mut self, url: &str) -> Result<WebsiteAnalysisResult, CoreError> {
        let key = analysis_key(url);
        if let Some(cached) = self.cache.get::<WebsiteAnalysisResult>(&key) {
            return Ok(cached);
        }
        let result: WebsiteAnalysisResult =
            self.post("/analyze-website", &json!({ "url": url })).await?;
        self.cache.set(&key, &result)?;
        Ok(result)
    }

    /// Stored or freshly generated recommendations. A forced regeneration
    /// replaces the cached list.
    pub async fn analyze_subreddits(
        &mut self,
        request: &SubredditRequest,
    ) -> Result<SubredditsResult, CoreError> {
        let key = subreddits_key(&request.website_url);
        if !request.force_regenerate {
            if let Some(cached) = self.cache.get::<SubredditsResult>(&key) {
                return Ok(cached);
            }
        }
        let body = serde_json::to_value(request)?;
        let result: SubredditsResult = self.post("/analyze-subreddits", &body).await?;
        self.cache.set(&key, &result)?;
        Ok(result)
    }

    pub async fn reddit_analytics(
        &mut self,
        subreddits: &[String],
        website_url: &str,
    ) -> Result<Vec<SubredditAnalytics>, CoreError> {
        #[derive(Deserialize)]
        struct Body {
            analytics: Vec<SubredditAnalytics>,
        }
        let body: Body = self
            .post(
                "/reddit-analytics",
                &json!({ "subreddits": subreddits, "websiteUrl": website_url }),
            )
            .await?;
        Ok(body.analytics)
    }

    pub async fn subreddit_deep_analytics(
        &mut self,
        subreddit: &str,
    ) -> Result<DeepAnalyticsResult, CoreError> {
        self.post("/subreddit-deep-analytics", &json!({ "subreddit": subreddit }))
            .await
    }

    pub async fn fetch_reddit_posts(
        &mut self,
        subreddits: &[String],
        website_url: &str,
    ) -> Result<Vec<AnalyzedPost>, CoreError> {
        #[derive(Deserialize)]
        struct Body {
            posts: Vec<AnalyzedPost>,
        }
        let body: Body = self
            .post(
                "/fetch-reddit-posts",
                &json!({ "subreddits": subreddits, "websiteUrl": website_url }),
            )
            .await?;
        Ok(body.posts)
    }

    pub async fn generate_reddit_posts(
        &mut self,
        request: &PostGenerationRequest,
    ) -> Result<Vec<GeneratedPost>, CoreError> {
        #[derive(Deserialize)]
        struct Body {
            posts: Vec<GeneratedPost>,
        }
        let body: Body = self
            .post("/generate-reddit-posts", &serde_json::to_value(request)?)
            .await?;
        Ok(body.posts)
    }

    pub async fn post_recommendations(
        &mut self,
        website_url: &str,
        force_regenerate: bool,
    ) -> Result<PostRecommendationsResult, CoreError> {
        self.post(
            "/generate-reddit-post-recommendations",
            &json!({ "websiteUrl": website_url, "forceRegenerate": force_regenerate }),
        )
        .await
    }

    pub async fn generate_content(
        &mut self,
        content_type: &str,
        prompt: &str,
    ) -> Result<GeneratedContent, CoreError> {
        self.post(
            "/generate-content",
            &json!({ "type": content_type, "prompt": prompt }),
        )
        .await
    }

    pub async fn chat(
        &mut self,
        website_url: &str,
        user_message: &str,
        campaign_type: Option<&str>,
    ) -> Result<String, CoreError> {
        #[derive(Deserialize)]
        struct Body {
            reply: String,
        }
        let body: Body = self
            .post(
                "/chat-with-recommendations",
                &json!({
                    "websiteUrl": website_url,
                    "userMessage": user_message,
                    "campaignType": campaign_type,
                }),
            )
            .await?;
        Ok(body.reply)
    }

    pub async fn create_channel(
        &mut self,
        name: &str,
        user_id: Option<&str>,
        description: Option<&str>,
    ) -> Result<ChatChannel, CoreError> {
        #[derive(Deserialize)]
        struct Body {
            channel: ChatChannel,
        }
        let body: Body = self
            .post(
                "/chat-channels",
                &json!({ "name": name, "userId": user_id, "description": description }),
            )
            .await?;
        Ok(body.channel)
    }

    pub async fn list_channels(&mut self, user_id: Option<&str>) -> Result<Vec<ChatChannel>, CoreError> {
        #[derive(Deserialize)]
        struct Body {
            channels: Vec<ChatChannel>,
        }
        let mut request = self.request(Method::GET, "/chat-channels");
        if let Some(user_id) = user_id {
            request = request.query(&[("userId", user_id)]);
        }
        let body: Body = self.send(request).await?;
        Ok(body.channels)
    }

    pub async fn delete_channel(&mut self, id: &str) -> Result<(), CoreError> {
        let _: Value = self
            .send(self.request(Method::DELETE, &format!("/chat-channels/{id}")))
            .await?;
        Ok(())
    }

    pub async fn channel_messages(&mut self, id: &str) -> Result<Vec<ChatMessage>, CoreError> {
        #[derive(Deserialize)]
        struct Body {
            messages: Vec<ChatMessage>,
        }
        let body: Body = self
            .send(self.request(Method::GET, &format!("/chat-channels/{id}/messages")))
            .await?;
        Ok(body.messages)
    }

    pub async fn post_message(
        &mut self,
        id: &str,
        role: ChatRole,
        content: &str,
    ) -> Result<ChatMessage, CoreError> {
        #[derive(Deserialize)]
        struct Body {
            message: ChatMessage,
        }
        let body: Body = self
            .post(
                &format!("/chat-channels/{id}/messages"),
                &json!({ "role": role, "content": content }),
            )
            .await?;
        Ok(body.message)
    }

    pub async fn shared_chat(
        &mut self,
        id: &str,
    ) -> Result<(ChatChannel, Vec<ChatMessage>), CoreError> {
        #[derive(Deserialize)]
        struct Body {
            channel: ChatChannel,
            messages: Vec<ChatMessage>,
        }
        let body: Body = self
            .send(self.request(Method::GET, &format!("/shared-chat/{id}")))
            .await?;
        Ok((body.channel, body.messages))
    }

    /// Returns the stored feedback id.
    pub async fn submit_feedback(&mut self, feedback: &UserFeedback) -> Result<i64, CoreError> {
        #[derive(Deserialize)]
        struct Body {
            id: i64,
        }
        let body: Body = self
            .post("/feedback", &serde_json::to_value(feedback)?)
            .await?;
        Ok(body.id)
    }

    pub async fn record_action(&mut self, action: &UserAction) -> Result<i64, CoreError> {
        #[derive(Deserialize)]
        struct Body {
            id: i64,
        }
        let body: Body = self
            .post("/user-actions", &serde_json::to_value(action)?)
            .await?;
        Ok(body.id)
    }

    pub async fn health(&mut self) -> Result<Value, CoreError> {
        self.send(self.request(Method::GET, "/health")).await
    }
}
