use crate::error::{required, ApiJson, ApiResult};
use crate::handlers::score_with_cache;
use crate::payloads::InsightsPayload;
use crate::prompts;
use crate::state::AppState;
use analytics_engine::{deep_analytics, DeepAnalytics, RankLimit, RankingPolicy, DEFAULT_SAMPLE_SIZE};
use axum::{extract::State, Json};
use blastari_core::{normalize_subreddit_name, CoreError, Listing, SubredditAnalytics};
use chrono::Utc;
use llm_interface::parse_or_fallback;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedditAnalyticsRequest {
    pub subreddits: Vec<String>,
    pub website_url: String,
}

#[derive(Debug, Serialize)]
pub struct RedditAnalyticsResponse {
    pub analytics: Vec<SubredditAnalytics>,
}

/// `POST /reddit-analytics`: the top three of the given subreddits.
pub async fn reddit_analytics(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RedditAnalyticsRequest>,
) -> ApiResult<Json<RedditAnalyticsResponse>> {
    let names: Vec<String> = request
        .subreddits
        .iter()
        .map(|n| normalize_subreddit_name(n))
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return Err(CoreError::invalid_input("subreddits is required").into());
    }

    let scored = score_with_cache(&state, &names).await;
    let ranked = RankingPolicy::new(RankLimit::Display).rank(scored, &[]);
    info!(
        "Ranked {} subreddits for {} (fallback: {})",
        names.len(),
        request.website_url,
        ranked.fallback
    );
    Ok(Json(RedditAnalyticsResponse {
        analytics: ranked.entries,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeepAnalyticsRequest {
    pub subreddit: String,
}

#[derive(Debug, Serialize)]
pub struct DeepAnalyticsResponse {
    pub analytics: DeepAnalytics,
    pub insights: Vec<String>,
}

/// Insights that follow from the numbers alone.
fn computed_insights(analytics: &DeepAnalytics) -> Vec<String> {
    let mut insights = Vec::new();
    if let Some(hour) = analytics.peak_hour {
        insights.push(format!("Most posts go up around {hour:02}:00 UTC."));
    }
    if !analytics.keywords.is_empty() {
        let top: Vec<&str> = analytics
            .keywords
            .iter()
            .take(5)
            .map(|k| k.keyword.as_str())
            .collect();
        insights.push(format!("Frequent topics: {}.", top.join(", ")));
    }
    insights.push(format!(
        "Posts average {:.0} upvotes and {:.0} comments.",
        analytics.average_upvotes, analytics.average_comments
    ));
    insights
}

/// `POST /subreddit-deep-analytics`.
pub async fn subreddit_deep_analytics(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DeepAnalyticsRequest>,
) -> ApiResult<Json<DeepAnalyticsResponse>> {
    let name = normalize_subreddit_name(required("subreddit", &request.subreddit)?);
    if name.is_empty() {
        return Err(CoreError::invalid_input("subreddit is required").into());
    }

    let posts = state
        .reddit
        .posts(&name, Listing::New, DEFAULT_SAMPLE_SIZE)
        .await?;
    let analytics = deep_analytics(&name, &posts, Utc::now());

    let raw = state.llm.complete(&prompts::deep_insights(&analytics)).await?;
    let mut insights = parse_or_fallback(&raw, || InsightsPayload {
        insights: computed_insights(&analytics),
    })
    .into_inner()
    .insights;
    if insights.is_empty() {
        insights = computed_insights(&analytics);
    }

    Ok(Json(DeepAnalyticsResponse {
        analytics,
        insights,
    }))
}
