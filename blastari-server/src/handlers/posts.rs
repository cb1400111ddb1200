use crate::error::{ApiJson, ApiResult};
use crate::payloads::{DraftPostsPayload, PostIdeasPayload};
use crate::prompts;
use crate::state::AppState;
use crate::website::canonical_url;
use axum::{extract::State, Json};
use blastari_core::{
    normalize_subreddit_name, AnalyzedPost, CoreError, ErrorExt, GeneratedPost, Listing,
    PostRecommendation, RedditPost, WebsiteAnalysis,
};
use futures::future::join_all;
use llm_interface::parse_or_fallback;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Posts commented on per subreddit.
const POSTS_PER_SUBREDDIT: usize = 5;
/// Hot posts requested per subreddit; removed posts are skipped.
const HOT_FETCH_LIMIT: u32 = 15;
/// Subreddits a generation prompt may target.
const TARGET_SUBREDDITS: usize = 5;
const DEFAULT_POST_COUNT: u32 = 3;
const MAX_POST_COUNT: u32 = 10;
const FALLBACK_SUBREDDIT: &str = "startups";

const FALLBACK_COMMENT: &str = "Great question. We ran into the same thing and found that writing down \
the exact workflow first made the options much easier to compare.";

fn website_url(raw: &str) -> Result<String, CoreError> {
    canonical_url(raw).map_err(|_| CoreError::invalid_input("websiteUrl is required"))
}

async fn require_analysis(state: &AppState, url: &str) -> Result<WebsiteAnalysis, CoreError> {
    state
        .db
        .find_website_analysis(url)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("website analysis for {url}")))
}

async fn target_subreddits(state: &AppState, url: &str) -> Result<Vec<String>, CoreError> {
    Ok(state
        .db
        .subreddit_recommendations(url)
        .await?
        .into_iter()
        .take(TARGET_SUBREDDITS)
        .map(|r| r.name)
        .collect())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FetchPostsRequest {
    pub subreddits: Vec<String>,
    pub website_url: String,
}

#[derive(Debug, Serialize)]
pub struct FetchPostsResponse {
    pub posts: Vec<AnalyzedPost>,
}

async fn hot_posts(state: &AppState, subreddit: &str) -> Vec<RedditPost> {
    match state.reddit.posts(subreddit, Listing::Hot, HOT_FETCH_LIMIT).await {
        Ok(posts) => posts
            .into_iter()
            .filter(|p| !p.is_removed())
            .take(POSTS_PER_SUBREDDIT)
            .collect(),
        Err(e) => {
            warn!("Skipping r/{}: {}", subreddit, e);
            Vec::new()
        }
    }
}

async fn comment_on(state: &AppState, context: &str, post: RedditPost) -> AnalyzedPost {
    let ai_comment = match state.llm.complete(&prompts::post_comment(context, &post)).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => FALLBACK_COMMENT.to_string(),
        Err(e) => {
            e.log_warn();
            FALLBACK_COMMENT.to_string()
        }
    };
    AnalyzedPost { post, ai_comment }
}

/// `POST /fetch-reddit-posts`: hot posts from each subreddit, each with a
/// drafted comment. A subreddit that cannot be read contributes nothing.
pub async fn fetch_reddit_posts(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<FetchPostsRequest>,
) -> ApiResult<Json<FetchPostsResponse>> {
    let url = website_url(&request.website_url)?;
    let names: Vec<String> = request
        .subreddits
        .iter()
        .map(|n| normalize_subreddit_name(n))
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return Err(CoreError::invalid_input("subreddits is required").into());
    }

    let context = match state.db.find_website_analysis(&url).await? {
        Some(analysis) => prompts::describe_analysis(&analysis),
        None => format!("Website: {url}"),
    };

    let fetched = join_all(names.iter().map(|name| hot_posts(&state, name))).await;
    let posts: Vec<RedditPost> = fetched.into_iter().flatten().collect();
    debug!("Drafting comments for {} posts", posts.len());

    let analyzed = join_all(
        posts
            .into_iter()
            .map(|post| comment_on(&state, &context, post)),
    )
    .await;

    state.db.save_analyzed_posts(&url, &analyzed).await?;
    info!(
        "Fetched {} posts from {} subreddits for {}",
        analyzed.len(),
        names.len(),
        url
    );
    Ok(Json(FetchPostsResponse { posts: analyzed }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratePostsRequest {
    pub website_url: String,
    pub prompt: Option<String>,
    pub num_posts: Option<u32>,
    pub custom_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GeneratePostsResponse {
    pub posts: Vec<GeneratedPost>,
}

/// `POST /generate-reddit-posts`. All drafts share one image: the caller's
/// `customImage` if given, otherwise a generated one. An image failure
/// leaves the drafts without an image.
pub async fn generate_reddit_posts(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GeneratePostsRequest>,
) -> ApiResult<Json<GeneratePostsResponse>> {
    let url = website_url(&request.website_url)?;
    let analysis = require_analysis(&state, &url).await?;
    let count = request
        .num_posts
        .unwrap_or(DEFAULT_POST_COUNT)
        .clamp(1, MAX_POST_COUNT) as usize;

    let mut subreddits = target_subreddits(&state, &url).await?;
    if subreddits.is_empty() {
        subreddits.push(FALLBACK_SUBREDDIT.to_string());
    }

    let context = prompts::describe_analysis(&analysis);
    let instructions = request
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    let raw = state
        .llm
        .complete(&prompts::draft_posts(&context, &subreddits, instructions, count))
        .await?;
    let fallback = || DraftPostsPayload::fallback(&subreddits[0], &analysis.product_overview);
    let mut drafts = parse_or_fallback(&raw, fallback).into_inner();
    if drafts.posts.is_empty() {
        drafts = fallback();
    }

    let image_url = match request.custom_image.filter(|u| !u.trim().is_empty()) {
        Some(custom) => Some(custom),
        None => match state.llm.generate_image(&prompts::post_image(&context)).await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Image generation failed for {}: {}", url, e);
                None
            }
        },
    };

    let posts: Vec<GeneratedPost> = drafts
        .posts
        .into_iter()
        .take(count)
        .map(|draft| {
            let subreddit = normalize_subreddit_name(&draft.subreddit);
            GeneratedPost {
                id: None,
                website_url: url.clone(),
                title: draft.title,
                content: draft.content,
                subreddit: if subreddit.is_empty() {
                    subreddits[0].clone()
                } else {
                    subreddit
                },
                image_url: image_url.clone(),
            }
        })
        .collect();

    let posts = state.db.insert_generated_posts(&posts).await?;
    info!("Generated {} posts for {}", posts.len(), url);
    Ok(Json(GeneratePostsResponse { posts }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostRecommendationsRequest {
    pub website_url: String,
    pub force_regenerate: bool,
}

#[derive(Debug, Serialize)]
pub struct PostRecommendationsResponse {
    pub recommendations: Vec<PostRecommendation>,
    pub cached: bool,
}

/// `POST /generate-reddit-post-recommendations`. Stored ideas are reused
/// unless a regeneration is forced, which replaces them.
pub async fn generate_post_recommendations(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PostRecommendationsRequest>,
) -> ApiResult<Json<PostRecommendationsResponse>> {
    let url = website_url(&request.website_url)?;
    let analysis = require_analysis(&state, &url).await?;

    if !request.force_regenerate {
        let existing = state.db.post_recommendations(&url).await?;
        if !existing.is_empty() {
            return Ok(Json(PostRecommendationsResponse {
                recommendations: existing,
                cached: true,
            }));
        }
    }

    let subreddits = target_subreddits(&state, &url).await?;
    let default_subreddit = subreddits
        .first()
        .cloned()
        .unwrap_or_else(|| FALLBACK_SUBREDDIT.to_string());

    let raw = state
        .llm
        .complete(&prompts::post_ideas(&analysis, &subreddits))
        .await?;
    let mut ideas =
        parse_or_fallback(&raw, || PostIdeasPayload::fallback(&default_subreddit)).into_inner();
    if ideas.recommendations.is_empty() {
        ideas = PostIdeasPayload::fallback(&default_subreddit);
    }

    let recommendations: Vec<PostRecommendation> = ideas
        .recommendations
        .into_iter()
        .filter(|idea| !idea.title.trim().is_empty())
        .map(|idea| {
            let subreddit = normalize_subreddit_name(&idea.subreddit);
            PostRecommendation {
                id: None,
                website_url: url.clone(),
                title: idea.title,
                subreddit: if subreddit.is_empty() {
                    default_subreddit.clone()
                } else {
                    subreddit
                },
                outline: idea.outline,
                rationale: idea.rationale,
            }
        })
        .collect();

    if request.force_regenerate {
        let removed = state.db.delete_post_recommendations(&url).await?;
        debug!("Replaced {} post recommendations for {}", removed, url);
    }
    let recommendations = state.db.insert_post_recommendations(&recommendations).await?;

    Ok(Json(PostRecommendationsResponse {
        recommendations,
        cached: false,
    }))
}
