use crate::error::{ApiJson, ApiResult};
use crate::handlers::{analytics_max_age, score_with_cache};
use crate::payloads::SubredditCandidatesPayload;
use crate::prompts;
use crate::state::AppState;
use crate::website::canonical_url;
use analytics_engine::{RankLimit, RankingPolicy};
use axum::{extract::State, Json};
use blastari_core::{normalize_subreddit_name, CoreError, ErrorExt, SubredditAnalytics};
use llm_interface::parse_or_fallback;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Upper bound on candidates scored per request.
const MAX_CANDIDATES: usize = 30;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzeSubredditsRequest {
    pub website_url: String,
    pub campaign_type: Option<String>,
    pub force_regenerate: bool,
    pub exclude_subreddits: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubredditEntry {
    pub name: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics: Option<SubredditAnalytics>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeSubredditsResponse {
    pub subreddits: Vec<SubredditEntry>,
    pub cached: bool,
}

fn key(name: &str) -> String {
    normalize_subreddit_name(name).to_lowercase()
}

/// `POST /analyze-subreddits`. Returns stored recommendations unless a
/// regeneration is forced; a regeneration never repeats a subreddit already
/// recommended for the site or listed in `excludeSubreddits`.
pub async fn analyze_subreddits(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AnalyzeSubredditsRequest>,
) -> ApiResult<Json<AnalyzeSubredditsResponse>> {
    let url = canonical_url(&request.website_url)
        .map_err(|_| CoreError::invalid_input("websiteUrl is required"))?;
    let analysis = state
        .db
        .find_website_analysis(&url)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("website analysis for {url}")))?;

    let existing = state.db.subreddit_recommendations(&url).await?;
    if !request.force_regenerate && !existing.is_empty() {
        let mut subreddits = Vec::new();
        for rec in existing.into_iter().take(RankLimit::Regenerate.count()) {
            let analytics = state
                .db
                .find_fresh_analytics(&rec.name, analytics_max_age())
                .await
                .unwrap_or_else(|e| {
                    e.log_warn();
                    None
                });
            subreddits.push(SubredditEntry {
                name: rec.name,
                reason: rec.reason,
                analytics,
            });
        }
        return Ok(Json(AnalyzeSubredditsResponse {
            subreddits,
            cached: true,
        }));
    }

    let excluded: Vec<String> = existing
        .iter()
        .map(|r| r.name.clone())
        .chain(request.exclude_subreddits.iter().map(|n| normalize_subreddit_name(n)))
        .filter(|n| !n.is_empty())
        .collect();
    let excluded_keys: HashSet<String> = excluded.iter().map(|n| key(n)).collect();

    let raw = state
        .llm
        .complete(&prompts::subreddit_candidates(
            &analysis,
            request.campaign_type.as_deref(),
            &excluded,
        ))
        .await?;
    let mut payload = parse_or_fallback(&raw, SubredditCandidatesPayload::fallback).into_inner();
    if payload.subreddits.is_empty() {
        payload = SubredditCandidatesPayload::fallback();
    }

    // Deduplicate and drop excluded names before spending Reddit calls on them.
    let mut reasons: HashMap<String, (String, String)> = HashMap::new();
    let mut candidates: Vec<String> = Vec::new();
    for candidate in payload.subreddits {
        let name = normalize_subreddit_name(&candidate.name);
        let k = key(&name);
        if name.is_empty() || excluded_keys.contains(&k) || reasons.contains_key(&k) {
            continue;
        }
        reasons.insert(k, (name.clone(), candidate.reason));
        candidates.push(name);
        if candidates.len() == MAX_CANDIDATES {
            break;
        }
    }

    let scored = score_with_cache(&state, &candidates).await;
    let ranked = RankingPolicy::new(RankLimit::Regenerate).rank(scored, &excluded);

    let mut to_store = Vec::with_capacity(ranked.entries.len());
    let mut subreddits = Vec::with_capacity(ranked.entries.len());
    for analytics in ranked.entries {
        let (name, reason) = reasons
            .get(&key(&analytics.subreddit))
            .cloned()
            .unwrap_or_else(|| (analytics.subreddit.clone(), String::new()));
        to_store.push((name.clone(), reason.clone()));
        subreddits.push(SubredditEntry {
            name,
            reason,
            analytics: (!analytics.is_zeroed()).then_some(analytics),
        });
    }
    state
        .db
        .append_subreddit_recommendations(&url, &to_store)
        .await?;

    info!(
        "Recommended {} new subreddits for {} (fallback ranking: {})",
        subreddits.len(),
        url,
        ranked.fallback
    );
    Ok(Json(AnalyzeSubredditsResponse {
        subreddits,
        cached: false,
    }))
}
