pub mod analytics;
pub mod chat;
pub mod content;
pub mod health;
pub mod posts;
pub mod submissions;
pub mod subreddits;
pub mod website;

use crate::state::AppState;
use analytics_engine::{score_subreddits, DEFAULT_SAMPLE_SIZE};
use blastari_core::{normalize_subreddit_name, ErrorExt, SubredditAnalytics};
use chrono::Duration;
use tracing::debug;

/// Stored analytics younger than this are served without calling Reddit.
pub fn analytics_max_age() -> Duration {
    Duration::hours(24)
}

/// Analytics for each name in input order, from storage where fresh and
/// from Reddit otherwise. Newly computed records are stored unless zeroed.
pub(crate) async fn score_with_cache(
    state: &AppState,
    names: &[String],
) -> Vec<SubredditAnalytics> {
    let mut slots: Vec<Option<SubredditAnalytics>> = Vec::with_capacity(names.len());
    let mut missing: Vec<String> = Vec::new();

    for name in names {
        let name = normalize_subreddit_name(name);
        let cached = state
            .db
            .find_fresh_analytics(&name, analytics_max_age())
            .await
            .unwrap_or_else(|e| {
                e.log_warn();
                None
            })
            // Answer with the caller's spelling, as a fresh computation would.
            .map(|mut analytics| {
                analytics.subreddit = name.clone();
                analytics
            });
        if cached.is_none() {
            missing.push(name);
        }
        slots.push(cached);
    }
    debug!(
        "{} of {} subreddit analytics served from storage",
        names.len() - missing.len(),
        names.len()
    );

    let fresh = score_subreddits(state.reddit.as_ref(), &missing, DEFAULT_SAMPLE_SIZE).await;
    for analytics in fresh.iter().filter(|a| !a.is_zeroed()) {
        if let Err(e) = state.db.upsert_subreddit_analytics(analytics).await {
            e.log_warn();
        }
    }

    // `fresh` holds one record per `None` slot, in the same order.
    let mut fresh = fresh.into_iter();
    slots
        .into_iter()
        .zip(names)
        .map(|(slot, name)| {
            slot.or_else(|| fresh.next())
                .unwrap_or_else(|| SubredditAnalytics::zeroed(&normalize_subreddit_name(name)))
        })
        .collect()
}
