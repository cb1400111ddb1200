use blastari_core::{normalize_subreddit_name, SubredditAnalytics};
use std::collections::HashSet;
use tracing::debug;

pub const MIN_SUBSCRIBERS: u64 = 1_000;
pub const MIN_ENGAGEMENT_RATE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankLimit {
    /// Analytics panel.
    Display,
    /// "Generate more" subreddit recommendations.
    Regenerate,
}

impl RankLimit {
    pub fn count(self) -> usize {
        match self {
            RankLimit::Display => 3,
            RankLimit::Regenerate => 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    pub entries: Vec<SubredditAnalytics>,
    /// Set when no candidate met the thresholds and the list is ordered by
    /// subscribers instead.
    pub fallback: bool,
}

#[derive(Debug, Clone)]
pub struct RankingPolicy {
    pub min_subscribers: u64,
    pub min_engagement_rate: f64,
    pub limit: RankLimit,
}

impl RankingPolicy {
    pub fn new(limit: RankLimit) -> Self {
        Self {
            min_subscribers: MIN_SUBSCRIBERS,
            min_engagement_rate: MIN_ENGAGEMENT_RATE,
            limit,
        }
    }

    fn qualifies(&self, analytics: &SubredditAnalytics) -> bool {
        analytics.subscribers >= self.min_subscribers
            && analytics.engagement_rate >= self.min_engagement_rate
    }

    /// Drops excluded names (compared normalized and case-insensitively),
    /// filters on the thresholds and sorts by engagement. When the filter
    /// leaves nothing, every non-excluded candidate is ranked by subscribers.
    /// Sorting is stable, so equal keys keep input order.
    pub fn rank(&self, candidates: Vec<SubredditAnalytics>, excluded: &[String]) -> Ranked {
        let excluded: HashSet<String> = excluded
            .iter()
            .map(|name| normalize_subreddit_name(name).to_lowercase())
            .collect();

        let allowed: Vec<SubredditAnalytics> = candidates
            .into_iter()
            .filter(|a| !excluded.contains(&normalize_subreddit_name(&a.subreddit).to_lowercase()))
            .collect();

        let (mut entries, fallback) = if allowed.iter().any(|a| self.qualifies(a)) {
            let mut kept: Vec<SubredditAnalytics> =
                allowed.into_iter().filter(|a| self.qualifies(a)).collect();
            kept.sort_by(|a, b| b.engagement_rate.total_cmp(&a.engagement_rate));
            (kept, false)
        } else {
            debug!(
                "No subreddit met the thresholds, ranking {} candidates by subscribers",
                allowed.len()
            );
            let mut all = allowed;
            all.sort_by(|a, b| b.subscribers.cmp(&a.subscribers));
            (all, true)
        };

        entries.truncate(self.limit.count());
        Ranked { entries, fallback }
    }
}
