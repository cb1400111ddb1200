use crate::scoring::score_subreddit;
use blastari_core::{
    normalize_subreddit_name, CoreError, ErrorExt, Listing, SubredditAnalytics, SubredditSource,
};
use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};

pub const DEFAULT_SAMPLE_SIZE: u32 = 100;

async fn fetch_and_score(
    source: &dyn SubredditSource,
    name: &str,
    sample_size: u32,
) -> Result<SubredditAnalytics, CoreError> {
    let about = source.about(name).await?;
    let posts = source.posts(name, Listing::New, sample_size).await?;
    Ok(score_subreddit(name, &about, &posts, Utc::now()))
}

/// Scores every name concurrently. Output order matches input order and a
/// subreddit that fails to load gets a zeroed record; the batch itself
/// never fails.
pub async fn score_subreddits(
    source: &dyn SubredditSource,
    names: &[String],
    sample_size: u32,
) -> Vec<SubredditAnalytics> {
    let normalized: Vec<String> = names.iter().map(|n| normalize_subreddit_name(n)).collect();
    info!("Scoring {} subreddits", normalized.len());

    let results = join_all(
        normalized
            .iter()
            .map(|name| fetch_and_score(source, name, sample_size)),
    )
    .await;

    results
        .into_iter()
        .zip(normalized.iter())
        .map(|(result, name)| match result {
            Ok(analytics) => analytics,
            Err(e) => {
                warn!("Analytics for r/{} unavailable: {}", name, e.user_friendly_message());
                SubredditAnalytics::zeroed(name)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::fixtures::{about, post};
    use async_trait::async_trait;
    use blastari_core::{RedditApiError, RedditPost, SubredditAbout};

    struct FakeSource;

    #[async_trait]
    impl SubredditSource for FakeSource {
        async fn about(&self, subreddit: &str) -> Result<SubredditAbout, CoreError> {
            match subreddit {
                "broken" => Err(CoreError::RedditApi(RedditApiError::SubredditNotFound {
                    subreddit: subreddit.to_string(),
                })),
                "rust" => Ok(about("rust", 300_000, Some(1_000))),
                _ => Ok(about(subreddit, 2_000, None)),
            }
        }

        async fn posts(
            &self,
            subreddit: &str,
            _listing: Listing,
            limit: u32,
        ) -> Result<Vec<RedditPost>, CoreError> {
            let count = limit.min(3) as usize;
            Ok((0..count)
                .map(|i| post(&format!("{subreddit}-user{i}"), "Rust release notes", 10, 5))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_one_failure_yields_zeroed_record_in_place() {
        let names = vec![
            "r/rust".to_string(),
            "broken".to_string(),
            "startups".to_string(),
        ];
        let results = score_subreddits(&FakeSource, &names, DEFAULT_SAMPLE_SIZE).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].subreddit, "rust");
        assert_eq!(results[0].subscribers, 300_000);
        assert_eq!(results[0].sample_size, 3);

        assert_eq!(results[1].subreddit, "broken");
        assert!(results[1].is_zeroed());

        assert_eq!(results[2].subreddit, "startups");
        assert_eq!(results[2].active_posters, 3);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let results = score_subreddits(&FakeSource, &[], DEFAULT_SAMPLE_SIZE).await;
        assert!(results.is_empty());
    }
}
