use crate::text::top_terms;
use blastari_core::{RedditPost, SubredditAbout, SubredditAnalytics};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Used in place of the active-user count when Reddit reports none.
pub const DEFAULT_AUDIENCE: f64 = 10_000.0;
pub const TOP_THEME_COUNT: usize = 4;

/// Average interactions (score + comments) per post as a percentage of the
/// active audience. Never negative; 0 for an empty sample.
pub fn engagement_rate(posts: &[RedditPost], active_users: Option<u64>) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    let interactions: f64 = posts
        .iter()
        .map(|p| p.score as f64 + p.num_comments as f64)
        .sum();
    let per_post = interactions / posts.len() as f64;
    let audience = match active_users {
        Some(n) if n > 0 => n as f64,
        _ => DEFAULT_AUDIENCE,
    };
    (per_post / audience * 100.0).max(0.0)
}

pub fn visibility_score(posts: &[RedditPost]) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    let n = posts.len() as f64;
    let avg_score = posts.iter().map(|p| p.score as f64).sum::<f64>() / n;
    let avg_ratio = posts.iter().map(|p| p.upvote_ratio).sum::<f64>() / n;
    avg_score * avg_ratio
}

pub fn active_posters(posts: &[RedditPost]) -> u32 {
    posts
        .iter()
        .filter(|p| p.has_known_author())
        .map(|p| p.author.as_str())
        .collect::<HashSet<_>>()
        .len() as u32
}

/// Share of posts whose body was removed or deleted, in `[0, 1]`.
pub fn strictness_index(posts: &[RedditPost]) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    posts.iter().filter(|p| p.is_removed()).count() as f64 / posts.len() as f64
}

pub fn top_themes(posts: &[RedditPost]) -> Vec<String> {
    top_terms(posts.iter().map(|p| p.title.as_str()), TOP_THEME_COUNT)
        .into_iter()
        .map(|(term, _)| term)
        .collect()
}

pub fn score_subreddit(
    name: &str,
    about: &SubredditAbout,
    posts: &[RedditPost],
    now: DateTime<Utc>,
) -> SubredditAnalytics {
    SubredditAnalytics {
        subreddit: name.to_string(),
        subscribers: about.subscribers,
        engagement_rate: engagement_rate(posts, about.active_user_count),
        visibility_score: visibility_score(posts),
        active_posters: active_posters(posts),
        strictness_index: strictness_index(posts),
        top_themes: top_themes(posts),
        sample_size: posts.len() as u32,
        updated_at: now,
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{about, post};
    use super::*;

    #[test]
    fn test_empty_sample_is_zero_not_nan() {
        assert_eq!(engagement_rate(&[], Some(100)), 0.0);
        assert_eq!(strictness_index(&[]), 0.0);
        assert_eq!(visibility_score(&[]), 0.0);

        let analytics = score_subreddit("empty", &about("empty", 5000, None), &[], Utc::now());
        assert!(!analytics.engagement_rate.is_nan());
        assert_eq!(analytics.sample_size, 0);
        assert!(analytics.top_themes.is_empty());
    }

    #[test]
    fn test_engagement_rate_uses_active_users() {
        let posts = vec![post("a", "t", 40, 10), post("b", "t", 20, 30)];
        // (50 + 50) / 2 = 50 interactions per post, over 1000 active users.
        assert!((engagement_rate(&posts, Some(1000)) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_engagement_rate_defaults_audience() {
        let posts = vec![post("a", "t", 100, 0)];
        assert!((engagement_rate(&posts, None) - 1.0).abs() < 1e-9);
        assert!((engagement_rate(&posts, Some(0)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_engagement_rate_never_negative() {
        let posts = vec![post("a", "t", -50, 1), post("b", "t", -20, 0)];
        assert_eq!(engagement_rate(&posts, Some(10)), 0.0);
    }

    #[test]
    fn test_strictness_in_unit_interval() {
        let mut removed = post("a", "t", 1, 0);
        removed.content = Some("[removed]".to_string());
        let mut deleted = post("b", "t", 1, 0);
        deleted.content = Some("[deleted]".to_string());
        let kept = post("c", "t", 1, 0);

        let posts = vec![removed, deleted, kept.clone(), kept];
        let s = strictness_index(&posts);
        assert!((0.0..=1.0).contains(&s));
        assert!((s - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_active_posters_skips_deleted_and_duplicates() {
        let posts = vec![
            post("alice", "t", 1, 0),
            post("alice", "t", 2, 0),
            post("bob", "t", 3, 0),
            post("[deleted]", "t", 4, 0),
        ];
        assert_eq!(active_posters(&posts), 2);
    }

    #[test]
    fn test_score_subreddit_top_themes() {
        let posts = vec![
            post("a", "Marketing automation for startups", 10, 2),
            post("b", "Startups marketing on a budget", 5, 1),
            post("c", "Automation tools I use", 3, 0),
        ];
        let analytics = score_subreddit("startups", &about("startups", 90000, Some(500)), &posts, Utc::now());
        assert_eq!(analytics.subscribers, 90000);
        assert_eq!(analytics.active_posters, 3);
        assert_eq!(
            analytics.top_themes,
            vec!["automation", "marketing", "startups", "budget"]
        );
    }
}
