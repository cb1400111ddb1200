//! Per-subreddit deep analytics: pure aggregation over one post sample.

use crate::text::top_terms;
use blastari_core::RedditPost;
use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const TOP_AUTHORS: usize = 10;
pub const TOP_KEYWORDS: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostVolume {
    pub last_24h: u32,
    pub last_7d: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KarmaBuckets {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub viral: u32,
}

impl KarmaBuckets {
    fn add(&mut self, score: i64) {
        match score {
            s if s < 10 => self.low += 1,
            s if s < 100 => self.medium += 1,
            s if s < 1000 => self.high += 1,
            _ => self.viral += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorCount {
    pub author: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlairCount {
    pub flair: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepAnalytics {
    pub subreddit: String,
    pub post_volume: PostVolume,
    pub average_upvotes: f64,
    pub average_comments: f64,
    pub average_upvote_ratio: f64,
    pub top_posters: Vec<AuthorCount>,
    /// Authors ranked by the comments their posts received. Comment authors
    /// are not in the post listing, so this stands in for commenter activity.
    pub top_commenters: Vec<AuthorCount>,
    pub karma_distribution: KarmaBuckets,
    pub flairs: Vec<FlairCount>,
    /// Posts per UTC hour of day, index 0..24.
    pub hourly_activity: Vec<u32>,
    pub peak_hour: Option<u32>,
    pub keywords: Vec<KeywordCount>,
}

fn ranked_authors(counts: HashMap<&str, u64>, limit: usize) -> Vec<AuthorCount> {
    let mut authors: Vec<AuthorCount> = counts
        .into_iter()
        .map(|(author, count)| AuthorCount {
            author: author.to_string(),
            count,
        })
        .collect();
    authors.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.author.cmp(&b.author)));
    authors.truncate(limit);
    authors
}

fn mean(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        values.sum::<f64>() / n as f64
    }
}

pub fn deep_analytics(subreddit: &str, posts: &[RedditPost], now: DateTime<Utc>) -> DeepAnalytics {
    let n = posts.len();
    let day_ago = (now - Duration::hours(24)).timestamp();
    let week_ago = (now - Duration::days(7)).timestamp();

    let mut volume = PostVolume {
        total: n as u32,
        ..PostVolume::default()
    };
    let mut karma = KarmaBuckets::default();
    let mut hourly = vec![0u32; 24];
    let mut posters: HashMap<&str, u64> = HashMap::new();
    let mut commenters: HashMap<&str, u64> = HashMap::new();
    let mut flairs: HashMap<&str, u32> = HashMap::new();

    for post in posts {
        if post.created_utc >= day_ago {
            volume.last_24h += 1;
        }
        if post.created_utc >= week_ago {
            volume.last_7d += 1;
        }
        karma.add(post.score);

        if let Some(created) = Utc.timestamp_opt(post.created_utc, 0).single() {
            hourly[created.hour() as usize] += 1;
        }
        if post.has_known_author() {
            *posters.entry(&post.author).or_insert(0) += 1;
            *commenters.entry(&post.author).or_insert(0) += post.num_comments;
        }
        if let Some(flair) = post.flair.as_deref() {
            *flairs.entry(flair).or_insert(0) += 1;
        }
    }

    // Earliest hour wins a tie.
    let peak_hour = hourly
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(hour, _)| hour as u32);

    let mut flairs: Vec<FlairCount> = flairs
        .into_iter()
        .map(|(flair, count)| FlairCount {
            flair: flair.to_string(),
            count,
        })
        .collect();
    flairs.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.flair.cmp(&b.flair)));

    let keywords = top_terms(posts.iter().map(|p| p.title.as_str()), TOP_KEYWORDS)
        .into_iter()
        .map(|(keyword, count)| KeywordCount { keyword, count })
        .collect();

    DeepAnalytics {
        subreddit: subreddit.to_string(),
        post_volume: volume,
        average_upvotes: mean(posts.iter().map(|p| p.score as f64), n),
        average_comments: mean(posts.iter().map(|p| p.num_comments as f64), n),
        average_upvote_ratio: mean(posts.iter().map(|p| p.upvote_ratio), n),
        top_posters: ranked_authors(posters, TOP_AUTHORS),
        top_commenters: ranked_authors(commenters, TOP_AUTHORS),
        karma_distribution: karma,
        flairs,
        hourly_activity: hourly,
        peak_hour,
        keywords,
    }
}
