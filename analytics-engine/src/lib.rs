//! Subreddit scoring, ranking and deep analytics.
//!
//! Everything here is pure computation over data fetched through
//! [`blastari_core::SubredditSource`]; only [`batch`] performs I/O.

pub mod batch;
pub mod deep;
pub mod ranking;
pub mod scoring;
pub mod text;

pub use batch::{score_subreddits, DEFAULT_SAMPLE_SIZE};
pub use deep::{deep_analytics, DeepAnalytics, KarmaBuckets, PostVolume};
pub use ranking::{RankLimit, Ranked, RankingPolicy};
pub use scoring::score_subreddit;
pub use text::{tokenize, top_terms};
