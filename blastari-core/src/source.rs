use crate::{CoreError, RedditPost, SubredditAbout};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    New,
    Hot,
}

impl Listing {
    pub fn as_path(&self) -> &'static str {
        match self {
            Listing::New => "new",
            Listing::Hot => "hot",
        }
    }
}

/// Where subreddit data comes from. The Reddit client implements this; tests
/// substitute in-memory fakes.
#[async_trait]
pub trait SubredditSource: Send + Sync {
    async fn about(&self, subreddit: &str) -> Result<SubredditAbout, CoreError>;

    async fn posts(
        &self,
        subreddit: &str,
        listing: Listing,
        limit: u32,
    ) -> Result<Vec<RedditPost>, CoreError>;
}
