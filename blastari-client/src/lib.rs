//! Client side of BLASTari: a typed HTTP client for the service and the
//! session cache it keeps results in.

pub mod api;
pub mod session_cache;

pub use api::{
    requires_error_page, BlastariClient, DeepAnalyticsResult, GeneratedContent,
    PostGenerationRequest, PostRecommendationsResult, RecommendedSubreddit, SubredditRequest,
    SubredditsResult, WebsiteAnalysisResult,
};
pub use session_cache::{FileStorage, MemoryStorage, SessionCache, SessionStorage};
