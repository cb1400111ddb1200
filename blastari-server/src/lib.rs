//! HTTP surface of BLASTari: website analysis, subreddit discovery and
//! scoring, AI drafted content and the marketing assistant chat.

pub mod error;
pub mod handlers;
pub mod notify;
pub mod payloads;
pub mod prompts;
pub mod routes;
pub mod state;
pub mod website;

pub use error::{ApiError, ApiJson, ApiResult};
pub use notify::{EmailNotifier, FeedbackNotifier};
pub use routes::router;
pub use state::AppState;
pub use website::{HttpPageFetcher, PageFetcher};
