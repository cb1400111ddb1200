use crate::notify::FeedbackNotifier;
use crate::website::PageFetcher;
use blastari_core::SubredditSource;
use database::Database;
use llm_interface::LlmProvider;
use reddit_client::metrics::MetricsCollector;
use std::sync::Arc;

/// Service handles shared by every handler. Nothing here carries
/// per-request state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub llm: Arc<dyn LlmProvider>,
    pub reddit: Arc<dyn SubredditSource>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub notifier: Option<Arc<dyn FeedbackNotifier>>,
    pub reddit_metrics: Option<Arc<MetricsCollector>>,
}

impl AppState {
    pub fn new(
        db: Database,
        llm: Arc<dyn LlmProvider>,
        reddit: Arc<dyn SubredditSource>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            db,
            llm,
            reddit,
            fetcher,
            notifier: None,
            reddit_metrics: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn FeedbackNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_reddit_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.reddit_metrics = Some(metrics);
        self
    }
}
