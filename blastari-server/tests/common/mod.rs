#![allow(dead_code)]

use async_trait::async_trait;
use blastari_core::{
    CoreError, Listing, RedditApiError, RedditPost, SubredditAbout, SubredditSource,
};
use blastari_server::prompts;
use blastari_server::{AppState, FeedbackNotifier, PageFetcher};
use database::Database;
use llm_interface::{CompletionRequest, LlmProvider};
use serde_json::json;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const IMAGE_URL: &str = "https://images.test/generated.png";

/// Answers each prompt family with a canned payload, keyed on the system
/// prompt.
#[derive(Default)]
pub struct FakeLlm {
    pub analysis_calls: AtomicUsize,
    pub fail_images: bool,
    pub malformed_json: bool,
}

impl FakeLlm {
    pub fn malformed() -> Self {
        Self {
            malformed_json: true,
            ..Self::default()
        }
    }

    pub fn without_images() -> Self {
        Self {
            fail_images: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    fn name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CoreError> {
        let system = request.messages[0].content.as_str();
        let user = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        if self.malformed_json && request.json_mode {
            return Ok("I'm sorry, I can only answer in prose today.".to_string());
        }

        let reply = if system == prompts::WEBSITE_ANALYST {
            self.analysis_calls.fetch_add(1, Ordering::SeqCst);
            json!({
                "productOverview": "Invoicing for freelancers",
                "valueProposition": "Get paid faster",
                "audienceSegments": ["freelancers", "agencies"],
                "goals": ["signups"],
                "budget": "$500/month",
                "tone": "friendly",
                "campaigns": [
                    {"title": "Launch week", "platform": "Reddit", "description": "Share the story",
                     "insights": ["Lead with the problem"], "roi": "High", "difficulty": "Medium", "budget": "$0"},
                    {"title": "Templates", "platform": "Reddit", "description": "Give away invoice templates",
                     "insights": [], "roi": "Medium", "difficulty": "Low", "budget": "$0"}
                ]
            })
            .to_string()
        } else if system == prompts::SUBREDDIT_SCOUT {
            let subreddits: Vec<_> = (0..40)
                .map(|i| {
                    let name = if i % 3 == 0 {
                        format!("r/community{i}")
                    } else {
                        format!("community{i}")
                    };
                    json!({ "name": name, "reason": format!("Reason {i}") })
                })
                .collect();
            format!("```json\n{}\n```", json!({ "subreddits": subreddits }))
        } else if system == prompts::COMMENT_WRITER {
            "Nice write-up. We solved this by sending invoices the day work ships.".to_string()
        } else if system == prompts::POST_WRITER {
            json!({
                "posts": [
                    {"title": "How I stopped chasing invoices", "content": "Story...", "subreddit": "r/freelance"},
                    {"title": "Invoice template thread", "content": "Sharing ours", "subreddit": "smallbusiness"},
                    {"title": "What tools do you use?", "content": "Curious", "subreddit": ""},
                    {"title": "Extra post", "content": "More", "subreddit": "startups"}
                ]
            })
            .to_string()
        } else if system == prompts::POST_PLANNER {
            json!({
                "recommendations": [
                    {"title": "Lessons from 100 invoices", "subreddit": "r/freelance",
                     "outline": "Numbers first", "rationale": "Data posts do well"},
                    {"title": "Ask me anything about late payments", "subreddit": "smallbusiness",
                     "outline": "AMA", "rationale": "Engagement"}
                ]
            })
            .to_string()
        } else if system == prompts::ANALYTICS_INTERPRETER {
            json!({ "insights": ["Post on weekday mornings", "Lead with a question"] }).to_string()
        } else if system == prompts::CONTENT_CREATOR {
            format!("Copy for: {user}")
        } else if system == prompts::VIDEO_SCRIPTWRITER {
            "Scene 1: a freelancer opens the app.".to_string()
        } else if system.starts_with(prompts::MARKETING_ASSISTANT) {
            format!(
                "Reply to '{}' after {} earlier turns",
                user,
                request.messages.len().saturating_sub(2)
            )
        } else {
            return Err(CoreError::Internal {
                message: format!("unexpected prompt: {system}"),
            });
        };
        Ok(reply)
    }

    async fn generate_image(&self, _prompt: &str) -> Result<String, CoreError> {
        if self.fail_images {
            return Err(CoreError::Internal {
                message: "image backend unavailable".to_string(),
            });
        }
        Ok(IMAGE_URL.to_string())
    }
}

/// In-memory Reddit. Names containing `broken` fail; names containing
/// `tiny` have too few subscribers to qualify.
#[derive(Default)]
pub struct FakeSource {
    pub about_calls: AtomicUsize,
}

pub fn post(subreddit: &str, id: usize) -> RedditPost {
    RedditPost {
        id: format!("{subreddit}_{id}"),
        title: format!("Invoice automation tips for freelancers {id}"),
        content: Some("Looking for advice on getting paid on time".to_string()),
        subreddit: subreddit.to_string(),
        author: format!("user{}", id % 4),
        score: 50,
        num_comments: 10,
        upvote_ratio: 0.9,
        url: format!("https://reddit.test/{subreddit}/{id}"),
        permalink: format!("/r/{subreddit}/comments/{id}"),
        flair: Some("Discussion".to_string()),
        created_utc: 1_700_000_000 + id as i64 * 3_600,
    }
}

#[async_trait]
impl SubredditSource for FakeSource {
    async fn about(&self, subreddit: &str) -> Result<SubredditAbout, CoreError> {
        self.about_calls.fetch_add(1, Ordering::SeqCst);
        if subreddit.contains("broken") {
            return Err(RedditApiError::SubredditNotFound {
                subreddit: subreddit.to_string(),
            }
            .into());
        }
        let subscribers = if subreddit.contains("tiny") { 10 } else { 5_000 };
        Ok(SubredditAbout {
            name: subreddit.to_string(),
            title: subreddit.to_string(),
            public_description: String::new(),
            subscribers,
            active_user_count: None,
            over18: false,
        })
    }

    async fn posts(
        &self,
        subreddit: &str,
        _listing: Listing,
        limit: u32,
    ) -> Result<Vec<RedditPost>, CoreError> {
        if subreddit.contains("broken") {
            return Err(RedditApiError::SubredditNotFound {
                subreddit: subreddit.to_string(),
            }
            .into());
        }
        Ok((0..limit.min(8) as usize).map(|i| post(subreddit, i)).collect())
    }
}

/// Serves a fixed page. URLs containing `blocked` are refused and URLs
/// containing `tiny` have almost no text.
pub struct FakeFetcher;

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, CoreError> {
        if url.contains("blocked") {
            return Err(CoreError::Unprocessable {
                reason: "the site refused access (403)".to_string(),
            });
        }
        if url.contains("tiny") {
            return Ok("Coming soon".to_string());
        }
        Ok("Invoicer helps freelancers send invoices, track payments and chase late clients \
            automatically. Start free and get paid faster with reminders that sound human."
            .repeat(2))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl FeedbackNotifier for RecordingNotifier {
    async fn notify(&self, feedback: &blastari_core::UserFeedback) -> Result<(), CoreError> {
        if self.fail {
            return Err(CoreError::RequestFailed {
                message: "email provider down".to_string(),
                status_code: Some(503),
            });
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(feedback.email.clone());
        }
        Ok(())
    }
}

pub async fn test_db() -> Database {
    let db_path = env::temp_dir().join(format!("test_blastari_server_{}.db", uuid::Uuid::new_v4()));
    let db = Database::connect(&format!("sqlite://{}", db_path.display()))
        .await
        .expect("Failed to connect to test database");
    db.run_migrations().await.expect("Failed to run migrations");
    db
}

pub struct TestApp {
    pub state: AppState,
    pub llm: Arc<FakeLlm>,
    pub source: Arc<FakeSource>,
}

pub async fn test_app_with(llm: FakeLlm) -> TestApp {
    let llm = Arc::new(llm);
    let source = Arc::new(FakeSource::default());
    let state = AppState::new(
        test_db().await,
        llm.clone(),
        source.clone(),
        Arc::new(FakeFetcher),
    );
    TestApp { state, llm, source }
}

pub async fn test_app() -> TestApp {
    test_app_with(FakeLlm::default()).await
}
