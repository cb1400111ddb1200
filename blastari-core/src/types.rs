use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Strips whitespace, surrounding slashes and any `r/` prefix from a
/// subreddit name as the AI or a user may have typed it.
pub fn normalize_subreddit_name(name: &str) -> String {
    let trimmed = name.trim().trim_matches('/');
    let stripped = match trimmed.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("r/") => &trimmed[2..],
        _ => trimmed,
    };
    stripped.trim_matches('/').trim().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteAnalysis {
    pub id: Option<i64>,
    pub url: String,
    pub product_overview: String,
    pub value_proposition: String,
    pub audience_segments: Vec<String>,
    pub goals: Vec<String>,
    pub budget: String,
    pub tone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecommendation {
    pub id: Option<i64>,
    pub website_url: String,
    pub title: String,
    pub platform: String,
    pub description: String,
    pub insights: Vec<String>,
    pub roi: String,
    pub difficulty: String,
    pub budget: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubredditRecommendation {
    pub id: Option<i64>,
    pub website_url: String,
    pub name: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubredditAnalytics {
    pub subreddit: String,
    pub subscribers: u64,
    pub engagement_rate: f64,
    pub visibility_score: f64,
    pub active_posters: u32,
    pub strictness_index: f64,
    pub top_themes: Vec<String>,
    pub sample_size: u32,
    pub updated_at: DateTime<Utc>,
}

impl SubredditAnalytics {
    /// The record reported for a subreddit whose data could not be fetched.
    pub fn zeroed(subreddit: &str) -> Self {
        Self {
            subreddit: subreddit.to_string(),
            subscribers: 0,
            engagement_rate: 0.0,
            visibility_score: 0.0,
            active_posters: 0,
            strictness_index: 0.0,
            top_themes: Vec::new(),
            sample_size: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn is_zeroed(&self) -> bool {
        self.subscribers == 0 && self.sample_size == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubredditAbout {
    pub name: String,
    pub title: String,
    pub public_description: String,
    pub subscribers: u64,
    pub active_user_count: Option<u64>,
    pub over18: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedditPost {
    pub id: String,
    pub title: String,
    pub content: Option<String>,
    pub subreddit: String,
    pub author: String,
    pub score: i64,
    pub num_comments: u64,
    pub upvote_ratio: f64,
    pub url: String,
    pub permalink: String,
    pub flair: Option<String>,
    pub created_utc: i64,
}

impl RedditPost {
    pub fn is_removed(&self) -> bool {
        matches!(
            self.content.as_deref().map(str::trim),
            Some("[removed]") | Some("[deleted]")
        )
    }

    pub fn has_known_author(&self) -> bool {
        !self.author.is_empty() && self.author != "[deleted]"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedPost {
    #[serde(flatten)]
    pub post: RedditPost,
    pub ai_comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPost {
    pub id: Option<i64>,
    pub website_url: String,
    pub title: String,
    pub content: String,
    pub subreddit: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecommendation {
    pub id: Option<i64>,
    pub website_url: String,
    pub title: String,
    pub subreddit: String,
    pub outline: String,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatChannel {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "system" => Some(ChatRole::System),
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Option<i64>,
    pub channel_id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// One turn of the per-website assistant conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFeedback {
    pub email: String,
    pub name: String,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAction {
    pub email: String,
    pub name: Option<String>,
    pub action: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_subreddit_name() {
        assert_eq!(normalize_subreddit_name("r/rust"), "rust");
        assert_eq!(normalize_subreddit_name("/r/SaaS/"), "SaaS");
        assert_eq!(normalize_subreddit_name("  R/startups "), "startups");
        assert_eq!(normalize_subreddit_name("marketing"), "marketing");
        assert_eq!(normalize_subreddit_name("r"), "r");
    }

    #[test]
    fn test_removed_post_detection() {
        let mut post = RedditPost {
            id: "a".to_string(),
            title: "t".to_string(),
            content: Some("[removed]".to_string()),
            subreddit: "rust".to_string(),
            author: "[deleted]".to_string(),
            score: 1,
            num_comments: 0,
            upvote_ratio: 1.0,
            url: String::new(),
            permalink: String::new(),
            flair: None,
            created_utc: 0,
        };
        assert!(post.is_removed());
        assert!(!post.has_known_author());

        post.content = None;
        assert!(!post.is_removed());
    }

    #[test]
    fn test_chat_role_round_trip() {
        for role in [ChatRole::System, ChatRole::User, ChatRole::Assistant] {
            assert_eq!(ChatRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(ChatRole::parse("bot"), None);
    }
}
