//! Prompt text for every model call the handlers make.

use analytics_engine::DeepAnalytics;
use blastari_core::{PostRecommendation, RedditPost, SubredditRecommendation, WebsiteAnalysis};
use llm_interface::CompletionRequest;

pub const WEBSITE_ANALYST: &str = "You are a senior growth marketer. You read a company's website and \
describe the product, audience and marketing goals, then propose marketing campaigns. \
Respond with a single JSON object.";

pub const SUBREDDIT_SCOUT: &str = "You are a Reddit marketing strategist. You pick subreddits where a \
product's audience is active and self-promotion done well is tolerated. Respond with a single JSON object.";

pub const COMMENT_WRITER: &str = "You write short, genuinely helpful Reddit comments. Never sound like an \
advertisement. Mention the product only when it directly answers the post.";

pub const POST_WRITER: &str = "You write Reddit posts that provide value first and follow each \
subreddit's culture. Respond with a single JSON object.";

pub const POST_PLANNER: &str = "You plan Reddit content calendars for startups. Respond with a single \
JSON object.";

pub const ANALYTICS_INTERPRETER: &str = "You interpret subreddit activity statistics for a marketer. \
Respond with a single JSON object.";

pub const CONTENT_CREATOR: &str = "You are a creative marketing copywriter.";

pub const VIDEO_SCRIPTWRITER: &str = "You write short marketing video scripts with scene directions, \
voice-over lines and an estimated duration per scene.";

pub const MARKETING_ASSISTANT: &str = "You are BLASTari, a friendly Reddit marketing assistant. Use the \
website analysis and recommendations you are given to answer concretely. Keep answers under 200 words.";

/// Subreddit candidates requested per generation.
pub const CANDIDATE_COUNT: usize = 25;

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

pub fn describe_analysis(analysis: &WebsiteAnalysis) -> String {
    format!(
        "Website: {}\nProduct: {}\nValue proposition: {}\nAudience: {}\nGoals: {}\nBudget: {}\nTone: {}",
        analysis.url,
        analysis.product_overview,
        analysis.value_proposition,
        list(&analysis.audience_segments),
        list(&analysis.goals),
        analysis.budget,
        analysis.tone
    )
}

pub fn website_analysis(url: &str, page_text: &str) -> CompletionRequest {
    let user = format!(
        "Analyze the website {url}. Its text content is:\n\"\"\"\n{page_text}\n\"\"\"\n\n\
Return JSON with keys: productOverview (string), valueProposition (string), \
audienceSegments (array of strings), goals (array of strings), budget (string), tone (string), \
campaigns (array of 3 objects with title, platform, description, insights (array of strings), \
roi, difficulty, budget)."
    );
    CompletionRequest::new(WEBSITE_ANALYST, user)
        .temperature(0.7)
        .max_tokens(1500)
        .json()
}

pub fn subreddit_candidates(
    analysis: &WebsiteAnalysis,
    campaign_type: Option<&str>,
    excluded: &[String],
) -> CompletionRequest {
    let user = format!(
        "{}\nCampaign type: {}\n\nSuggest {CANDIDATE_COUNT} real, active subreddits for this product. \
Do not suggest any of: {}.\nReturn JSON: {{\"subreddits\": [{{\"name\": \"subreddit name without r/\", \
\"reason\": \"one sentence\"}}]}}",
        describe_analysis(analysis),
        campaign_type.unwrap_or("general awareness"),
        list(excluded)
    );
    CompletionRequest::new(SUBREDDIT_SCOUT, user)
        .temperature(0.8)
        .max_tokens(1500)
        .json()
}

pub fn post_comment(context: &str, post: &RedditPost) -> CompletionRequest {
    let user = format!(
        "{context}\n\nReddit post in r/{}:\nTitle: {}\nBody: {}\n\nWrite one comment (2-4 sentences).",
        post.subreddit,
        post.title,
        post.content.as_deref().unwrap_or("(no body)")
    );
    CompletionRequest::new(COMMENT_WRITER, user)
        .temperature(0.7)
        .max_tokens(250)
}

pub fn draft_posts(
    context: &str,
    subreddits: &[String],
    instructions: Option<&str>,
    count: usize,
) -> CompletionRequest {
    let user = format!(
        "{context}\n\nTarget subreddits: {}\nExtra instructions: {}\n\nWrite {count} Reddit posts. \
Return JSON: {{\"posts\": [{{\"title\": \"...\", \"content\": \"...\", \"subreddit\": \"name without r/\"}}]}}",
        list(subreddits),
        instructions.unwrap_or("none")
    );
    CompletionRequest::new(POST_WRITER, user)
        .temperature(0.8)
        .max_tokens(2000)
        .json()
}

pub fn post_image(analysis_context: &str) -> String {
    format!(
        "A clean, modern illustration for a Reddit post about this product. No text in the image. {}",
        analysis_context.chars().take(600).collect::<String>()
    )
}

pub fn post_ideas(analysis: &WebsiteAnalysis, subreddits: &[String]) -> CompletionRequest {
    let user = format!(
        "{}\n\nSubreddits: {}\n\nPropose 5 Reddit post ideas. Return JSON: {{\"recommendations\": \
[{{\"title\": \"...\", \"subreddit\": \"name without r/\", \"outline\": \"...\", \"rationale\": \"...\"}}]}}",
        describe_analysis(analysis),
        list(subreddits)
    );
    CompletionRequest::new(POST_PLANNER, user)
        .temperature(0.7)
        .max_tokens(1500)
        .json()
}

pub fn deep_insights(analytics: &DeepAnalytics) -> CompletionRequest {
    let keywords: Vec<String> = analytics
        .keywords
        .iter()
        .take(10)
        .map(|k| k.keyword.clone())
        .collect();
    let user = format!(
        "Subreddit r/{}: {} posts sampled, {} in the last 24h, average upvotes {:.1}, average comments {:.1}, \
average upvote ratio {:.2}, peak posting hour (UTC) {}, top keywords: {}.\n\
Return JSON: {{\"insights\": [\"3 to 5 actionable insights for posting here\"]}}",
        analytics.subreddit,
        analytics.post_volume.total,
        analytics.post_volume.last_24h,
        analytics.average_upvotes,
        analytics.average_comments,
        analytics.average_upvote_ratio,
        analytics
            .peak_hour
            .map(|h| h.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        list(&keywords)
    );
    CompletionRequest::new(ANALYTICS_INTERPRETER, user)
        .temperature(0.5)
        .max_tokens(600)
        .json()
}

pub fn text_content(prompt: &str) -> CompletionRequest {
    CompletionRequest::new(CONTENT_CREATOR, prompt)
        .temperature(0.8)
        .max_tokens(1000)
}

pub fn video_script(prompt: &str) -> CompletionRequest {
    CompletionRequest::new(VIDEO_SCRIPTWRITER, format!("Write a video script for: {prompt}"))
        .temperature(0.8)
        .max_tokens(1200)
}

pub fn assistant_context(
    analysis: Option<&WebsiteAnalysis>,
    subreddits: &[SubredditRecommendation],
    post_ideas: &[PostRecommendation],
    campaign_type: Option<&str>,
) -> String {
    let mut context = match analysis {
        Some(analysis) => describe_analysis(analysis),
        None => "No website analysis is available yet.".to_string(),
    };
    if let Some(campaign_type) = campaign_type {
        context.push_str(&format!("\nCampaign type: {campaign_type}"));
    }
    if !subreddits.is_empty() {
        let names: Vec<String> = subreddits
            .iter()
            .map(|s| format!("r/{} ({})", s.name, s.reason))
            .collect();
        context.push_str(&format!("\nRecommended subreddits: {}", names.join("; ")));
    }
    if !post_ideas.is_empty() {
        let titles: Vec<String> = post_ideas
            .iter()
            .map(|p| format!("\"{}\" for r/{}", p.title, p.subreddit))
            .collect();
        context.push_str(&format!("\nPlanned posts: {}", titles.join("; ")));
    }
    context
}

pub fn assistant_reply(context: &str, user_message: &str) -> CompletionRequest {
    CompletionRequest::new(
        format!("{MARKETING_ASSISTANT}\n\nContext:\n{context}"),
        user_message,
    )
    .temperature(0.7)
    .max_tokens(500)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_candidate_prompt_lists_exclusions() {
        let analysis = WebsiteAnalysis {
            id: Some(1),
            url: "https://example.com".to_string(),
            product_overview: "Invoices".to_string(),
            value_proposition: "Paid faster".to_string(),
            audience_segments: vec![],
            goals: vec![],
            budget: String::new(),
            tone: String::new(),
            created_at: Utc::now(),
        };
        let request = subreddit_candidates(
            &analysis,
            None,
            &["freelance".to_string(), "startups".to_string()],
        );
        assert!(request.json_mode);
        assert_eq!(request.messages[0].content, SUBREDDIT_SCOUT);
        assert!(request.messages[1].content.contains("freelance, startups"));
        assert!(request.messages[1].content.contains("Audience: none"));
    }

    #[test]
    fn test_assistant_context_without_analysis() {
        let context = assistant_context(None, &[], &[], Some("launch"));
        assert!(context.starts_with("No website analysis"));
        assert!(context.ends_with("Campaign type: launch"));
    }
}
