//! Typed shapes the model is asked to return, with the defaults used when
//! its output cannot be parsed.

use blastari_core::{CampaignRecommendation, WebsiteAnalysis};
use chrono::Utc;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignPayload {
    pub title: String,
    pub platform: String,
    pub description: String,
    pub insights: Vec<String>,
    pub roi: String,
    pub difficulty: String,
    pub budget: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebsiteAnalysisPayload {
    pub product_overview: String,
    pub value_proposition: String,
    pub audience_segments: Vec<String>,
    pub goals: Vec<String>,
    pub budget: String,
    pub tone: String,
    pub campaigns: Vec<CampaignPayload>,
}

impl WebsiteAnalysisPayload {
    pub fn fallback(url: &str) -> Self {
        Self {
            product_overview: format!("Product or service offered at {url}"),
            value_proposition: "Helps its customers solve a specific problem".to_string(),
            audience_segments: vec![
                "Early adopters".to_string(),
                "Small business owners".to_string(),
            ],
            goals: vec!["Brand awareness".to_string(), "Website traffic".to_string()],
            budget: "Under $1,000 per month".to_string(),
            tone: "Helpful and authentic".to_string(),
            campaigns: vec![CampaignPayload {
                title: "Community value posts".to_string(),
                platform: "Reddit".to_string(),
                description: "Share practical advice in niche communities and mention the product only where it helps.".to_string(),
                insights: vec!["Redditors reward transparency over promotion".to_string()],
                roi: "Medium".to_string(),
                difficulty: "Low".to_string(),
                budget: "$0".to_string(),
            }],
        }
    }

    pub fn into_records(self, url: &str) -> (WebsiteAnalysis, Vec<CampaignRecommendation>) {
        let analysis = WebsiteAnalysis {
            id: None,
            url: url.to_string(),
            product_overview: self.product_overview,
            value_proposition: self.value_proposition,
            audience_segments: self.audience_segments,
            goals: self.goals,
            budget: self.budget,
            tone: self.tone,
            created_at: Utc::now(),
        };
        let campaigns = self
            .campaigns
            .into_iter()
            .map(|c| CampaignRecommendation {
                id: None,
                website_url: url.to_string(),
                title: c.title,
                platform: c.platform,
                description: c.description,
                insights: c.insights,
                roi: c.roi,
                difficulty: c.difficulty,
                budget: c.budget,
            })
            .collect();
        (analysis, campaigns)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CandidatePayload {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SubredditCandidatesPayload {
    pub subreddits: Vec<CandidatePayload>,
}

const FALLBACK_SUBREDDITS: &[&str] = &[
    "startups",
    "Entrepreneur",
    "smallbusiness",
    "marketing",
    "SaaS",
    "SideProject",
    "growmybusiness",
    "digital_marketing",
    "socialmedia",
    "content_marketing",
    "EntrepreneurRideAlong",
    "indiehackers",
    "productivity",
    "webdev",
    "business",
    "sales",
    "advertising",
    "SEO",
    "GrowthHacking",
    "Solopreneur",
];

impl SubredditCandidatesPayload {
    pub fn fallback() -> Self {
        Self {
            subreddits: FALLBACK_SUBREDDITS
                .iter()
                .map(|name| CandidatePayload {
                    name: name.to_string(),
                    reason: "Broad community of founders and marketers".to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PostIdeaPayload {
    pub title: String,
    pub subreddit: String,
    pub outline: String,
    pub rationale: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PostIdeasPayload {
    pub recommendations: Vec<PostIdeaPayload>,
}

impl PostIdeasPayload {
    pub fn fallback(subreddit: &str) -> Self {
        Self {
            recommendations: vec![
                PostIdeaPayload {
                    title: "What we learned building our first version".to_string(),
                    subreddit: subreddit.to_string(),
                    outline: "The problem, what we tried, what worked, open questions".to_string(),
                    rationale: "Build-in-public stories invite discussion".to_string(),
                },
                PostIdeaPayload {
                    title: "How do you currently solve this problem?".to_string(),
                    subreddit: subreddit.to_string(),
                    outline: "Describe the pain point and ask for workflows".to_string(),
                    rationale: "Questions gather feedback without self-promotion".to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DraftPostPayload {
    pub title: String,
    pub content: String,
    pub subreddit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DraftPostsPayload {
    pub posts: Vec<DraftPostPayload>,
}

impl DraftPostsPayload {
    pub fn fallback(subreddit: &str, product: &str) -> Self {
        Self {
            posts: vec![DraftPostPayload {
                title: "Looking for honest feedback on what we built".to_string(),
                content: format!(
                    "We have been working on {product}. What would make something like this useful to you?"
                ),
                subreddit: subreddit.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InsightsPayload {
    pub insights: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_interface::parse_or_fallback;

    #[test]
    fn test_partial_analysis_payload_fills_defaults() {
        let payload = parse_or_fallback(
            r#"```json
            {"productOverview": "Invoices", "audienceSegments": ["freelancers"]}
            ```"#,
            || WebsiteAnalysisPayload::fallback("https://example.com"),
        );
        assert!(!payload.is_fallback());
        let payload = payload.into_inner();
        assert_eq!(payload.product_overview, "Invoices");
        assert!(payload.campaigns.is_empty());
    }

    #[test]
    fn test_fallback_records_carry_url() {
        let (analysis, campaigns) =
            WebsiteAnalysisPayload::fallback("https://example.com").into_records("https://example.com");
        assert_eq!(analysis.url, "https://example.com");
        assert_eq!(campaigns.len(), 1);
        assert_eq!(campaigns[0].website_url, "https://example.com");
    }

    #[test]
    fn test_candidate_fallback_has_no_prefixes() {
        let fallback = SubredditCandidatesPayload::fallback();
        assert!(fallback.subreddits.len() >= 15);
        assert!(fallback.subreddits.iter().all(|c| !c.name.starts_with("r/")));
    }
}
