#[cfg(test)]
mod tests {
    use crate::Database;
    use blastari_core::{
        AnalyzedPost, CampaignRecommendation, ChatRole, CoreError, DatabaseError, GeneratedPost,
        PostRecommendation, RedditPost, SubredditAnalytics, UserAction, UserFeedback,
        WebsiteAnalysis,
    };
    use chrono::{Duration, Utc};
    use std::env;

    async fn setup_test_db() -> Database {
        let db_path = env::temp_dir().join(format!("test_blastari_{}.db", uuid::Uuid::new_v4()));
        let db_url = format!("sqlite://{}", db_path.display());

        let db = Database::connect(&db_url)
            .await
            .expect("Failed to connect to test database");
        db.run_migrations().await.expect("Failed to run migrations");
        db
    }

    fn analysis(url: &str) -> WebsiteAnalysis {
        WebsiteAnalysis {
            id: None,
            url: url.to_string(),
            product_overview: "Invoicing for freelancers".to_string(),
            value_proposition: "Get paid faster".to_string(),
            audience_segments: vec!["freelancers".to_string(), "agencies".to_string()],
            goals: vec!["signups".to_string()],
            budget: "$500/month".to_string(),
            tone: "friendly".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = setup_test_db().await;
        db.run_migrations().await.expect("second migration run");
    }

    #[tokio::test]
    async fn test_website_analysis_is_stored_once() {
        let db = setup_test_db().await;
        assert!(db.find_website_analysis("https://example.com").await.unwrap().is_none());

        let stored = db.insert_website_analysis(&analysis("https://example.com")).await.unwrap();
        assert!(stored.id.is_some());
        assert_eq!(stored.audience_segments.len(), 2);

        // A second insert for the same URL keeps the first row.
        let mut other = analysis("https://example.com");
        other.tone = "formal".to_string();
        let again = db.insert_website_analysis(&other).await.unwrap();
        assert_eq!(again.id, stored.id);
        assert_eq!(again.tone, "friendly");
        assert_eq!(db.count_website_analyses("https://example.com").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_campaigns_round_trip() {
        let db = setup_test_db().await;
        let campaign = CampaignRecommendation {
            id: None,
            website_url: "https://example.com".to_string(),
            title: "Founder AMA".to_string(),
            platform: "Reddit".to_string(),
            description: "Host an AMA in r/startups".to_string(),
            insights: vec!["Founders love transparency".to_string()],
            roi: "High".to_string(),
            difficulty: "Medium".to_string(),
            budget: "$0".to_string(),
        };
        db.insert_campaigns(&[campaign.clone(), campaign.clone()]).await.unwrap();

        let campaigns = db.campaigns_for("https://example.com").await.unwrap();
        assert_eq!(campaigns.len(), 2);
        assert_eq!(campaigns[0].insights, campaign.insights);
        assert!(db.campaigns_for("https://other.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subreddit_recommendations_append_and_strip_prefix() {
        let db = setup_test_db().await;
        let url = "https://example.com";
        db.append_subreddit_recommendations(
            url,
            &[
                ("r/startups".to_string(), "Founders".to_string()),
                ("  ".to_string(), "blank".to_string()),
            ],
        )
        .await
        .unwrap();
        db.append_subreddit_recommendations(url, &[("/r/SaaS/".to_string(), "SaaS".to_string())])
            .await
            .unwrap();

        let recs = db.subreddit_recommendations(url).await.unwrap();
        let names: Vec<&str> = recs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["startups", "SaaS"]);
    }

    #[tokio::test]
    async fn test_analytics_freshness() {
        let db = setup_test_db().await;
        let mut analytics = SubredditAnalytics::zeroed("Rust");
        analytics.subscribers = 300_000;
        analytics.engagement_rate = 2.5;
        analytics.sample_size = 100;
        analytics.top_themes = vec!["async".to_string()];
        db.upsert_subreddit_analytics(&analytics).await.unwrap();

        let cached = db
            .find_fresh_analytics("r/rust", Duration::hours(24))
            .await
            .unwrap()
            .expect("fresh analytics");
        assert_eq!(cached.subreddit, "Rust");
        assert_eq!(cached.subscribers, 300_000);
        assert_eq!(cached.top_themes, vec!["async"]);

        analytics.updated_at = Utc::now() - Duration::hours(25);
        db.upsert_subreddit_analytics(&analytics).await.unwrap();
        assert!(db
            .find_fresh_analytics("rust", Duration::hours(24))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_posts_and_recommendations() {
        let db = setup_test_db().await;
        let url = "https://example.com";
        let post = RedditPost {
            id: "abc".to_string(),
            title: "Looking for invoicing tools".to_string(),
            content: None,
            subreddit: "freelance".to_string(),
            author: "alice".to_string(),
            score: 12,
            num_comments: 3,
            upvote_ratio: 0.9,
            url: "https://reddit.com/abc".to_string(),
            permalink: "/r/freelance/comments/abc".to_string(),
            flair: None,
            created_utc: 1_700_000_000,
        };
        db.save_analyzed_posts(
            url,
            &[AnalyzedPost {
                post,
                ai_comment: "Try a tool that automates reminders.".to_string(),
            }],
        )
        .await
        .unwrap();
        assert_eq!(db.count_analyzed_posts(url).await.unwrap(), 1);

        let rec = PostRecommendation {
            id: None,
            website_url: url.to_string(),
            title: "How we cut late payments".to_string(),
            subreddit: "freelance".to_string(),
            outline: "Story, numbers, lesson".to_string(),
            rationale: "Pain point".to_string(),
        };
        let stored = db.insert_post_recommendations(&[rec]).await.unwrap();
        assert!(stored[0].id.is_some());
        assert_eq!(db.post_recommendations(url).await.unwrap().len(), 1);
        assert_eq!(db.delete_post_recommendations(url).await.unwrap(), 1);
        assert!(db.post_recommendations(url).await.unwrap().is_empty());

        let generated = GeneratedPost {
            id: None,
            website_url: url.to_string(),
            title: "Title".to_string(),
            content: "Body".to_string(),
            subreddit: "freelance".to_string(),
            image_url: Some("https://images.example/1.png".to_string()),
        };
        let stored = db.insert_generated_posts(&[generated]).await.unwrap();
        assert!(stored[0].id.is_some());
        assert_eq!(
            db.generated_posts(url).await.unwrap()[0].image_url.as_deref(),
            Some("https://images.example/1.png")
        );
    }

    #[tokio::test]
    async fn test_chat_channels_and_messages() {
        let db = setup_test_db().await;
        let channel = db
            .create_chat_channel(Some("user-1"), "Launch plan", Some("Q3 launch"))
            .await
            .unwrap();
        db.create_chat_channel(Some("user-2"), "Other", None).await.unwrap();

        let mine = db.list_chat_channels(Some("user-1")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, channel.id);
        assert_eq!(db.list_chat_channels(None).await.unwrap().len(), 2);

        db.insert_chat_message(&channel.id, ChatRole::User, "hello").await.unwrap();
        db.insert_chat_message(&channel.id, ChatRole::Assistant, "hi!").await.unwrap();
        let messages = db.chat_messages(&channel.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, ChatRole::Assistant);

        assert!(db.delete_chat_channel(&channel.id).await.unwrap());
        assert!(db.get_chat_channel(&channel.id).await.unwrap().is_none());
        assert!(db.chat_messages(&channel.id).await.unwrap().is_empty());
        assert!(!db.delete_chat_channel(&channel.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_chat_history_returns_latest_in_order() {
        let db = setup_test_db().await;
        let url = "https://example.com";
        for i in 0..5 {
            db.append_chat_turn(url, ChatRole::User, &format!("q{i}")).await.unwrap();
        }
        let history = db.chat_history(url, 3).await.unwrap();
        let contents: Vec<&str> = history.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["q2", "q3", "q4"]);
    }

    #[tokio::test]
    async fn test_feedback_and_actions() {
        let db = setup_test_db().await;
        let id = db
            .insert_feedback(&UserFeedback {
                email: "a@example.com".to_string(),
                name: "A".to_string(),
                feedback: "Love it".to_string(),
            })
            .await
            .unwrap();
        assert!(id > 0);
        assert_eq!(db.count_feedback().await.unwrap(), 1);

        let id = db
            .insert_user_action(&UserAction {
                email: "a@example.com".to_string(),
                name: None,
                action: "clicked_upgrade".to_string(),
                payload: serde_json::json!({"plan": "pro"}),
            })
            .await
            .unwrap();
        assert!(id > 0);
    }

    #[tokio::test]
    async fn test_bad_url_is_connection_error() {
        let err = Database::connect("sqlite:///nonexistent-blastari-dir/nested/test.db").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Database(DatabaseError::ConnectionFailed { .. })
        ));
    }
}
