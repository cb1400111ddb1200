use crate::Database;
use blastari_core::{AnalyzedPost, CoreError, GeneratedPost, PostRecommendation};
use chrono::Utc;
use sqlx::FromRow;

#[derive(Debug, FromRow)]
struct PostRecommendationRow {
    id: i64,
    website_url: String,
    title: String,
    subreddit: String,
    outline: String,
    rationale: String,
}

impl From<PostRecommendationRow> for PostRecommendation {
    fn from(row: PostRecommendationRow) -> Self {
        Self {
            id: Some(row.id),
            website_url: row.website_url,
            title: row.title,
            subreddit: row.subreddit,
            outline: row.outline,
            rationale: row.rationale,
        }
    }
}

#[derive(Debug, FromRow)]
struct GeneratedPostRow {
    id: i64,
    website_url: String,
    title: String,
    content: String,
    subreddit: String,
    image_url: Option<String>,
}

impl From<GeneratedPostRow> for GeneratedPost {
    fn from(row: GeneratedPostRow) -> Self {
        Self {
            id: Some(row.id),
            website_url: row.website_url,
            title: row.title,
            content: row.content,
            subreddit: row.subreddit,
            image_url: row.image_url,
        }
    }
}

impl Database {
    pub async fn save_analyzed_posts(
        &self,
        website_url: &str,
        posts: &[AnalyzedPost],
    ) -> Result<(), CoreError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        for analyzed in posts {
            let post = &analyzed.post;
            sqlx::query(
                r#"
                INSERT INTO reddit_posts_analysis (
                    website_url, post_id, subreddit, title, content, author,
                    score, url, ai_comment, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(website_url)
            .bind(&post.id)
            .bind(&post.subreddit)
            .bind(&post.title)
            .bind(&post.content)
            .bind(&post.author)
            .bind(post.score)
            .bind(&post.url)
            .bind(&analyzed.ai_comment)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn count_analyzed_posts(&self, website_url: &str) -> Result<i64, CoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reddit_posts_analysis WHERE website_url = ?")
                .bind(website_url)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    pub async fn insert_post_recommendations(
        &self,
        recommendations: &[PostRecommendation],
    ) -> Result<Vec<PostRecommendation>, CoreError> {
        let now = Utc::now();
        let mut stored = Vec::with_capacity(recommendations.len());
        let mut tx = self.pool.begin().await?;
        for rec in recommendations {
            let id = sqlx::query(
                r#"
                INSERT INTO reddit_post_recommendations (
                    website_url, title, subreddit, outline, rationale, created_at
                ) VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&rec.website_url)
            .bind(&rec.title)
            .bind(&rec.subreddit)
            .bind(&rec.outline)
            .bind(&rec.rationale)
            .bind(now)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
            stored.push(PostRecommendation {
                id: Some(id),
                ..rec.clone()
            });
        }
        tx.commit().await?;
        Ok(stored)
    }

    pub async fn post_recommendations(
        &self,
        website_url: &str,
    ) -> Result<Vec<PostRecommendation>, CoreError> {
        let rows: Vec<PostRecommendationRow> = sqlx::query_as(
            "SELECT id, website_url, title, subreddit, outline, rationale \
             FROM reddit_post_recommendations WHERE website_url = ? ORDER BY id",
        )
        .bind(website_url)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn delete_post_recommendations(&self, website_url: &str) -> Result<u64, CoreError> {
        let result = sqlx::query("DELETE FROM reddit_post_recommendations WHERE website_url = ?")
            .bind(website_url)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_generated_posts(
        &self,
        posts: &[GeneratedPost],
    ) -> Result<Vec<GeneratedPost>, CoreError> {
        let now = Utc::now();
        let mut stored = Vec::with_capacity(posts.len());
        let mut tx = self.pool.begin().await?;
        for post in posts {
            let id = sqlx::query(
                r#"
                INSERT INTO generated_reddit_posts (
                    website_url, title, content, subreddit, image_url, created_at
                ) VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&post.website_url)
            .bind(&post.title)
            .bind(&post.content)
            .bind(&post.subreddit)
            .bind(&post.image_url)
            .bind(now)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
            stored.push(GeneratedPost {
                id: Some(id),
                ..post.clone()
            });
        }
        tx.commit().await?;
        Ok(stored)
    }

    pub async fn generated_posts(&self, website_url: &str) -> Result<Vec<GeneratedPost>, CoreError> {
        let rows: Vec<GeneratedPostRow> = sqlx::query_as(
            "SELECT id, website_url, title, content, subreddit, image_url \
             FROM generated_reddit_posts WHERE website_url = ? ORDER BY id",
        )
        .bind(website_url)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
