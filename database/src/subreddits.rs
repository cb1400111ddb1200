use crate::{decode_list, encode_list, Database};
use blastari_core::{
    normalize_subreddit_name, CoreError, SubredditAnalytics, SubredditRecommendation,
};
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use tracing::debug;

#[derive(Debug, FromRow)]
struct SubredditRecommendationRow {
    id: i64,
    website_url: String,
    name: String,
    reason: String,
    created_at: DateTime<Utc>,
}

impl From<SubredditRecommendationRow> for SubredditRecommendation {
    fn from(row: SubredditRecommendationRow) -> Self {
        Self {
            id: Some(row.id),
            website_url: row.website_url,
            name: row.name,
            reason: row.reason,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct AnalyticsRow {
    subreddit: String,
    subscribers: i64,
    engagement_rate: f64,
    visibility_score: f64,
    active_posters: i64,
    strictness_index: f64,
    top_themes: String,
    sample_size: i64,
    updated_at: DateTime<Utc>,
}

/// Subreddit names are case-insensitive on Reddit; analytics are cached under
/// the lowercased name.
fn analytics_key(subreddit: &str) -> String {
    normalize_subreddit_name(subreddit).to_lowercase()
}

impl AnalyticsRow {
    fn into_analytics(self) -> Result<SubredditAnalytics, CoreError> {
        Ok(SubredditAnalytics {
            subreddit: self.subreddit,
            subscribers: self.subscribers.max(0) as u64,
            engagement_rate: self.engagement_rate,
            visibility_score: self.visibility_score,
            active_posters: self.active_posters.max(0) as u32,
            strictness_index: self.strictness_index,
            top_themes: decode_list("reddit_subreddit_analytics", &self.top_themes)?,
            sample_size: self.sample_size.max(0) as u32,
            updated_at: self.updated_at,
        })
    }
}

impl Database {
    /// Appends recommendations; earlier rows for the site are kept. Names are
    /// stored without any `r/` prefix and blank names are skipped.
    pub async fn append_subreddit_recommendations(
        &self,
        website_url: &str,
        entries: &[(String, String)],
    ) -> Result<Vec<SubredditRecommendation>, CoreError> {
        let now = Utc::now();
        let mut stored = Vec::with_capacity(entries.len());
        let mut tx = self.pool.begin().await?;

        for (name, reason) in entries {
            let name = normalize_subreddit_name(name);
            if name.is_empty() {
                continue;
            }
            let id = sqlx::query(
                "INSERT INTO subreddit_recommendations (website_url, name, reason, created_at) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(website_url)
            .bind(&name)
            .bind(reason)
            .bind(now)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

            stored.push(SubredditRecommendation {
                id: Some(id),
                website_url: website_url.to_string(),
                name,
                reason: reason.clone(),
                created_at: now,
            });
        }

        tx.commit().await?;
        debug!(
            "Appended {} subreddit recommendations for {}",
            stored.len(),
            website_url
        );
        Ok(stored)
    }

    pub async fn subreddit_recommendations(
        &self,
        website_url: &str,
    ) -> Result<Vec<SubredditRecommendation>, CoreError> {
        let rows: Vec<SubredditRecommendationRow> = sqlx::query_as(
            "SELECT * FROM subreddit_recommendations WHERE website_url = ? ORDER BY id",
        )
        .bind(website_url)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn upsert_subreddit_analytics(
        &self,
        analytics: &SubredditAnalytics,
    ) -> Result<(), CoreError> {
        sqlx::query(
            r#"
            INSERT INTO reddit_subreddit_analytics (
                name_key, subreddit, subscribers, engagement_rate, visibility_score,
                active_posters, strictness_index, top_themes, sample_size, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(name_key) DO UPDATE SET
                subreddit = excluded.subreddit,
                subscribers = excluded.subscribers,
                engagement_rate = excluded.engagement_rate,
                visibility_score = excluded.visibility_score,
                active_posters = excluded.active_posters,
                strictness_index = excluded.strictness_index,
                top_themes = excluded.top_themes,
                sample_size = excluded.sample_size,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(analytics_key(&analytics.subreddit))
        .bind(normalize_subreddit_name(&analytics.subreddit))
        .bind(analytics.subscribers as i64)
        .bind(analytics.engagement_rate)
        .bind(analytics.visibility_score)
        .bind(analytics.active_posters as i64)
        .bind(analytics.strictness_index)
        .bind(encode_list(&analytics.top_themes)?)
        .bind(analytics.sample_size as i64)
        .bind(analytics.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Cached analytics for `subreddit` if they were computed within
    /// `max_age` of now.
    pub async fn find_fresh_analytics(
        &self,
        subreddit: &str,
        max_age: Duration,
    ) -> Result<Option<SubredditAnalytics>, CoreError> {
        let row: Option<AnalyticsRow> =
            sqlx::query_as("SELECT * FROM reddit_subreddit_analytics WHERE name_key = ?")
                .bind(analytics_key(subreddit))
                .fetch_optional(&self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let analytics = row.into_analytics()?;
        if Utc::now() - analytics.updated_at > max_age {
            debug!("Cached analytics for r/{} are stale", subreddit);
            return Ok(None);
        }
        Ok(Some(analytics))
    }
}
