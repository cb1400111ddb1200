use crate::{decode_list, encode_list, Database};
use blastari_core::{CampaignRecommendation, CoreError, WebsiteAnalysis};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::debug;

#[derive(Debug, FromRow)]
struct WebsiteAnalysisRow {
    id: i64,
    url: String,
    product_overview: String,
    value_proposition: String,
    audience_segments: String,
    goals: String,
    budget: String,
    tone: String,
    created_at: DateTime<Utc>,
}

impl WebsiteAnalysisRow {
    fn into_analysis(self) -> Result<WebsiteAnalysis, CoreError> {
        Ok(WebsiteAnalysis {
            id: Some(self.id),
            url: self.url,
            product_overview: self.product_overview,
            value_proposition: self.value_proposition,
            audience_segments: decode_list("website_analyses", &self.audience_segments)?,
            goals: decode_list("website_analyses", &self.goals)?,
            budget: self.budget,
            tone: self.tone,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct CampaignRow {
    id: i64,
    website_url: String,
    title: String,
    platform: String,
    description: String,
    insights: String,
    roi: String,
    difficulty: String,
    budget: String,
}

impl CampaignRow {
    fn into_campaign(self) -> Result<CampaignRecommendation, CoreError> {
        Ok(CampaignRecommendation {
            id: Some(self.id),
            website_url: self.website_url,
            title: self.title,
            platform: self.platform,
            description: self.description,
            insights: decode_list("campaign_recommendations", &self.insights)?,
            roi: self.roi,
            difficulty: self.difficulty,
            budget: self.budget,
        })
    }
}

impl Database {
    pub async fn find_website_analysis(
        &self,
        url: &str,
    ) -> Result<Option<WebsiteAnalysis>, CoreError> {
        let row: Option<WebsiteAnalysisRow> =
            sqlx::query_as("SELECT * FROM website_analyses WHERE url = ?")
                .bind(url)
                .fetch_optional(&self.pool)
                .await?;
        row.map(WebsiteAnalysisRow::into_analysis).transpose()
    }

    /// Stores the analysis, keeping the first one if the URL was analyzed
    /// concurrently. Returns the stored row.
    pub async fn insert_website_analysis(
        &self,
        analysis: &WebsiteAnalysis,
    ) -> Result<WebsiteAnalysis, CoreError> {
        sqlx::query(
            r#"
            INSERT INTO website_analyses (
                url, product_overview, value_proposition, audience_segments,
                goals, budget, tone, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(url) DO NOTHING
            "#,
        )
        .bind(&analysis.url)
        .bind(&analysis.product_overview)
        .bind(&analysis.value_proposition)
        .bind(encode_list(&analysis.audience_segments)?)
        .bind(encode_list(&analysis.goals)?)
        .bind(&analysis.budget)
        .bind(&analysis.tone)
        .bind(analysis.created_at)
        .execute(&self.pool)
        .await?;

        debug!("Stored website analysis for {}", analysis.url);
        self.find_website_analysis(&analysis.url)
            .await?
            .ok_or_else(|| CoreError::Internal {
                message: format!("analysis for {} vanished after insert", analysis.url),
            })
    }

    pub async fn count_website_analyses(&self, url: &str) -> Result<i64, CoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM website_analyses WHERE url = ?")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn insert_campaigns(
        &self,
        campaigns: &[CampaignRecommendation],
    ) -> Result<(), CoreError> {
        let mut tx = self.pool.begin().await?;
        for campaign in campaigns {
            sqlx::query(
                r#"
                INSERT INTO campaign_recommendations (
                    website_url, title, platform, description, insights, roi, difficulty, budget
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&campaign.website_url)
            .bind(&campaign.title)
            .bind(&campaign.platform)
            .bind(&campaign.description)
            .bind(encode_list(&campaign.insights)?)
            .bind(&campaign.roi)
            .bind(&campaign.difficulty)
            .bind(&campaign.budget)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn campaigns_for(
        &self,
        website_url: &str,
    ) -> Result<Vec<CampaignRecommendation>, CoreError> {
        let rows: Vec<CampaignRow> = sqlx::query_as(
            "SELECT * FROM campaign_recommendations WHERE website_url = ? ORDER BY id",
        )
        .bind(website_url)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(CampaignRow::into_campaign).collect()
    }
}
