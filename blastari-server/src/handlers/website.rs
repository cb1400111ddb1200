use crate::error::{ApiJson, ApiResult};
use crate::payloads::WebsiteAnalysisPayload;
use crate::prompts;
use crate::state::AppState;
use crate::website::{canonical_url, ensure_analyzable};
use axum::{extract::State, Json};
use blastari_core::{CampaignRecommendation, WebsiteAnalysis};
use llm_interface::parse_or_fallback;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzeWebsiteRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeWebsiteResponse {
    pub analysis: WebsiteAnalysis,
    pub campaigns: Vec<CampaignRecommendation>,
    pub cached: bool,
}

/// `POST /analyze-website`. A site is analyzed once; later calls return the
/// stored analysis.
pub async fn analyze_website(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AnalyzeWebsiteRequest>,
) -> ApiResult<Json<AnalyzeWebsiteResponse>> {
    let url = canonical_url(&request.url)?;

    if let Some(analysis) = state.db.find_website_analysis(&url).await? {
        info!("Serving stored analysis for {}", url);
        let campaigns = state.db.campaigns_for(&url).await?;
        return Ok(Json(AnalyzeWebsiteResponse {
            analysis,
            campaigns,
            cached: true,
        }));
    }

    let page_text = state.fetcher.fetch_text(&url).await?;
    ensure_analyzable(&page_text)?;

    let raw = state
        .llm
        .complete(&prompts::website_analysis(&url, &page_text))
        .await?;
    let payload = parse_or_fallback(&raw, || WebsiteAnalysisPayload::fallback(&url)).into_inner();
    let (analysis, campaigns) = payload.into_records(&url);

    let analysis = state.db.insert_website_analysis(&analysis).await?;
    // A concurrent request may have stored campaigns for the same site.
    if state.db.campaigns_for(&url).await?.is_empty() {
        state.db.insert_campaigns(&campaigns).await?;
    }
    let campaigns = state.db.campaigns_for(&url).await?;

    info!(
        "Analyzed {} with {} campaign recommendations",
        url,
        campaigns.len()
    );
    Ok(Json(AnalyzeWebsiteResponse {
        analysis,
        campaigns,
        cached: false,
    }))
}
