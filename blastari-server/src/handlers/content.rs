use crate::error::{required, ApiJson, ApiResult};
use crate::prompts;
use crate::state::AppState;
use axum::{extract::State, Json};
use blastari_core::CoreError;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Image,
    Video,
    Text,
}

impl ContentType {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "image" => Some(ContentType::Image),
            "video" => Some(ContentType::Video),
            "text" => Some(ContentType::Text),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateContentRequest {
    #[serde(rename = "type")]
    pub content_type: String,
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateContentResponse {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub content: String,
}

/// `POST /generate-content`. Images come back as a URL, video as a script.
pub async fn generate_content(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GenerateContentRequest>,
) -> ApiResult<Json<GenerateContentResponse>> {
    let content_type = ContentType::parse(&request.content_type).ok_or_else(|| {
        CoreError::invalid_input(format!(
            "type must be one of image, video, text (got '{}')",
            request.content_type
        ))
    })?;
    let prompt = required("prompt", &request.prompt)?;

    let content = match content_type {
        ContentType::Image => state.llm.generate_image(prompt).await?,
        ContentType::Video => state.llm.complete(&prompts::video_script(prompt)).await?,
        ContentType::Text => state.llm.complete(&prompts::text_content(prompt)).await?,
    };

    info!("Generated {:?} content ({} chars)", content_type, content.len());
    Ok(Json(GenerateContentResponse {
        content_type,
        content,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_parsing() {
        assert_eq!(ContentType::parse("Image"), Some(ContentType::Image));
        assert_eq!(ContentType::parse(" video "), Some(ContentType::Video));
        assert_eq!(ContentType::parse("text"), Some(ContentType::Text));
        assert_eq!(ContentType::parse("audio"), None);
    }
}
