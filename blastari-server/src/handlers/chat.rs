use crate::error::{required, ApiJson, ApiResult};
use crate::prompts;
use crate::state::AppState;
use crate::website::canonical_url;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use blastari_core::{ChatChannel, ChatMessage, ChatRole, CoreError};
use llm_interface::PromptMessage;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Earlier turns replayed to the assistant.
const HISTORY_TURNS: u32 = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatRequest {
    pub website_url: String,
    pub user_message: String,
    pub campaign_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// `POST /chat-with-recommendations`. The assistant sees the site's stored
/// analysis and recommendations plus the recent conversation.
pub async fn chat_with_recommendations(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let url = canonical_url(&request.website_url)
        .map_err(|_| CoreError::invalid_input("websiteUrl is required"))?;
    let message = required("userMessage", &request.user_message)?;

    let analysis = state.db.find_website_analysis(&url).await?;
    let subreddits = state.db.subreddit_recommendations(&url).await?;
    let post_ideas = state.db.post_recommendations(&url).await?;
    let context = prompts::assistant_context(
        analysis.as_ref(),
        &subreddits,
        &post_ideas,
        request.campaign_type.as_deref(),
    );

    let history: Vec<PromptMessage> = state
        .db
        .chat_history(&url, HISTORY_TURNS)
        .await?
        .into_iter()
        .map(|turn| match turn.role {
            ChatRole::Assistant => PromptMessage::assistant(turn.content),
            ChatRole::System => PromptMessage::system(turn.content),
            ChatRole::User => PromptMessage::user(turn.content),
        })
        .collect();

    let completion = prompts::assistant_reply(&context, message).with_history(history);
    let reply = state.llm.complete(&completion).await?.trim().to_string();

    state
        .db
        .append_chat_turn(&url, ChatRole::User, message)
        .await?;
    state
        .db
        .append_chat_turn(&url, ChatRole::Assistant, &reply)
        .await?;

    Ok(Json(ChatResponse { reply }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateChannelRequest {
    pub name: String,
    pub user_id: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChannelResponse {
    pub channel: ChatChannel,
}

pub async fn create_channel(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateChannelRequest>,
) -> ApiResult<Json<ChannelResponse>> {
    let name = required("name", &request.name)?;
    let channel = state
        .db
        .create_chat_channel(
            request.user_id.as_deref(),
            name,
            request.description.as_deref(),
        )
        .await?;
    Ok(Json(ChannelResponse { channel }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChannelsResponse {
    pub channels: Vec<ChatChannel>,
}

pub async fn list_channels(
    State(state): State<AppState>,
    Query(query): Query<ChannelQuery>,
) -> ApiResult<Json<ChannelsResponse>> {
    let channels = state
        .db
        .list_chat_channels(query.user_id.as_deref())
        .await?;
    Ok(Json(ChannelsResponse { channels }))
}

pub async fn delete_channel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    if !state.db.delete_chat_channel(&id).await? {
        return Err(CoreError::not_found(format!("chat channel {id}")).into());
    }
    info!("Deleted chat channel {}", id);
    Ok(Json(json!({ "deleted": true })))
}

async fn existing_channel(state: &AppState, id: &str) -> Result<ChatChannel, CoreError> {
    state
        .db
        .get_chat_channel(id)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("chat channel {id}")))
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<ChatMessage>,
}

pub async fn channel_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessagesResponse>> {
    existing_channel(&state, &id).await?;
    let messages = state.db.chat_messages(&id).await?;
    Ok(Json(MessagesResponse { messages }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostMessageRequest {
    pub role: Option<String>,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: ChatMessage,
}

pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<PostMessageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let content = required("content", &request.content)?;
    let role = match request.role.as_deref() {
        None => ChatRole::User,
        Some(raw) => ChatRole::parse(raw)
            .ok_or_else(|| CoreError::invalid_input(format!("unknown role '{raw}'")))?,
    };
    existing_channel(&state, &id).await?;

    let message = state.db.insert_chat_message(&id, role, content).await?;
    Ok(Json(MessageResponse { message }))
}

#[derive(Debug, Serialize)]
pub struct SharedChatResponse {
    pub channel: ChatChannel,
    pub messages: Vec<ChatMessage>,
}

/// `GET /shared-chat/{id}`: read-only view of a channel.
pub async fn shared_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SharedChatResponse>> {
    let channel = existing_channel(&state, &id).await?;
    let messages = state.db.chat_messages(&id).await?;
    Ok(Json(SharedChatResponse { channel, messages }))
}
