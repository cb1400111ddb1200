use crate::handlers::{analytics, chat, content, health, posts, submissions, subreddits, website};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Builds the service router: AI workflow routes, chat channel storage,
/// form submissions and a health probe.
pub fn router(state: AppState) -> Router {
    let workflow_routes = Router::new()
        .route("/analyze-website", post(website::analyze_website))
        .route("/analyze-subreddits", post(subreddits::analyze_subreddits))
        .route("/reddit-analytics", post(analytics::reddit_analytics))
        .route(
            "/subreddit-deep-analytics",
            post(analytics::subreddit_deep_analytics),
        )
        .route("/fetch-reddit-posts", post(posts::fetch_reddit_posts))
        .route("/generate-reddit-posts", post(posts::generate_reddit_posts))
        .route(
            "/generate-reddit-post-recommendations",
            post(posts::generate_post_recommendations),
        )
        .route("/generate-content", post(content::generate_content))
        .route(
            "/chat-with-recommendations",
            post(chat::chat_with_recommendations),
        );

    let storage_routes = Router::new()
        .route(
            "/chat-channels",
            post(chat::create_channel).get(chat::list_channels),
        )
        .route("/chat-channels/{id}", delete(chat::delete_channel))
        .route(
            "/chat-channels/{id}/messages",
            get(chat::channel_messages).post(chat::post_message),
        )
        .route("/shared-chat/{id}", get(chat::shared_chat))
        .route("/feedback", post(submissions::submit_feedback))
        .route("/user-actions", post(submissions::record_user_action))
        .route("/health", get(health::health));

    Router::new()
        .merge(workflow_routes)
        .merge(storage_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
