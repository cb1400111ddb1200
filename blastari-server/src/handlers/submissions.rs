use crate::error::{required, ApiJson, ApiResult};
use crate::state::AppState;
use axum::{extract::State, Json};
use blastari_core::{CoreError, ErrorExt, UserAction, UserFeedback};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeedbackRequest {
    pub email: String,
    pub name: String,
    pub feedback: String,
}

fn valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

fn checked_email(raw: &str) -> Result<String, CoreError> {
    let email = raw.trim();
    if !valid_email(email) {
        return Err(CoreError::invalid_input("a valid email is required"));
    }
    Ok(email.to_string())
}

/// `POST /feedback`. The submission is stored first; a failed notification
/// is logged and does not fail the request.
pub async fn submit_feedback(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<FeedbackRequest>,
) -> ApiResult<Json<SubmissionResponse>> {
    let feedback = UserFeedback {
        email: checked_email(&request.email)?,
        name: required("name", &request.name)?.to_string(),
        feedback: required("feedback", &request.feedback)?.to_string(),
    };

    let id = state.db.insert_feedback(&feedback).await?;
    info!("Stored feedback {} from {}", id, feedback.email);

    if let Some(notifier) = &state.notifier {
        if let Err(e) = notifier.notify(&feedback).await {
            e.log_warn();
        }
    }

    Ok(Json(SubmissionResponse { success: true, id }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserActionRequest {
    pub email: String,
    pub name: Option<String>,
    pub action: String,
    pub payload: serde_json::Value,
}

/// `POST /user-actions`.
pub async fn record_user_action(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UserActionRequest>,
) -> ApiResult<Json<SubmissionResponse>> {
    let action = UserAction {
        email: checked_email(&request.email)?,
        name: request.name.filter(|n| !n.trim().is_empty()),
        action: required("action", &request.action)?.to_string(),
        payload: request.payload,
    };

    let id = state.db.insert_user_action(&action).await?;
    Ok(Json(SubmissionResponse { success: true, id }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(valid_email("ana@example.com"));
        assert!(!valid_email("ana.example.com"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("ana@localhost"));
        assert!(!valid_email("ana@example."));
    }
}
