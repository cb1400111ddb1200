use crate::Database;
use blastari_core::{CoreError, UserAction, UserFeedback};
use chrono::Utc;

impl Database {
    pub async fn insert_feedback(&self, feedback: &UserFeedback) -> Result<i64, CoreError> {
        let id = sqlx::query(
            "INSERT INTO user_feedback (email, name, feedback, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&feedback.email)
        .bind(&feedback.name)
        .bind(&feedback.feedback)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn insert_user_action(&self, action: &UserAction) -> Result<i64, CoreError> {
        let id = sqlx::query(
            "INSERT INTO user_actions (email, name, action, payload, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&action.email)
        .bind(&action.name)
        .bind(&action.action)
        .bind(serde_json::to_string(&action.payload)?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn count_feedback(&self) -> Result<i64, CoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_feedback")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
