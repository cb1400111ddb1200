use crate::Database;
use blastari_core::{ChatChannel, ChatMessage, ChatRole, ChatTurn, CoreError, DatabaseError};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct ChannelRow {
    id: String,
    user_id: Option<String>,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ChannelRow> for ChatChannel {
    fn from(row: ChannelRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MessageRow {
    id: i64,
    channel_id: String,
    role: String,
    content: String,
    timestamp: DateTime<Utc>,
}

fn parse_role(table: &str, raw: &str) -> Result<ChatRole, CoreError> {
    ChatRole::parse(raw).ok_or_else(|| {
        CoreError::Database(DatabaseError::CorruptRow {
            table: table.to_string(),
            details: format!("unknown chat role '{raw}'"),
        })
    })
}

impl MessageRow {
    fn into_message(self) -> Result<ChatMessage, CoreError> {
        Ok(ChatMessage {
            id: Some(self.id),
            role: parse_role("chat_messages", &self.role)?,
            channel_id: self.channel_id,
            content: self.content,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Debug, FromRow)]
struct HistoryRow {
    role: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl Database {
    pub async fn create_chat_channel(
        &self,
        user_id: Option<&str>,
        name: &str,
        description: Option<&str>,
    ) -> Result<ChatChannel, CoreError> {
        let channel = ChatChannel {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.map(str::to_string),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO user_chat_channels (id, user_id, name, description, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&channel.id)
        .bind(&channel.user_id)
        .bind(&channel.name)
        .bind(&channel.description)
        .bind(channel.created_at)
        .execute(&self.pool)
        .await?;

        info!("Created chat channel {}", channel.id);
        Ok(channel)
    }

    pub async fn list_chat_channels(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<ChatChannel>, CoreError> {
        let rows: Vec<ChannelRow> = match user_id {
            Some(user_id) => {
                sqlx::query_as(
                    "SELECT * FROM user_chat_channels WHERE user_id = ? ORDER BY created_at DESC",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM user_chat_channels ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_chat_channel(&self, id: &str) -> Result<Option<ChatChannel>, CoreError> {
        let row: Option<ChannelRow> = sqlx::query_as("SELECT * FROM user_chat_channels WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Deletes the channel and its messages. Returns false if no such channel.
    pub async fn delete_chat_channel(&self, id: &str) -> Result<bool, CoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM chat_messages WHERE channel_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM user_chat_channels WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted > 0)
    }

    pub async fn insert_chat_message(
        &self,
        channel_id: &str,
        role: ChatRole,
        content: &str,
    ) -> Result<ChatMessage, CoreError> {
        let timestamp = Utc::now();
        let id = sqlx::query(
            "INSERT INTO chat_messages (channel_id, role, content, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind(channel_id)
        .bind(role.as_str())
        .bind(content)
        .bind(timestamp)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(ChatMessage {
            id: Some(id),
            channel_id: channel_id.to_string(),
            role,
            content: content.to_string(),
            timestamp,
        })
    }

    pub async fn chat_messages(&self, channel_id: &str) -> Result<Vec<ChatMessage>, CoreError> {
        let rows: Vec<MessageRow> =
            sqlx::query_as("SELECT * FROM chat_messages WHERE channel_id = ? ORDER BY id")
                .bind(channel_id)
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(MessageRow::into_message).collect()
    }

    pub async fn append_chat_turn(
        &self,
        website_url: &str,
        role: ChatRole,
        content: &str,
    ) -> Result<(), CoreError> {
        sqlx::query(
            "INSERT INTO user_chat_history (website_url, role, content, created_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(website_url)
        .bind(role.as_str())
        .bind(content)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The most recent `limit` turns for a site, oldest first.
    pub async fn chat_history(
        &self,
        website_url: &str,
        limit: u32,
    ) -> Result<Vec<ChatTurn>, CoreError> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            "SELECT role, content, created_at FROM user_chat_history \
             WHERE website_url = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(website_url)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .rev()
            .map(|row| {
                Ok(ChatTurn {
                    role: parse_role("user_chat_history", &row.role)?,
                    content: row.content,
                    created_at: row.created_at,
                })
            })
            .collect()
    }
}
