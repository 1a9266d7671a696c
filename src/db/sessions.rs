//! Append-only chat session/message log: `chat_sessions`, `chat_messages`.

use super::RepoError;
use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct RoomRecord {
    pub id: String,
    pub user1_ip: String,
    pub user2_ip: String,
    pub started_at: i64,
    pub ended_at: Option<i64>,
    pub message_count: i64,
    pub is_active: bool,
}

pub struct SessionLogRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionLogRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record the start of a paired room.
    pub async fn start_room(
        &self,
        room_id: &str,
        user1_ip: &str,
        user2_ip: &str,
        started_at: i64,
    ) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO chat_sessions (id, user1_ip, user2_ip, started_at, is_active) \
             VALUES (?, ?, ?, ?, 1)",
        )
        .bind(room_id)
        .bind(user1_ip)
        .bind(user2_ip)
        .bind(started_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Close out a room at disconnect time.
    pub async fn end_room(&self, room_id: &str, ended_at: i64) -> Result<(), RepoError> {
        sqlx::query(
            "UPDATE chat_sessions SET ended_at = ?, is_active = 0 WHERE id = ?",
        )
        .bind(ended_at)
        .bind(room_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Append one chat message to the room's log and bump its counter.
    /// `flagged` rows are retained for audit but excluded from relay by the
    /// caller, not by this repository.
    pub async fn log_message(
        &self,
        room_id: &str,
        sender_ip: &str,
        content: &str,
        sent_at: i64,
        flagged: bool,
        flag_reason: Option<&str>,
    ) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO chat_messages (session_id, sender_ip, content, sent_at, flagged, flag_reason) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(room_id)
        .bind(sender_ip)
        .bind(content)
        .bind(sent_at)
        .bind(flagged)
        .bind(flag_reason)
        .execute(self.pool)
        .await?;

        sqlx::query("UPDATE chat_sessions SET message_count = message_count + 1 WHERE id = ?")
            .bind(room_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    pub async fn get_room(&self, room_id: &str) -> Result<Option<RoomRecord>, RepoError> {
        let record = sqlx::query_as::<_, RoomRecord>(
            "SELECT id, user1_ip, user2_ip, started_at, ended_at, message_count, is_active \
             FROM chat_sessions WHERE id = ?",
        )
        .bind(room_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(record)
    }

    pub async fn list_active(&self) -> Result<Vec<RoomRecord>, RepoError> {
        let records = sqlx::query_as::<_, RoomRecord>(
            "SELECT id, user1_ip, user2_ip, started_at, ended_at, message_count, is_active \
             FROM chat_sessions WHERE is_active = 1 ORDER BY started_at DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(records)
    }

    pub async fn count_active(&self) -> Result<i64, RepoError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM chat_sessions WHERE is_active = 1")
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }
}
