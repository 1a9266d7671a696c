//! Ban record repository: `banned_ips`.

use super::RepoError;
use sqlx::SqlitePool;

/// A persisted ban on a source address.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct BanRecord {
    pub id: i64,
    pub ip: String,
    pub reason: String,
    pub banned_at: i64,
    pub banned_by: String,
}

pub struct BanRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BanRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether `ip` has an active ban record.
    pub async fn is_banned(&self, ip: &str) -> Result<bool, RepoError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM banned_ips WHERE ip = ?")
            .bind(ip)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.is_some())
    }

    pub async fn get_by_ip(&self, ip: &str) -> Result<Option<BanRecord>, RepoError> {
        let record = sqlx::query_as::<_, BanRecord>(
            "SELECT id, ip, reason, banned_at, banned_by FROM banned_ips WHERE ip = ?",
        )
        .bind(ip)
        .fetch_optional(self.pool)
        .await?;
        Ok(record)
    }

    /// Insert a new ban. Returns `None` if `ip` is already banned (unique
    /// constraint conflict), letting the caller map that to a 409.
    pub async fn insert(
        &self,
        ip: &str,
        reason: &str,
        banned_at: i64,
        banned_by: &str,
    ) -> Result<Option<BanRecord>, RepoError> {
        let result = sqlx::query(
            "INSERT INTO banned_ips (ip, reason, banned_at, banned_by) VALUES (?, ?, ?, ?)",
        )
        .bind(ip)
        .bind(reason)
        .bind(banned_at)
        .bind(banned_by)
        .execute(self.pool)
        .await;

        match result {
            Ok(r) => {
                let id = r.last_insert_rowid();
                Ok(Some(BanRecord {
                    id,
                    ip: ip.to_string(),
                    reason: reason.to_string(),
                    banned_at,
                    banned_by: banned_by.to_string(),
                }))
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a ban by id. Returns `true` if a row was deleted.
    pub async fn remove(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM banned_ips WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a ban by source address, used on appeal approval.
    pub async fn remove_by_ip(&self, ip: &str) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM banned_ips WHERE ip = ?")
            .bind(ip)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&self) -> Result<Vec<BanRecord>, RepoError> {
        let records = sqlx::query_as::<_, BanRecord>(
            "SELECT id, ip, reason, banned_at, banned_by FROM banned_ips ORDER BY banned_at DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(records)
    }

    pub async fn count(&self) -> Result<i64, RepoError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM banned_ips")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
