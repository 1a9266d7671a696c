//! Counter snapshots: `daily_stats`, `hourly_stats`.
//!
//! Hourly and daily rows are upserted with delta increments, not read back
//! and rewritten cumulatively, so two concurrent bumps for the same row
//! can't race and drop an update.

use super::RepoError;
use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct DailyStats {
    pub date: String,
    pub message_count: i64,
    pub peak_concurrent_rooms: i64,
    pub unique_sources: i64,
}

pub struct StatsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StatsRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Bump the day's message counter by `delta`, creating the row if absent.
    pub async fn bump_daily_messages(&self, date: &str, delta: i64) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO daily_stats (date, message_count) VALUES (?, ?) \
             ON CONFLICT(date) DO UPDATE SET message_count = message_count + excluded.message_count",
        )
        .bind(date)
        .bind(delta)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Record a new peak if `rooms` exceeds the day's stored peak.
    pub async fn record_peak_rooms(&self, date: &str, rooms: i64) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO daily_stats (date, peak_concurrent_rooms) VALUES (?, ?) \
             ON CONFLICT(date) DO UPDATE SET peak_concurrent_rooms = MAX(peak_concurrent_rooms, excluded.peak_concurrent_rooms)",
        )
        .bind(date)
        .bind(rooms)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Add `delta` to the day's unique-source count. Called once per day,
    /// at rollover, with the size of that day's now-closed source set, so
    /// an additive bump is equivalent to setting the final value.
    pub async fn bump_daily_unique_sources(&self, date: &str, delta: i64) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO daily_stats (date, unique_sources) VALUES (?, ?) \
             ON CONFLICT(date) DO UPDATE SET unique_sources = unique_sources + excluded.unique_sources",
        )
        .bind(date)
        .bind(delta)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Bump one hour bucket's message counter by `delta`.
    pub async fn bump_hourly_messages(&self, hour: &str, delta: i64) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO hourly_stats (hour, message_count) VALUES (?, ?) \
             ON CONFLICT(hour) DO UPDATE SET message_count = message_count + excluded.message_count",
        )
        .bind(hour)
        .bind(delta)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_daily(&self, date: &str) -> Result<Option<DailyStats>, RepoError> {
        let row = sqlx::query_as::<_, DailyStats>(
            "SELECT date, message_count, peak_concurrent_rooms, unique_sources \
             FROM daily_stats WHERE date = ?",
        )
        .bind(date)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_hourly_count(&self, hour: &str) -> Result<i64, RepoError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT message_count FROM hourly_stats WHERE hour = ?")
                .bind(hour)
                .fetch_optional(self.pool)
                .await?;
        Ok(row.map(|(c,)| c).unwrap_or(0))
    }

    pub async fn recent_daily(&self, limit: i64) -> Result<Vec<DailyStats>, RepoError> {
        let rows = sqlx::query_as::<_, DailyStats>(
            "SELECT date, message_count, peak_concurrent_rooms, unique_sources \
             FROM daily_stats ORDER BY date DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
