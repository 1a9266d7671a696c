//! Ban appeal repository: `ban_appeals`.

use super::RepoError;
use sqlx::SqlitePool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppealStatus {
    Pending,
    Approved,
    Rejected,
}

impl AppealStatus {
    fn as_str(&self) -> &'static str {
        match self {
            AppealStatus::Pending => "pending",
            AppealStatus::Approved => "approved",
            AppealStatus::Rejected => "rejected",
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "approved" => AppealStatus::Approved,
            "rejected" => AppealStatus::Rejected,
            _ => AppealStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Appeal {
    pub id: i64,
    pub ip: String,
    pub email: String,
    pub reason: String,
    pub status: AppealStatus,
    pub submitted_at: i64,
    pub reviewed_at: Option<i64>,
    pub reviewer: Option<String>,
    pub notes: Option<String>,
}

#[derive(sqlx::FromRow)]
struct AppealRow {
    id: i64,
    ip: String,
    email: String,
    reason: String,
    status: String,
    submitted_at: i64,
    reviewed_at: Option<i64>,
    reviewer: Option<String>,
    notes: Option<String>,
}

impl From<AppealRow> for Appeal {
    fn from(r: AppealRow) -> Self {
        Appeal {
            id: r.id,
            ip: r.ip,
            email: r.email,
            reason: r.reason,
            status: AppealStatus::parse(&r.status),
            submitted_at: r.submitted_at,
            reviewed_at: r.reviewed_at,
            reviewer: r.reviewer,
            notes: r.notes,
        }
    }
}

pub struct AppealRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AppealRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether `ip` already has a pending appeal.
    pub async fn has_pending(&self, ip: &str) -> Result<bool, RepoError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM ban_appeals WHERE ip = ? AND status = 'pending'",
        )
        .bind(ip)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// Submit a new appeal. Caller is responsible for the "one pending
    /// appeal per source" rule via [`Self::has_pending`] before calling this.
    pub async fn submit(
        &self,
        ip: &str,
        email: &str,
        reason: &str,
        submitted_at: i64,
    ) -> Result<Appeal, RepoError> {
        let result = sqlx::query(
            "INSERT INTO ban_appeals (ip, email, reason, status, submitted_at) \
             VALUES (?, ?, ?, 'pending', ?)",
        )
        .bind(ip)
        .bind(email)
        .bind(reason)
        .bind(submitted_at)
        .execute(self.pool)
        .await?;

        Ok(Appeal {
            id: result.last_insert_rowid(),
            ip: ip.to_string(),
            email: email.to_string(),
            reason: reason.to_string(),
            status: AppealStatus::Pending,
            submitted_at,
            reviewed_at: None,
            reviewer: None,
            notes: None,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Option<Appeal>, RepoError> {
        let row = sqlx::query_as::<_, AppealRow>(
            "SELECT id, ip, email, reason, status, submitted_at, reviewed_at, reviewer, notes \
             FROM ban_appeals WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Appeal::from))
    }

    pub async fn list(&self, status: Option<AppealStatus>) -> Result<Vec<Appeal>, RepoError> {
        let rows = match status {
            Some(s) => {
                sqlx::query_as::<_, AppealRow>(
                    "SELECT id, ip, email, reason, status, submitted_at, reviewed_at, reviewer, notes \
                     FROM ban_appeals WHERE status = ? ORDER BY submitted_at DESC",
                )
                .bind(s.as_str())
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, AppealRow>(
                    "SELECT id, ip, email, reason, status, submitted_at, reviewed_at, reviewer, notes \
                     FROM ban_appeals ORDER BY submitted_at DESC",
                )
                .fetch_all(self.pool)
                .await?
            }
        };
        Ok(rows.into_iter().map(Appeal::from).collect())
    }

    /// Resolve a pending appeal. Returns `false` if the appeal does not
    /// exist or is no longer pending (caller maps that to a 409).
    pub async fn resolve(
        &self,
        id: i64,
        approve: bool,
        reviewer: &str,
        notes: Option<&str>,
        reviewed_at: i64,
    ) -> Result<bool, RepoError> {
        let status = if approve {
            AppealStatus::Approved
        } else {
            AppealStatus::Rejected
        };
        let result = sqlx::query(
            "UPDATE ban_appeals SET status = ?, reviewed_at = ?, reviewer = ?, notes = ? \
             WHERE id = ? AND status = 'pending'",
        )
        .bind(status.as_str())
        .bind(reviewed_at)
        .bind(reviewer)
        .bind(notes)
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for s in [AppealStatus::Pending, AppealStatus::Approved, AppealStatus::Rejected] {
            assert_eq!(AppealStatus::parse(s.as_str()), s);
        }
    }
}
