//! Public ban-appeal submission and status check, plus the admin review
//! surface over the same table.

use super::ws::extract_source_addr;
use crate::db::{Appeal, AppealStatus};
use crate::error::AdminError;
use crate::hub::Hub;
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Deserialize)]
pub struct SubmitAppeal {
    ip: String,
    email: String,
    reason: String,
}

pub async fn submit_appeal(
    State(hub): State<Hub>,
    Json(body): Json<SubmitAppeal>,
) -> Result<Json<Appeal>, AdminError> {
    if body.email.trim().is_empty() || body.reason.trim().is_empty() {
        return Err(AdminError::Validation(
            "email and reason are required".to_string(),
        ));
    }
    if !hub.db.bans().is_banned(&body.ip).await? {
        return Err(AdminError::Conflict(format!(
            "{} has no active ban",
            body.ip
        )));
    }
    if hub.db.appeals().has_pending(&body.ip).await? {
        return Err(AdminError::Conflict(
            "a pending appeal already exists for this address".to_string(),
        ));
    }

    let now = hub.clock.now_unix();
    let appeal = hub
        .db
        .appeals()
        .submit(&body.ip, &body.email, &body.reason, now)
        .await?;
    Ok(Json(appeal))
}

#[derive(Deserialize)]
pub struct AppealQuery {
    status: Option<String>,
}

fn parse_status(raw: &str) -> Option<AppealStatus> {
    match raw {
        "pending" => Some(AppealStatus::Pending),
        "approved" => Some(AppealStatus::Approved),
        "rejected" => Some(AppealStatus::Rejected),
        _ => None,
    }
}

pub async fn list_appeals(
    State(hub): State<Hub>,
    Query(query): Query<AppealQuery>,
) -> Result<Json<Vec<Appeal>>, AdminError> {
    let status = query.status.as_deref().and_then(parse_status);
    Ok(Json(hub.db.appeals().list(status).await?))
}

#[derive(Deserialize)]
pub struct ResolveAppeal {
    status: String,
    notes: Option<String>,
}

pub async fn resolve_appeal(
    State(hub): State<Hub>,
    Path(id): Path<i64>,
    Json(body): Json<ResolveAppeal>,
) -> Result<(), AdminError> {
    let approve = match body.status.as_str() {
        "approved" => true,
        "rejected" => false,
        _ => {
            return Err(AdminError::Validation(
                "status must be 'approved' or 'rejected'".to_string(),
            ));
        }
    };

    let appeal = hub
        .db
        .appeals()
        .get(id)
        .await?
        .ok_or(AdminError::NotFound)?;

    let now = hub.clock.now_unix();
    let resolved = hub
        .db
        .appeals()
        .resolve(id, approve, "admin", body.notes.as_deref(), now)
        .await?;
    if !resolved {
        return Err(AdminError::Conflict(
            "appeal is no longer pending".to_string(),
        ));
    }

    if approve {
        hub.db.bans().remove_by_ip(&appeal.ip).await?;
        hub.ban_gate.bump_version();
    }

    Ok(())
}

#[derive(Serialize)]
pub struct CheckBan {
    banned: bool,
    ip: String,
}

pub async fn check_ban(
    State(hub): State<Hub>,
    headers: HeaderMap,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Result<Json<CheckBan>, AdminError> {
    let ip = extract_source_addr(&headers, Some(peer));
    let banned = hub.ban_gate.is_banned(&ip).await?;
    Ok(Json(CheckBan { banned, ip }))
}
