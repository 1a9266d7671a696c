//! `GET/POST/DELETE /api/admin/...`: stats, active rooms, the waiting
//! queue, and ban CRUD.

use crate::db::BanRecord;
use crate::error::AdminError;
use crate::hub::Hub;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct AdminStats {
    active_rooms: usize,
    waiting_sessions: usize,
    total_bans: i64,
    messages_today: u64,
}

pub async fn stats(State(hub): State<Hub>) -> Result<Json<AdminStats>, AdminError> {
    let total_bans = hub.db.bans().count().await?;
    Ok(Json(AdminStats {
        active_rooms: hub.registry.count_rooms(),
        waiting_sessions: hub.matchmaker.len(),
        total_bans,
        messages_today: hub.counters.today_message_count.load(std::sync::atomic::Ordering::SeqCst),
    }))
}

#[derive(Serialize)]
pub struct ActiveRoom {
    id: String,
    source_a: String,
    source_b: String,
    started_at: i64,
    message_count: u64,
}

pub async fn active_chats(State(hub): State<Hub>) -> Json<Vec<ActiveRoom>> {
    let mut rooms: Vec<_> = hub
        .registry
        .snapshot_rooms()
        .into_iter()
        .map(|r| ActiveRoom {
            id: r.id.clone(),
            source_a: r.source_a.clone(),
            source_b: r.source_b.clone(),
            started_at: r.started_at,
            message_count: r.message_count(),
        })
        .collect();
    rooms.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    Json(rooms)
}

#[derive(Serialize)]
pub struct QueuedSession {
    id: String,
    source_addr: String,
    enqueued_at: i64,
}

/// Waiting sessions sorted oldest-enqueued first.
pub async fn queue(State(hub): State<Hub>) -> Json<Vec<QueuedSession>> {
    let entries = hub
        .matchmaker
        .snapshot()
        .into_iter()
        .map(|e| QueuedSession {
            id: e.session_id,
            source_addr: e.source_addr,
            enqueued_at: e.enqueued_at,
        })
        .collect();
    Json(entries)
}

pub async fn list_bans(State(hub): State<Hub>) -> Result<Json<Vec<BanRecord>>, AdminError> {
    Ok(Json(hub.db.bans().list().await?))
}

#[derive(Deserialize)]
pub struct CreateBan {
    ip: String,
    reason: String,
}

pub async fn create_ban(
    State(hub): State<Hub>,
    Json(body): Json<CreateBan>,
) -> Result<Json<BanRecord>, AdminError> {
    if body.ip.trim().is_empty() {
        return Err(AdminError::Validation("ip must not be empty".to_string()));
    }
    let now = hub.clock.now_unix();
    match hub
        .db
        .bans()
        .insert(&body.ip, &body.reason, now, "admin")
        .await?
    {
        Some(record) => {
            hub.ban_gate.bump_version();
            crate::metrics::BANS_ENFORCED.inc();
            Ok(Json(record))
        }
        None => Err(AdminError::Conflict(format!("{} is already banned", body.ip))),
    }
}

pub async fn delete_ban(
    State(hub): State<Hub>,
    Path(id): Path<i64>,
) -> Result<(), AdminError> {
    let removed = hub.db.bans().remove(id).await?;
    if !removed {
        return Err(AdminError::NotFound);
    }
    hub.ban_gate.bump_version();
    Ok(())
}
