//! HTTP surface: the `/ws` realtime upgrade, the admin JSON API, the public
//! appeal endpoints, and `/metrics`, all on one `axum` router.

mod admin;
mod appeals;
mod ws;

use crate::hub::Hub;
use axum::Router;
use axum::routing::{delete, get, patch, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router(hub: Hub) -> Router {
    Router::new()
        .route("/ws", get(ws::upgrade))
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/chats", get(admin::active_chats))
        .route("/api/admin/queue", get(admin::queue))
        .route(
            "/api/admin/bans",
            get(admin::list_bans).post(admin::create_ban),
        )
        .route("/api/admin/bans/:id", delete(admin::delete_ban))
        .route("/api/admin/appeals", get(appeals::list_appeals))
        .route("/api/admin/appeals/:id", patch(appeals::resolve_appeal))
        .route("/api/appeals", post(appeals::submit_appeal))
        .route("/api/check-ban", get(appeals::check_ban))
        .route("/metrics", get(metrics_endpoint))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(hub)
}

async fn metrics_endpoint() -> String {
    crate::metrics::gather_metrics()
}
