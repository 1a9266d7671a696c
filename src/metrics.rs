//! Prometheus metrics for anonchat.
//!
//! Exposed on `/metrics` alongside the `/ws` and admin JSON routes on the
//! same `axum` server.

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref MESSAGES_RELAYED: IntCounter = IntCounter::new(
        "chat_messages_relayed_total",
        "Total chat messages relayed to a partner"
    ).unwrap();

    pub static ref MESSAGES_FLAGGED: IntCounter = IntCounter::new(
        "chat_messages_flagged_total",
        "Total messages flagged by the moderator and not relayed"
    ).unwrap();

    pub static ref ROOMS_PAIRED: IntCounter = IntCounter::new(
        "chat_rooms_paired_total",
        "Total rooms created by the matchmaker"
    ).unwrap();

    pub static ref BANS_ENFORCED: IntCounter = IntCounter::new(
        "chat_bans_enforced_total",
        "Total connections rejected by the ban gate"
    ).unwrap();

    pub static ref RATE_LIMIT_HITS: IntCounter = IntCounter::new(
        "chat_rate_limit_hits_total",
        "Total actions refused by the rate limiter"
    ).unwrap();

    pub static ref ACTIVE_ROOMS: IntGauge = IntGauge::new(
        "chat_active_rooms",
        "Currently active paired rooms"
    ).unwrap();

    pub static ref WAITING_SESSIONS: IntGauge = IntGauge::new(
        "chat_waiting_sessions",
        "Sessions currently queued for pairing"
    ).unwrap();
}

/// Register every metric with [`REGISTRY`]. Must run once at startup
/// before any metric is recorded.
pub fn init() {
    REGISTRY.register(Box::new(MESSAGES_RELAYED.clone())).unwrap();
    REGISTRY.register(Box::new(MESSAGES_FLAGGED.clone())).unwrap();
    REGISTRY.register(Box::new(ROOMS_PAIRED.clone())).unwrap();
    REGISTRY.register(Box::new(BANS_ENFORCED.clone())).unwrap();
    REGISTRY.register(Box::new(RATE_LIMIT_HITS.clone())).unwrap();
    REGISTRY.register(Box::new(ACTIVE_ROOMS.clone())).unwrap();
    REGISTRY.register(Box::new(WAITING_SESSIONS.clone())).unwrap();
}

/// Encode the current metric snapshot in Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
