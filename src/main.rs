//! Entry point: load configuration, open the database, wire the [`Hub`],
//! spawn background maintenance tasks, and serve `/ws` plus the admin and
//! metrics JSON surfaces on one `axum` listener.

use anonchat::clock::SystemClock;
use anonchat::config::Config;
use anonchat::db::Database;
use anonchat::hub::Hub;
use anonchat::{config, http, metrics, wire};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Resolve the configuration path from CLI arguments: `-c <path>`,
/// `--config <path>`, a bare path, or `config.toml` if nothing was given.
fn resolve_config_path() -> String {
    let mut args = std::env::args().skip(1);
    match args.next() {
        Some(flag) if flag == "-c" || flag == "--config" => args.next().unwrap_or_else(|| {
            eprintln!("Missing path after {}", flag);
            std::process::exit(1);
        }),
        Some(path) => path,
        None => "config.toml".to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = resolve_config_path();
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(config::ConfigError::Read { .. }) => {
            warn!(path = %config_path, "no config file found, using defaults");
            Config::default()
        }
        Err(err) => {
            eprintln!("ERROR: failed to load config from {}: {}", config_path, err);
            return Err(err.into());
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    match config.server.log_format {
        config::LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .json()
                .init();
        }
        config::LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .init();
        }
    }

    if let Err(errors) = config::validate(&config) {
        for err in &errors {
            error!(error = %err, "configuration validation failed");
        }
        return Err(anyhow::anyhow!(
            "configuration validation failed with {} error(s)",
            errors.len()
        ));
    }

    info!(listen_addr = %config.server.listen_addr, "starting anonchatd");

    let db = Database::new(&config.database.path).await?;
    info!(path = %config.database.path, "database ready");

    let clock = Arc::new(SystemClock);
    let hub = Hub::new(config, clock, db);

    metrics::init();

    spawn_ban_cache_sweep(hub.clone());
    spawn_rate_limit_sweep(hub.clone());
    spawn_idle_timeout_sweep(hub.clone());
    spawn_stats_rollup(hub.clone());

    let addr: SocketAddr = hub.config.server.listen_addr.parse()?;
    let app = http::router(hub);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    tokio::select! {
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
    }
}

/// Drop stale entries from the ban-gate cache so it doesn't grow with every
/// distinct source address seen.
fn spawn_ban_cache_sweep(hub: Hub) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            hub.ban_gate.prune_expired();
        }
    });
}

/// Drop expired rate-limit windows for the same reason.
fn spawn_rate_limit_sweep(hub: Hub) {
    tokio::spawn(async move {
        let max_window = hub
            .config
            .security
            .connection_rate
            .window_secs
            .max(hub.config.security.message_rate.window_secs);
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            hub.rate_limiter.prune_expired(max_window);
        }
    });
}

/// Close out paired rooms that have gone quiet past `idle_timeout_mins`,
/// notifying both sides as if their partner had disconnected.
fn spawn_idle_timeout_sweep(hub: Hub) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let timeout_ms = hub.config.session.idle_timeout_mins as i64 * 60_000;
            let now = hub.clock.now_ms();
            for room in hub.registry.snapshot_rooms() {
                if now - room.last_activity_ms() < timeout_ms {
                    continue;
                }
                for session_id in [&room.session_a, &room.session_b] {
                    if let Some(session) = hub.registry.get(session_id) {
                        session.send(wire::ServerEvent::PartnerDisconnected);
                        session.unpair();
                    }
                }
                hub.registry.remove_room(&room.id);
                if let Err(err) = hub.db.sessions().end_room(&room.id, hub.clock.now_unix()).await {
                    warn!(error = %err, room_id = %room.id, "failed to log idle room end");
                }
                info!(room_id = %room.id, "room closed for inactivity");
            }
        }
    });
}

/// Hourly: snapshot per-hour message deltas and the running peak-rooms
/// gauge into the repository, rolling daily totals over at the UTC day
/// boundary.
fn spawn_stats_rollup(hub: Hub) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;

            let now = chrono::Utc::now();
            let date = now.format("%Y-%m-%d").to_string();
            let hour = now.format("%Y-%m-%d %H:00").to_string();
            let today_epoch = now.date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp() / 86_400;

            let hourly_delta = hub.counters.take_today_message_count();
            if let Err(err) = hub.db.stats().bump_hourly_messages(&hour, hourly_delta as i64).await {
                warn!(error = %err, "failed to record hourly message count");
            }
            if let Err(err) = hub.db.stats().bump_daily_messages(&date, hourly_delta as i64).await {
                warn!(error = %err, "failed to record daily message count");
            }

            let instantaneous = hub.registry.count_rooms() as i64;
            let peak = hub.counters.take_peak_concurrent_rooms().max(instantaneous as u64) as i64;
            if let Err(err) = hub.db.stats().record_peak_rooms(&date, peak).await {
                warn!(error = %err, "failed to record peak room count");
            }

            if let Some(previous_epoch) = hub.counters.roll_day_if_needed(today_epoch) {
                let previous_date = chrono::DateTime::from_timestamp(previous_epoch * 86_400, 0)
                    .expect("day epoch in range")
                    .format("%Y-%m-%d")
                    .to_string();
                let unique_sources = hub.counters.take_unique_sources_count() as i64;
                if let Err(err) = hub
                    .db
                    .stats()
                    .bump_daily_unique_sources(&previous_date, unique_sources)
                    .await
                {
                    warn!(error = %err, "failed to record unique source count");
                }
                info!(date = %previous_date, "rolled over to a new day's counters");
            }

            metrics::ACTIVE_ROOMS.set(instantaneous);
        }
    });
}
