//! Spins up a real `anonchat` server bound to an ephemeral loopback port,
//! backed by an in-memory database, for the test's lifetime.

#![allow(dead_code)]

use anonchat::clock::SystemClock;
use anonchat::config::Config;
use anonchat::db::Database;
use anonchat::hub::Hub;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Once;

static METRICS_INIT: Once = Once::new();

pub struct TestServer {
    pub addr: SocketAddr,
    pub hub: Hub,
}

impl TestServer {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn with a chance to tweak the default config (e.g. tighten a rate
    /// limit) before the server starts.
    pub async fn spawn_with(configure: impl FnOnce(&mut Config)) -> Self {
        METRICS_INIT.call_once(anonchat::metrics::init);

        let mut config = Config::default();
        config.server.listen_addr = "127.0.0.1:0".to_string();
        config.database.path = ":memory:".to_string();
        configure(&mut config);

        let db = Database::new(&config.database.path)
            .await
            .expect("open in-memory database");
        let clock = Arc::new(SystemClock);
        let hub = Hub::new(config, clock, db);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("read bound address");

        let app = anonchat::http::router(hub.clone());
        tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await;
        });

        Self { addr, hub }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}
