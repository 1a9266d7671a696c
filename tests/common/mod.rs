//! Integration test support: spawns a real in-process server and drives it
//! with a real WebSocket client.

pub mod client;
pub mod server;

pub use client::TestClient;
pub use server::TestServer;
