//! Security module: connection-time ban gating, rate limiting, and content
//! moderation.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                    Security module                    │
//! ├───────────────┬───────────────────┬───────────────────┤
//! │   BanGate      │    RateLimiter    │     Moderator     │
//! │  DashMap+TTL   │  sliding window   │  spam / profanity │
//! └───────────────┴───────────────────┴───────────────────┘
//! ```

pub mod ban_gate;
pub mod moderator;
pub mod rate_limit;

pub use ban_gate::BanGate;
pub use rate_limit::{RateLimitRule, RateLimiter};
