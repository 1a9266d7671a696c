//! Per-session frame handling: the dispatcher that drives the session state
//! machine and the individual event handlers it calls into.

mod disconnect;
mod media;
mod message;
mod router;
mod typing;

pub use disconnect::handle_channel_close;
pub use router::dispatch;
