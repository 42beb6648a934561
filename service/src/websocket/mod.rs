//! WebSocket channel to the UI.
//!
//! Connected clients receive sync results as they happen (including the
//! periodic runs they did not trigger) and can trigger syncs and resolve
//! conflicts over the same socket.

mod manager;
mod protocol;

pub use manager::{ConnectionManager, MessageSender};
pub use protocol::*;
