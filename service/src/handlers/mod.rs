//! Request handlers shared by the HTTP routes and the WebSocket channel.

mod quotes;
mod sync;
mod websocket;

pub use quotes::*;
pub use sync::*;
pub use websocket::*;
