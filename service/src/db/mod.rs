//! Key-value persistence for the local store.

mod kv;
mod memory;
mod pool;

pub use kv::*;
pub use memory::*;
pub use pool::*;
