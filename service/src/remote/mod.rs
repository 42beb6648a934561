//! Remote source adapter.
//!
//! The orchestrator only ever sees [`RemoteSource`]: a pull that always yields
//! a collection and a push that reports success. Transport failures, status
//! codes and the remote's own data shape stay behind this seam.

mod fallback;
mod http;
mod mapping;

pub use fallback::fallback_collection;
pub use http::HttpRemote;
pub use mapping::{map_remote_payload, REMOTE_CATEGORY};

use std::future::Future;

use quotesync_engine::Collection;

/// Source of the remote collection.
pub trait RemoteSource: Send + Sync + 'static {
    /// Pull the remote collection, mapped into local records.
    ///
    /// Never fails: on any transport or decoding problem the fixed
    /// [`fallback_collection`] is returned instead.
    fn fetch_remote(&self) -> impl Future<Output = Collection> + Send;

    /// Send the local collection. Returns whether the remote accepted it.
    fn push_local(&self, collection: &Collection) -> impl Future<Output = bool> + Send;
}
