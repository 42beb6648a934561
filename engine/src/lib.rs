//! # Quote Sync Engine
//!
//! Deterministic reconciliation of a local quote collection against a
//! snapshot pulled from a remote endpoint.
//!
//! This crate holds the part of the quote generator with real invariants:
//! conflict detection, the merge policies, identifier assignment and the
//! import/export format. Everything here is a pure function of its inputs.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine knows nothing about storage, network or timers
//! - **Deterministic**: same inputs always produce the same collection
//! - **Unique by id**: a merge never yields two records with one identifier
//!
//! ## Core Concepts
//!
//! ### Quotes and collections
//!
//! A [`Quote`] is `{id, text, category, updatedAt?}`. A [`Collection`] is a
//! set of quotes keyed by id and always iterated in ascending id order.
//!
//! ### Identifier ranges
//!
//! Local ids live below [`REMOTE_ID_BASE`]; records pulled from the remote are
//! mapped at or above it with [`ids::remote_id`], so a local record can only
//! collide with a remote one that was previously merged in.
//!
//! ### Conflicts and merging
//!
//! [`detect_conflicts`] pairs same-id records whose text or category differ.
//! [`merge_server_wins`] applies the default policy; [`merge_with_resolutions`]
//! applies per-id [`Resolution`]s on top of it.
//!
//! ## Quick Start
//!
//! ```rust
//! use quotesync_engine::{detect_conflicts, merge_server_wins, Collection, Quote};
//!
//! let local = Collection::from_unique(vec![Quote::new(1, "A", "X")]).unwrap();
//! let remote = Collection::from_unique(vec![Quote::new(1, "B", "X")]).unwrap();
//!
//! let conflicts = detect_conflicts(&local, &remote);
//! assert_eq!(conflicts.len(), 1);
//!
//! let merged = merge_server_wins(&local, &remote).unwrap();
//! assert_eq!(merged.get(1).unwrap().text, "B");
//! ```
//!
//! ## Persistence
//!
//! [`codec`] turns collections into the JSON array used both for local
//! storage and for the export file, and parses it back with the
//! partial-success rules used by import.

pub mod codec;
pub mod collection;
pub mod conflict;
pub mod error;
pub mod ids;
pub mod merge;
pub mod quote;

// Re-export main types at crate root
pub use codec::{decode_stored, encode, export_json, import_json, ImportReport};
pub use collection::{Collection, ALL_CATEGORIES};
pub use conflict::{detect_conflicts, Choice, Conflict, Resolution};
pub use error::Error;
pub use ids::{remote_id, IdSequence, REMOTE_ID_BASE};
pub use merge::{merge_server_wins, merge_with_resolutions};
pub use quote::Quote;

/// Type aliases for clarity
pub type QuoteId = i64;
/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;
