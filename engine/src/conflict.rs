//! Conflict detection between a local collection and a remote snapshot.

use crate::{Collection, Quote, QuoteId};
use serde::{Deserialize, Serialize};

/// A detected conflict: both sides hold the id with different content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// The colliding identifier
    pub id: QuoteId,
    /// The local version
    pub local: Quote,
    /// The remote version
    pub server: Quote,
}

/// Which side of a conflict to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    /// Keep the local version
    Local,
    /// Keep the remote version
    Server,
}

/// A caller-supplied override for one conflicting id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub id: QuoteId,
    pub choice: Choice,
}

impl Resolution {
    pub fn local(id: QuoteId) -> Self {
        Self {
            id,
            choice: Choice::Local,
        }
    }

    pub fn server(id: QuoteId) -> Self {
        Self {
            id,
            choice: Choice::Server,
        }
    }
}

/// Find every id present on both sides whose text or category differ.
///
/// Ids present on only one side are new or missing items, never conflicts.
/// Output follows local iteration order (ascending id).
pub fn detect_conflicts(local: &Collection, remote: &Collection) -> Vec<Conflict> {
    local
        .iter()
        .filter_map(|mine| {
            let theirs = remote.get(mine.id)?;
            mine.content_differs(theirs).then(|| Conflict {
                id: mine.id,
                local: mine.clone(),
                server: theirs.clone(),
            })
        })
        .collect()
}
