//! Identifier assignment.
//!
//! Local ids come from a monotonic sequence that never hands out a value it
//! has already seen. Remote ids are shifted into their own range so that a
//! freshly pulled record cannot masquerade as a local one.

use crate::{error::Result, Error, QuoteId};
use serde::{Deserialize, Serialize};

/// First identifier of the range reserved for remote records (2^40).
pub const REMOTE_ID_BASE: QuoteId = 1 << 40;

/// Map a raw identifier reported by the remote into the remote range.
///
/// Ids already inside the range are kept as is, so re-pulling a record that
/// was previously mapped (or pushed back by this client) is stable.
pub fn remote_id(raw: QuoteId) -> QuoteId {
    if raw >= REMOTE_ID_BASE {
        raw
    } else {
        REMOTE_ID_BASE.saturating_add(raw.max(0))
    }
}

/// Monotonic generator for local identifiers.
///
/// Ordering rules:
/// 1. The next id is one past the highest local id observed so far
/// 2. Remote-range ids never advance the sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdSequence {
    /// Highest local id handed out or observed
    pub last: QuoteId,
}

impl IdSequence {
    /// Create a sequence whose first id is 1.
    pub fn new() -> Self {
        Self { last: 0 }
    }

    /// Create a sequence that continues after `last`.
    pub fn starting_after(last: QuoteId) -> Self {
        Self { last: last.max(0) }
    }

    /// Hand out the next local id.
    pub fn next_id(&mut self) -> Result<QuoteId> {
        let next = self.last + 1;
        if next >= REMOTE_ID_BASE {
            return Err(Error::IdsExhausted);
        }
        self.last = next;
        Ok(next)
    }

    /// Make sure future ids are greater than `id`.
    /// Used when loading or importing records that already carry ids.
    pub fn observe(&mut self, id: QuoteId) {
        if id < REMOTE_ID_BASE {
            self.last = self.last.max(id);
        }
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}
