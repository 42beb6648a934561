//! Quote records.

use crate::{error::Result, Error, QuoteId, Timestamp, REMOTE_ID_BASE};
use serde::{Deserialize, Serialize};

/// A single quote in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Stable identifier, never reused
    pub id: QuoteId,
    /// The quote itself
    pub text: String,
    /// Free-form category used for filtering
    pub category: String,
    /// Last modification time (milliseconds since epoch), if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Quote {
    /// Create a quote without a modification time.
    pub fn new(id: QuoteId, text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            category: category.into(),
            updated_at: None,
        }
    }

    /// Set the modification time.
    pub fn with_updated_at(mut self, timestamp: Timestamp) -> Self {
        self.updated_at = Some(timestamp);
        self
    }

    /// Check the structural requirements: non-blank text and category.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::EmptyField("text"));
        }
        if self.category.trim().is_empty() {
            return Err(Error::EmptyField("category"));
        }
        Ok(())
    }

    /// Whether two versions of a record disagree on content.
    ///
    /// Only `text` and `category` count; `updated_at` is bookkeeping.
    pub fn content_differs(&self, other: &Quote) -> bool {
        self.text != other.text || self.category != other.category
    }

    /// Whether the id lies in the range reserved for remote records.
    pub fn is_remote(&self) -> bool {
        self.id >= REMOTE_ID_BASE
    }
}
