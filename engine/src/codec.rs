//! JSON encoding of collections for storage, export and import.
//!
//! The format is a plain array of `{id, text, category, updatedAt?}` objects
//! in ascending id order. Decoding is lenient at the record level: one bad
//! entry never spoils the rest of the payload.

use crate::{error::Result, Collection, Error, IdSequence, Quote, QuoteId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Records added to the collection
    pub added: usize,
    /// Records rejected as malformed or already present
    pub skipped: usize,
}

/// Loosely-typed record as found in stored or imported JSON.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuote {
    #[serde(default)]
    id: Option<QuoteId>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    updated_at: Option<Timestamp>,
}

impl RawQuote {
    fn parse(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidRecord("expected an object".into()));
        }
        serde_json::from_value(value).map_err(|e| Error::InvalidRecord(e.to_string()))
    }

    /// Validate the fields, then build a quote with the id from `assign`.
    ///
    /// `assign` only runs for records that are otherwise valid, so a rejected
    /// entry never consumes an id.
    fn into_quote(self, assign: impl FnOnce() -> Result<QuoteId>) -> Result<Quote> {
        let text = self.text.ok_or(Error::MissingRequiredField("text"))?;
        let category = self.category.ok_or(Error::MissingRequiredField("category"))?;
        let mut quote = Quote {
            id: 0,
            text,
            category,
            updated_at: self.updated_at,
        };
        quote.validate()?;

        quote.id = assign()?;
        if quote.id < 1 {
            return Err(Error::InvalidRecord(format!(
                "id must be positive, got {}",
                quote.id
            )));
        }
        Ok(quote)
    }
}

/// Split a payload into its top-level array entries.
fn entries(text: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(Error::MalformedImport("expected a JSON array".into())),
        Err(e) => Err(Error::MalformedImport(e.to_string())),
    }
}

/// Serialize a collection as the pretty-printed export format.
pub fn export_json(collection: &Collection) -> Result<String> {
    serde_json::to_string_pretty(collection).map_err(|e| Error::Serialization(e.to_string()))
}

/// Serialize a collection compactly for storage.
pub fn encode(collection: &Collection) -> Result<String> {
    serde_json::to_string(collection).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode a stored collection.
///
/// Structurally invalid entries are dropped and a repeated id keeps its first
/// occurrence. Returns `None` when the payload is not an array or holds no
/// valid record, so the caller can fall back to its defaults.
pub fn decode_stored(text: &str) -> Option<Collection> {
    let mut collection = Collection::new();
    for value in entries(text).ok()? {
        let Ok(raw) = RawQuote::parse(value) else {
            continue;
        };
        let Some(id) = raw.id else {
            continue;
        };
        if collection.contains(id) {
            continue;
        }
        if let Ok(quote) = raw.into_quote(|| Ok(id)) {
            collection.insert(quote);
        }
    }
    (!collection.is_empty()).then_some(collection)
}

/// Import records into `target`.
///
/// The payload must be a JSON array; anything else is rejected outright.
/// Each entry is then judged on its own: valid records are added, records
/// that are malformed or whose id is already taken are skipped. Entries
/// without an id get the next local id from `ids`.
pub fn import_json(target: &mut Collection, ids: &mut IdSequence, text: &str) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for value in entries(text)? {
        let outcome = RawQuote::parse(value).and_then(|raw| {
            let quote = match raw.id {
                Some(id) => raw.into_quote(|| Ok(id))?,
                None => raw.into_quote(|| ids.next_id())?,
            };
            ids.observe(quote.id);
            target.insert_new(quote)
        });

        match outcome {
            Ok(()) => report.added += 1,
            Err(_) => report.skipped += 1,
        }
    }

    Ok(report)
}
