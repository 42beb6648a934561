//! Translation from whatever the remote returns into local quote records.

use quotesync_engine::{remote_id, Collection, Quote, QuoteId, Timestamp};
use serde::Deserialize;
use serde_json::Value;

use crate::error::TransportError;

/// Category given to remote items that carry none.
pub const REMOTE_CATEGORY: &str = "Server";

/// A remote item as far as the adapter cares.
///
/// Quote-shaped items (`text`, `category`) map directly; post-shaped items
/// (`title`, `body`, ...) use their title as the text.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteItem {
    #[serde(default)]
    id: Option<QuoteId>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    updated_at: Option<Timestamp>,
}

impl RemoteItem {
    fn into_quote(self, position: usize) -> Option<Quote> {
        let text = self
            .text
            .filter(|t| !t.trim().is_empty())
            .or(self.title)
            .filter(|t| !t.trim().is_empty())?;
        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| REMOTE_CATEGORY.to_string());
        let raw_id = self.id.unwrap_or(position as QuoteId + 1);

        Some(Quote {
            id: remote_id(raw_id),
            text,
            category,
            updated_at: self.updated_at,
        })
    }
}

/// Map a remote response body into a collection.
///
/// The body must be a JSON array. Items that are not objects or carry no
/// usable text are skipped; when two items map to the same id the first one
/// is kept.
pub fn map_remote_payload(body: &str) -> Result<Collection, TransportError> {
    let items = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => items,
        Ok(_) => return Err(TransportError::Decode("expected a JSON array".into())),
        Err(e) => return Err(TransportError::Decode(e.to_string())),
    };

    let total = items.len();
    let mut collection = Collection::new();

    for (position, value) in items.into_iter().enumerate() {
        let Ok(item) = serde_json::from_value::<RemoteItem>(value) else {
            continue;
        };
        let Some(quote) = item.into_quote(position) else {
            continue;
        };
        if !collection.contains(quote.id) {
            collection.insert(quote);
        }
    }

    if collection.len() < total {
        tracing::debug!(
            received = total,
            mapped = collection.len(),
            "Skipped unusable remote items"
        );
    }

    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotesync_engine::REMOTE_ID_BASE;

    #[test]
    fn maps_post_shaped_items() {
        let body = r#"[
            {"userId": 1, "id": 1, "title": "sunt aut facere", "body": "quia et suscipit"},
            {"userId": 1, "id": 2, "title": "qui est esse", "body": "est rerum tempore"}
        ]"#;

        let collection = map_remote_payload(body).unwrap();

        assert_eq!(collection.len(), 2);
        let first = collection.get(REMOTE_ID_BASE + 1).unwrap();
        assert_eq!(first.text, "sunt aut facere");
        assert_eq!(first.category, REMOTE_CATEGORY);
    }

    #[test]
    fn maps_quote_shaped_items() {
        let body = r#"[{"id": 3, "text": "Hello", "category": "Greeting", "updatedAt": 99}]"#;

        let collection = map_remote_payload(body).unwrap();

        assert_eq!(
            collection.get(REMOTE_ID_BASE + 3),
            Some(&Quote::new(REMOTE_ID_BASE + 3, "Hello", "Greeting").with_updated_at(99))
        );
    }

    #[test]
    fn remote_range_ids_are_kept() {
        let body = format!(r#"[{{"id": {}, "text": "Echo", "category": "X"}}]"#, REMOTE_ID_BASE + 8);
        let collection = map_remote_payload(&body).unwrap();
        assert!(collection.contains(REMOTE_ID_BASE + 8));
    }

    #[test]
    fn missing_ids_use_position() {
        let body = r#"[{"title": "first"}, {"title": "second"}]"#;
        let ids: Vec<_> = map_remote_payload(body).unwrap().ids().collect();
        assert_eq!(ids, vec![REMOTE_ID_BASE + 1, REMOTE_ID_BASE + 2]);
    }

    #[test]
    fn unusable_items_skipped() {
        let body = r#"[
            7,
            {"id": 1},
            {"id": 2, "title": "   "},
            {"id": "three", "title": "bad id"},
            {"id": 4, "title": "ok"},
            {"id": 4, "title": "duplicate"}
        ]"#;

        let collection = map_remote_payload(body).unwrap();

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get(REMOTE_ID_BASE + 4).unwrap().text, "ok");
    }

    #[test]
    fn non_array_body_is_an_error() {
        assert!(matches!(
            map_remote_payload(r#"{"error": "nope"}"#),
            Err(TransportError::Decode(_))
        ));
        assert!(matches!(
            map_remote_payload("<html>"),
            Err(TransportError::Decode(_))
        ));
    }

    #[test]
    fn empty_array_is_an_empty_collection() {
        assert!(map_remote_payload("[]").unwrap().is_empty());
    }
}
