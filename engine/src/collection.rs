//! Collection - the set of quotes held by a client.
//!
//! Quotes are keyed by id, so a collection can never hold two records with
//! the same identifier. Iteration is always in ascending id order.

use crate::{error::Result, Error, IdSequence, Quote, QuoteId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Filter value that matches every category.
pub const ALL_CATEGORIES: &str = "all";

/// A set of quotes, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Quote>", try_from = "Vec<Quote>")]
pub struct Collection {
    quotes: BTreeMap<QuoteId, Quote>,
}

impl Collection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            quotes: BTreeMap::new(),
        }
    }

    /// Build a collection, rejecting duplicate ids.
    pub fn from_unique(quotes: impl IntoIterator<Item = Quote>) -> Result<Self> {
        let mut collection = Self::new();
        for quote in quotes {
            collection.insert_new(quote)?;
        }
        Ok(collection)
    }

    /// Get a quote by id.
    pub fn get(&self, id: QuoteId) -> Option<&Quote> {
        self.quotes.get(&id)
    }

    /// Check if a quote with this id exists.
    pub fn contains(&self, id: QuoteId) -> bool {
        self.quotes.contains_key(&id)
    }

    /// Insert or replace a quote, returning the previous version.
    pub fn insert(&mut self, quote: Quote) -> Option<Quote> {
        self.quotes.insert(quote.id, quote)
    }

    /// Remove a quote, returning it if it was present.
    pub fn remove(&mut self, id: QuoteId) -> Option<Quote> {
        self.quotes.remove(&id)
    }

    /// Insert a quote whose id must not be present yet.
    pub fn insert_new(&mut self, quote: Quote) -> Result<()> {
        if self.quotes.contains_key(&quote.id) {
            return Err(Error::QuoteAlreadyExists(quote.id));
        }
        self.quotes.insert(quote.id, quote);
        Ok(())
    }

    /// All quotes in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Quote> {
        self.quotes.values()
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = QuoteId> + '_ {
        self.quotes.keys().copied()
    }

    /// Number of quotes.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Clone the quotes out as an id-ordered vector.
    pub fn to_vec(&self) -> Vec<Quote> {
        self.quotes.values().cloned().collect()
    }

    /// A sequence that continues after the highest local id in this collection.
    pub fn id_sequence(&self) -> IdSequence {
        let mut seq = IdSequence::new();
        for id in self.ids() {
            seq.observe(id);
        }
        seq
    }

    /// Distinct categories in first-seen (id) order, prefixed with `"all"`.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut categories = vec![ALL_CATEGORIES.to_string()];
        for quote in self.iter() {
            if seen.insert(quote.category.as_str()) {
                categories.push(quote.category.clone());
            }
        }
        categories
    }

    /// Quotes in the given category; `None` or `"all"` returns everything.
    pub fn filtered(&self, category: Option<&str>) -> Vec<&Quote> {
        match category {
            None | Some(ALL_CATEGORIES) => self.iter().collect(),
            Some(category) => self.iter().filter(|q| q.category == category).collect(),
        }
    }

    /// Create a new local quote from user input.
    ///
    /// Text and category are trimmed; blank values are rejected and leave
    /// both the collection and the sequence untouched.
    pub fn add_quote(
        &mut self,
        ids: &mut IdSequence,
        text: &str,
        category: &str,
        now: Timestamp,
    ) -> Result<Quote> {
        let text = text.trim();
        let category = category.trim();
        if text.is_empty() {
            return Err(Error::EmptyField("text"));
        }
        if category.is_empty() {
            return Err(Error::EmptyField("category"));
        }

        let id = ids.next_id()?;
        let quote = Quote::new(id, text, category).with_updated_at(now);
        self.insert_new(quote.clone())?;
        Ok(quote)
    }
}

impl From<Collection> for Vec<Quote> {
    fn from(collection: Collection) -> Self {
        collection.quotes.into_values().collect()
    }
}

impl TryFrom<Vec<Quote>> for Collection {
    type Error = Error;

    fn try_from(quotes: Vec<Quote>) -> Result<Self> {
        Self::from_unique(quotes)
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Quote;
    type IntoIter = std::collections::btree_map::Values<'a, QuoteId, Quote>;

    fn into_iter(self) -> Self::IntoIter {
        self.quotes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::REMOTE_ID_BASE;

    fn sample() -> Collection {
        Collection::from_unique(vec![
            Quote::new(3, "Simplicity is prerequisite for reliability", "Software"),
            Quote::new(1, "The unexamined life is not worth living", "Philosophy"),
            Quote::new(2, "Talk is cheap. Show me the code", "Software"),
        ])
        .unwrap()
    }

    #[test]
    fn iteration_is_sorted_by_id() {
        let ids: Vec<_> = sample().ids().collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn remove_returns_previous() {
        let mut collection = sample();
        assert_eq!(collection.remove(2).map(|q| q.id), Some(2));
        assert_eq!(collection.remove(2), None);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn duplicates_rejected() {
        let result = Collection::from_unique(vec![Quote::new(1, "a", "b"), Quote::new(1, "c", "d")]);
        assert_eq!(result, Err(Error::QuoteAlreadyExists(1)));
    }

    #[test]
    fn categories_start_with_all() {
        assert_eq!(
            sample().categories(),
            vec!["all", "Philosophy", "Software"]
        );
        assert_eq!(Collection::new().categories(), vec!["all"]);
    }

    #[test]
    fn filter_by_category() {
        let collection = sample();
        assert_eq!(collection.filtered(None).len(), 3);
        assert_eq!(collection.filtered(Some("all")).len(), 3);
        assert_eq!(collection.filtered(Some("Software")).len(), 2);
        assert!(collection.filtered(Some("Missing")).is_empty());
    }

    #[test]
    fn add_assigns_next_local_id() {
        let mut collection = sample();
        collection.insert(Quote::new(REMOTE_ID_BASE + 1, "remote", "Server"));
        let mut ids = collection.id_sequence();

        let quote = collection
            .add_quote(&mut ids, "  New one  ", " Misc ", 1000)
            .unwrap();

        assert_eq!(quote.id, 4);
        assert_eq!(quote.text, "New one");
        assert_eq!(quote.category, "Misc");
        assert_eq!(quote.updated_at, Some(1000));
        assert_eq!(collection.len(), 5);
    }

    #[test]
    fn add_rejects_blank_input() {
        let mut collection = sample();
        let mut ids = collection.id_sequence();

        assert_eq!(
            collection.add_quote(&mut ids, " ", "Misc", 1000),
            Err(Error::EmptyField("text"))
        );
        assert_eq!(
            collection.add_quote(&mut ids, "Words", "", 1000),
            Err(Error::EmptyField("category"))
        );
        assert_eq!(collection.len(), 3);
        assert_eq!(ids.next_id(), Ok(4));
    }

    #[test]
    fn serializes_as_sorted_array() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.starts_with("[{\"id\":1,"));

        let parsed: Collection = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());

        let dup = r#"[{"id":1,"text":"a","category":"b"},{"id":1,"text":"c","category":"d"}]"#;
        assert!(serde_json::from_str::<Collection>(dup).is_err());
    }
}
