//! Collection handlers: list, add, import, export, clear.

use quotesync_engine::{ImportReport, Quote, ALL_CATEGORIES};
use serde::{Deserialize, Serialize};

use crate::db::KeyValueStore;
use crate::error::Result;
use crate::remote::RemoteSource;
use crate::sync::SyncOrchestrator;

/// Query parameters for listing quotes.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Category to show; `"all"` shows everything. When absent the last
    /// selected category is used.
    pub category: Option<String>,
}

/// Response for a quote listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    /// The category the listing is filtered by
    pub category: String,
    pub quotes: Vec<Quote>,
}

/// Request to add a quote.
#[derive(Debug, Deserialize)]
pub struct AddQuoteRequest {
    pub text: String,
    pub category: String,
}

/// Response for the category listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

/// List quotes, remembering an explicitly chosen category.
pub async fn handle_list<R: RemoteSource, K: KeyValueStore>(
    orchestrator: &SyncOrchestrator<R, K>,
    query: ListQuery,
) -> ListResponse {
    let category = match query.category {
        Some(category) => {
            orchestrator.set_filter(&category).await;
            category
        }
        None => orchestrator
            .last_filter()
            .await
            .unwrap_or_else(|| ALL_CATEGORIES.to_string()),
    };

    let quotes = orchestrator.quotes(Some(&category)).await;
    tracing::debug!(category = %category, count = quotes.len(), "Listing quotes");

    ListResponse { category, quotes }
}

pub async fn handle_add<R: RemoteSource, K: KeyValueStore>(
    orchestrator: &SyncOrchestrator<R, K>,
    request: AddQuoteRequest,
) -> Result<Quote> {
    Ok(orchestrator
        .add_local_quote(&request.text, &request.category)
        .await?)
}

pub async fn handle_import<R: RemoteSource, K: KeyValueStore>(
    orchestrator: &SyncOrchestrator<R, K>,
    body: &str,
) -> Result<ImportReport> {
    Ok(orchestrator.import_collection(body).await?)
}

pub async fn handle_export<R: RemoteSource, K: KeyValueStore>(
    orchestrator: &SyncOrchestrator<R, K>,
) -> Result<String> {
    Ok(orchestrator.export_collection().await?)
}

pub async fn handle_categories<R: RemoteSource, K: KeyValueStore>(
    orchestrator: &SyncOrchestrator<R, K>,
) -> CategoriesResponse {
    CategoriesResponse {
        categories: orchestrator.categories().await,
    }
}

/// Reset to the default collection and return it.
pub async fn handle_clear<R: RemoteSource, K: KeyValueStore>(
    orchestrator: &SyncOrchestrator<R, K>,
) -> Vec<Quote> {
    orchestrator.clear().await.to_vec()
}
