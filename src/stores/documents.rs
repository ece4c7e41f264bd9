//! Document store: cached documents, pagination metadata from the list
//! endpoint, and the taxonomy lists served by the placeholder lookups.

use crate::http::QueryParams;
use crate::services::DocumentService;
use crate::stores::normalize::{normalize, PageMeta};
use crate::stores::{remove_by_id, shallow_merge, upsert_by_id, StoreState};
use crate::types::{ApiError, Document, Result};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use reqwest::multipart::Form;
use serde_json::Value;
use tracing::warn;

const RECENT_WINDOW_DAYS: i64 = 3;
const RECENT_LIMIT: usize = 3;

/// A taxonomy entry from the document type/status lookups.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct TaxonomyEntry {
    pub id: i64,
    pub name: String,
}

#[derive(Default)]
struct Taxonomy {
    types: Vec<TaxonomyEntry>,
    statuses: Vec<TaxonomyEntry>,
}

pub struct DocumentStore {
    service: DocumentService,
    state: Mutex<StoreState<Document>>,
    page_meta: Mutex<Option<PageMeta>>,
    taxonomy: Mutex<Taxonomy>,
}

impl DocumentStore {
    pub fn new(service: DocumentService) -> Self {
        Self {
            service,
            state: Mutex::new(StoreState::default()),
            page_meta: Mutex::new(None),
            taxonomy: Mutex::new(Taxonomy::default()),
        }
    }

    pub fn loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn documents(&self) -> Vec<Document> {
        self.state.lock().collection.clone()
    }

    /// Pagination metadata from the last list fetch, when the server sent it.
    pub fn page_meta(&self) -> Option<PageMeta> {
        self.page_meta.lock().clone()
    }

    pub fn document_types(&self) -> Vec<TaxonomyEntry> {
        self.taxonomy.lock().types.clone()
    }

    pub fn document_statuses(&self) -> Vec<TaxonomyEntry> {
        self.taxonomy.lock().statuses.clone()
    }

    // ============= Actions =============

    /// Full refresh of the document collection. Failures are absorbed into
    /// the store error and an empty sequence is returned.
    pub async fn fetch_documents(&self, params: &QueryParams) -> Vec<Document> {
        self.state.lock().begin();

        let outcome = match self.service.list(params).await {
            Ok(response) => response.into_result(),
            Err(err) => Err(err),
        };

        let mut state = self.state.lock();
        state.loading = false;
        match outcome {
            Ok(body) => {
                let normalized = normalize(&body, "documents");
                state.collection = normalized.entities;
                *self.page_meta.lock() = normalized.meta;
                state.collection.clone()
            }
            Err(err) => {
                warn!(%err, "failed to fetch documents");
                state.error = Some(err.to_string());
                Vec::new()
            }
        }
    }

    /// Fetch a single document and reconcile it into the collection.
    pub async fn fetch_document(&self, id: i64) -> Result<Document> {
        let body = self.service.get(id).await?.into_result()?;
        let document: Document =
            serde_json::from_value(body).map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        upsert_by_id(&mut self.state.lock().collection, document.clone());
        Ok(document)
    }

    /// Upload a document (multipart); the new entity is prepended.
    pub async fn upload_document(&self, form: Form) -> Result<Document> {
        let body = self.service.upload(form).await?.into_result()?;
        let document: Document =
            serde_json::from_value(body).map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        self.state.lock().collection.insert(0, document.clone());
        Ok(document)
    }

    /// Shallow-merge the server's partial response into the cached document.
    /// Returns `None` without error when the document is not cached.
    pub async fn update_document(&self, id: i64, data: &Value) -> Result<Option<Document>> {
        let patch = self.service.update(id, data).await?.into_result()?;

        let mut state = self.state.lock();
        match state.collection.iter().position(|d| d.id == id) {
            Some(index) => {
                let merged = shallow_merge(&state.collection[index], &patch)?;
                state.collection[index] = merged.clone();
                Ok(Some(merged))
            }
            None => Ok(None),
        }
    }

    pub async fn delete_document(&self, id: i64) -> Result<()> {
        self.service.delete(id).await?.into_result()?;
        remove_by_id(&mut self.state.lock().collection, id);
        Ok(())
    }

    /// Sign a document on the server, then patch only the signature
    /// sub-fields of the cached entity.
    pub async fn sign_document(&self, id: i64) -> Result<Value> {
        let body = self.service.sign(id).await?.into_result()?;

        let mut state = self.state.lock();
        if let Some(document) = state.collection.iter_mut().find(|d| d.id == id) {
            document.is_signed = true;
            document.status = Some("signed".to_string());
        }
        Ok(body)
    }

    /// Refresh the document type taxonomy (placeholder-backed).
    pub async fn fetch_document_types(&self) -> Vec<TaxonomyEntry> {
        let outcome = async {
            let body = self.service.document_types().await?.into_result()?;
            decode_taxonomy(&body, "documentTypes")
        }
        .await;

        match outcome {
            Ok(entries) => {
                self.taxonomy.lock().types = entries.clone();
                entries
            }
            Err(err) => {
                warn!(%err, "failed to fetch document types");
                Vec::new()
            }
        }
    }

    /// Refresh the document status taxonomy (placeholder-backed).
    pub async fn fetch_document_statuses(&self) -> Vec<TaxonomyEntry> {
        let outcome = async {
            let body = self.service.document_statuses().await?.into_result()?;
            decode_taxonomy(&body, "documentStatuses")
        }
        .await;

        match outcome {
            Ok(entries) => {
                self.taxonomy.lock().statuses = entries.clone();
                entries
            }
            Err(err) => {
                warn!(%err, "failed to fetch document statuses");
                Vec::new()
            }
        }
    }

    // ============= Derived Views =============

    pub fn document_by_id(&self, id: i64) -> Option<Document> {
        self.state.lock().collection.iter().find(|d| d.id == id).cloned()
    }

    /// Documents in a category; `"all"` passes the whole collection through.
    pub fn documents_by_category(&self, category: &str) -> Vec<Document> {
        let state = self.state.lock();
        if category == "all" {
            return state.collection.clone();
        }
        state
            .collection
            .iter()
            .filter(|d| d.category.as_deref() == Some(category))
            .cloned()
            .collect()
    }

    /// Documents created within the last three days, newest first, at most
    /// three entries.
    pub fn recent_documents(&self) -> Vec<Document> {
        self.recent_documents_at(Utc::now())
    }

    fn recent_documents_at(&self, now: DateTime<Utc>) -> Vec<Document> {
        let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
        let mut documents: Vec<Document> = self
            .state
            .lock()
            .collection
            .iter()
            .filter(|d| d.created_at.map(|at| at >= cutoff).unwrap_or(false))
            .cloned()
            .collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        documents.truncate(RECENT_LIMIT);
        documents
    }
}

/// Decode the named taxonomy array out of a lookup response. A missing
/// field decodes as an empty list.
fn decode_taxonomy(body: &Value, field: &str) -> Result<Vec<TaxonomyEntry>> {
    let entries = body.get(field).cloned().unwrap_or(Value::Array(Vec::new()));
    serde_json::from_value(entries).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::http::HttpClient;
    use crate::session::{MemoryStorage, SessionManager};
    use serde_json::json;
    use std::sync::Arc;

    fn store() -> DocumentStore {
        let session = SessionManager::new(Arc::new(MemoryStorage::new()));
        let http = HttpClient::new(&ClientConfig::new("http://localhost:5000/api"), session)
            .expect("client");
        DocumentStore::new(DocumentService::new(http))
    }

    fn document(id: i64, category: &str, created_at: DateTime<Utc>) -> Document {
        serde_json::from_value(json!({
            "id": id,
            "category": category,
            "created_at": created_at.to_rfc3339()
        }))
        .unwrap()
    }

    fn seed(store: &DocumentStore, documents: Vec<Document>) {
        store.state.lock().collection = documents;
    }

    #[test]
    fn test_documents_by_category_all_passthrough() {
        let store = store();
        let now = Utc::now();
        seed(
            &store,
            vec![document(1, "orders", now), document(2, "memos", now)],
        );

        assert_eq!(store.documents_by_category("all").len(), 2);
        let memos = store.documents_by_category("memos");
        assert_eq!(memos.len(), 1);
        assert_eq!(memos[0].id, 2);
    }

    #[test]
    fn test_recent_documents_window_sort_and_truncation() {
        let store = store();
        let now = Utc::now();
        seed(
            &store,
            vec![
                document(1, "orders", now - Duration::days(1)),
                document(2, "orders", now - Duration::hours(2)),
                document(3, "orders", now - Duration::days(2)),
                document(4, "orders", now - Duration::hours(30)),
                // Outside the three-day window.
                document(5, "orders", now - Duration::days(10)),
            ],
        );

        let recent = store.recent_documents();
        assert_eq!(recent.len(), 3);
        let ids: Vec<i64> = recent.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![2, 1, 4]);
    }

    #[test]
    fn test_decode_taxonomy_reads_only_the_named_field() {
        let body = json!({
            "documentTypes": [{ "id": 1, "name": "Order" }],
            "documentStatuses": [{ "id": 1, "name": "Draft" }, { "id": 2, "name": "Signed" }]
        });

        let types = decode_taxonomy(&body, "documentTypes").unwrap();
        assert_eq!(types, vec![TaxonomyEntry { id: 1, name: "Order".to_string() }]);

        let statuses = decode_taxonomy(&body, "documentStatuses").unwrap();
        assert_eq!(statuses.len(), 2);

        // Absent field decodes as empty rather than erroring.
        assert!(decode_taxonomy(&body, "documentCategories").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_taxonomy_placeholders_resolve_without_network() {
        let store = store();

        let types = store.fetch_document_types().await;
        assert_eq!(types.len(), 5);
        assert_eq!(types[0].name, "Order");
        assert_eq!(store.document_types(), types);

        let statuses = store.fetch_document_statuses().await;
        assert_eq!(statuses.len(), 5);
        assert_eq!(statuses[4].name, "Signed");
    }
}
