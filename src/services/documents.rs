//! Document endpoints under `/documents/*`.
//!
//! Upload is multipart rather than JSON. The taxonomy lookups
//! (`document_types`, `document_statuses`) have no backend route yet and
//! answer with a fixed local payload; when the backend grows the endpoints,
//! swapping the bodies for real calls changes nothing for callers.

use crate::http::{ApiResponse, HttpClient, QueryParams};
use crate::types::Result;
use reqwest::multipart::Form;
use serde_json::{json, Value};
use tracing::debug;

#[derive(Clone)]
pub struct DocumentService {
    http: HttpClient,
}

impl DocumentService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, params: &QueryParams) -> Result<ApiResponse> {
        self.http.get("/documents/", params).await
    }

    pub async fn get(&self, id: i64) -> Result<ApiResponse> {
        self.http.get(&format!("/documents/{id}/"), &Vec::new()).await
    }

    pub async fn upload(&self, form: Form) -> Result<ApiResponse> {
        self.http.post_multipart("/documents/", form).await
    }

    pub async fn update(&self, id: i64, data: &Value) -> Result<ApiResponse> {
        self.http.put(&format!("/documents/{id}/"), data).await
    }

    pub async fn delete(&self, id: i64) -> Result<ApiResponse> {
        self.http.delete(&format!("/documents/{id}/")).await
    }

    pub async fn sign(&self, id: i64) -> Result<ApiResponse> {
        self.http.post_empty(&format!("/documents/{id}/sign/")).await
    }

    /// Placeholder pending a backend endpoint: fixed taxonomy, no network.
    pub async fn document_types(&self) -> Result<ApiResponse> {
        debug!("serving placeholder document types");
        Ok(ApiResponse::stubbed(json!({
            "documentTypes": [
                { "id": 1, "name": "Order" },
                { "id": 2, "name": "Directive" },
                { "id": 3, "name": "Memo" },
                { "id": 4, "name": "Application" },
                { "id": 5, "name": "Report" }
            ]
        })))
    }

    /// Placeholder pending a backend endpoint: fixed statuses, no network.
    pub async fn document_statuses(&self) -> Result<ApiResponse> {
        Ok(ApiResponse::stubbed(json!({
            "documentStatuses": [
                { "id": 1, "name": "Draft" },
                { "id": 2, "name": "Under review" },
                { "id": 3, "name": "Approved" },
                { "id": 4, "name": "Rejected" },
                { "id": 5, "name": "Signed" }
            ]
        })))
    }
}
