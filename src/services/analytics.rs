//! Analytics endpoints under `/analytics/*`. Report export returns a binary
//! payload for client-side download, not JSON.

use crate::http::{ApiResponse, BinaryResponse, HttpClient, QueryParams};
use crate::types::Result;

#[derive(Clone)]
pub struct AnalyticsService {
    http: HttpClient,
}

impl AnalyticsService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn teacher_load(&self, params: &QueryParams) -> Result<ApiResponse> {
        self.http.get("/analytics/teacher-load/", params).await
    }

    pub async fn classroom_usage(&self, params: &QueryParams) -> Result<ApiResponse> {
        self.http.get("/analytics/classroom-usage/", params).await
    }

    /// Export a report in the requested format. The `format` value is passed
    /// alongside the caller's filter parameters.
    pub async fn export_report(
        &self,
        report_type: &str,
        format: &str,
        params: &QueryParams,
    ) -> Result<BinaryResponse> {
        let mut query = params.clone();
        query.push(("format".to_string(), format.to_string()));
        self.http
            .get_bytes(&format!("/analytics/export/{report_type}/"), &query)
            .await
    }
}
