//! Schedule endpoints under `/schedule/*`.

use crate::http::{ApiResponse, HttpClient, QueryParams};
use crate::types::Result;
use serde_json::Value;

#[derive(Clone)]
pub struct ScheduleService {
    http: HttpClient,
}

impl ScheduleService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, params: &QueryParams) -> Result<ApiResponse> {
        self.http.get("/schedule/", params).await
    }

    pub async fn upcoming(&self, limit: usize) -> Result<ApiResponse> {
        let params = vec![
            ("upcoming".to_string(), "true".to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        self.http.get("/schedule/", &params).await
    }

    pub async fn get(&self, id: i64) -> Result<ApiResponse> {
        self.http.get(&format!("/schedule/{id}/"), &Vec::new()).await
    }

    pub async fn create(&self, event_data: &Value) -> Result<ApiResponse> {
        self.http.post("/schedule/", event_data).await
    }

    pub async fn update(&self, id: i64, event_data: &Value) -> Result<ApiResponse> {
        self.http.put(&format!("/schedule/{id}/"), event_data).await
    }

    pub async fn delete(&self, id: i64) -> Result<ApiResponse> {
        self.http.delete(&format!("/schedule/{id}/")).await
    }
}
