//! Task endpoints under `/tasks/*`, including the assignment and lifecycle
//! action routes.

use crate::http::{ApiResponse, HttpClient, QueryParams};
use crate::types::Result;
use serde_json::{json, Value};

#[derive(Clone)]
pub struct TaskService {
    http: HttpClient,
}

impl TaskService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, params: &QueryParams) -> Result<ApiResponse> {
        self.http.get("/tasks/", params).await
    }

    pub async fn active(&self, limit: usize) -> Result<ApiResponse> {
        let params = vec![
            ("status".to_string(), "active".to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        self.http.get("/tasks/", &params).await
    }

    pub async fn get(&self, id: i64) -> Result<ApiResponse> {
        self.http.get(&format!("/tasks/{id}/"), &Vec::new()).await
    }

    pub async fn create(&self, task_data: &Value) -> Result<ApiResponse> {
        self.http.post("/tasks/", task_data).await
    }

    pub async fn update(&self, id: i64, task_data: &Value) -> Result<ApiResponse> {
        self.http.put(&format!("/tasks/{id}/"), task_data).await
    }

    pub async fn delete(&self, id: i64) -> Result<ApiResponse> {
        self.http.delete(&format!("/tasks/{id}/")).await
    }

    pub async fn complete(&self, id: i64) -> Result<ApiResponse> {
        self.http.patch(&format!("/tasks/{id}/complete/")).await
    }

    pub async fn cancel(&self, id: i64) -> Result<ApiResponse> {
        self.http.post_empty(&format!("/tasks/{id}/cancel/")).await
    }

    pub async fn assign(&self, id: i64, user_id: i64) -> Result<ApiResponse> {
        self.http
            .post(&format!("/tasks/{id}/assign/"), &json!({ "userId": user_id }))
            .await
    }

    pub async fn unassign(&self, id: i64, user_id: i64) -> Result<ApiResponse> {
        self.http
            .delete(&format!("/tasks/{id}/assign/{user_id}/"))
            .await
    }
}
