//! Chat endpoints under `/chats/*`, including the nested message routes.

use crate::http::{ApiResponse, HttpClient, QueryParams};
use crate::types::Result;
use serde_json::Value;

#[derive(Clone)]
pub struct ChatService {
    http: HttpClient,
}

impl ChatService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<ApiResponse> {
        self.http.get("/chats/", &Vec::new()).await
    }

    pub async fn get(&self, id: i64) -> Result<ApiResponse> {
        self.http.get(&format!("/chats/{id}/"), &Vec::new()).await
    }

    pub async fn create(&self, data: &Value) -> Result<ApiResponse> {
        self.http.post("/chats/", data).await
    }

    pub async fn update(&self, id: i64, data: &Value) -> Result<ApiResponse> {
        self.http.put(&format!("/chats/{id}/"), data).await
    }

    pub async fn delete(&self, id: i64) -> Result<ApiResponse> {
        self.http.delete(&format!("/chats/{id}/")).await
    }

    pub async fn messages(&self, chat_id: i64, params: &QueryParams) -> Result<ApiResponse> {
        self.http
            .get(&format!("/chats/{chat_id}/messages/"), params)
            .await
    }

    pub async fn send_message(&self, chat_id: i64, data: &Value) -> Result<ApiResponse> {
        self.http
            .post(&format!("/chats/{chat_id}/messages/"), data)
            .await
    }

    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<ApiResponse> {
        self.http
            .delete(&format!("/chats/{chat_id}/messages/{message_id}/"))
            .await
    }
}
