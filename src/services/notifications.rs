//! Notification service.
//!
//! The backend has no `/notifications/` routes yet, so every function here
//! resolves a fixed local payload shaped like a real paginated response.
//! Keeping the placeholder behind the same service interface means a future
//! backend implementation is a drop-in replacement with no caller changes.

use crate::http::{ApiResponse, HttpClient, QueryParams};
use crate::types::Result;
use chrono::Utc;
use serde_json::json;
use tracing::debug;

#[derive(Clone)]
pub struct NotificationService {
    // Held so the placeholder can be swapped for real calls without
    // touching construction sites.
    #[allow(dead_code)]
    http: HttpClient,
}

impl NotificationService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, _params: &QueryParams) -> Result<ApiResponse> {
        debug!("serving placeholder notifications");
        let now = Utc::now().to_rfc3339();
        Ok(ApiResponse::stubbed(json!({
            "items": [
                {
                    "id": 1,
                    "title": "New notification",
                    "message": "A new event was added to the schedule",
                    "read": false,
                    "created_at": now
                },
                {
                    "id": 2,
                    "title": "Task assigned",
                    "message": "You have been assigned a new task",
                    "read": false,
                    "created_at": now
                }
            ],
            "total": 2
        })))
    }

    pub async fn mark_as_read(&self, _id: i64) -> Result<ApiResponse> {
        Ok(ApiResponse::stubbed(json!({ "success": true })))
    }

    pub async fn mark_all_as_read(&self) -> Result<ApiResponse> {
        Ok(ApiResponse::stubbed(json!({ "success": true })))
    }

    pub async fn unread_count(&self) -> Result<ApiResponse> {
        Ok(ApiResponse::stubbed(json!({ "count": 2 })))
    }
}
