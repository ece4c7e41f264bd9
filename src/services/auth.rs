//! Authentication endpoints under `/auth/*`.
//!
//! Login, register, forgot-password and reset-password are the only
//! unauthenticated calls in the API; everything else assumes the bearer
//! token the adapter attaches.

use crate::http::{ApiResponse, HttpClient};
use crate::types::{LoginRequest, RegisterRequest, Result};
use serde_json::json;

#[derive(Clone)]
pub struct AuthService {
    http: HttpClient,
}

impl AuthService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<ApiResponse> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password,
        });
        self.http.post("/auth/login", &body).await
    }

    pub async fn logout(&self) -> Result<ApiResponse> {
        self.http.post_empty("/auth/logout").await
    }

    pub async fn current_user(&self) -> Result<ApiResponse> {
        self.http.get("/auth/me", &Vec::new()).await
    }

    pub async fn register(&self, user_data: &RegisterRequest) -> Result<ApiResponse> {
        let body = json!({
            "email": user_data.email,
            "password": user_data.password,
            "name": user_data.name,
        });
        self.http.post("/auth/register", &body).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<ApiResponse> {
        self.http
            .post("/auth/forgot-password", &json!({ "email": email }))
            .await
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<ApiResponse> {
        self.http
            .post(
                "/auth/reset-password",
                &json!({ "token": token, "new_password": new_password }),
            )
            .await
    }

    pub async fn update_profile(&self, user_data: &serde_json::Value) -> Result<ApiResponse> {
        self.http.put("/auth/profile", user_data).await
    }
}
