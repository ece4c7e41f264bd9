//! HTTP adapter between the resource services and the remote REST API.
//!
//! Every outbound request goes through [`HttpClient`]: it attaches the bearer
//! token from the session, disables redirects (the backend must answer
//! directly, not via 3xx indirection), and enforces the configured deadline.
//!
//! Response classification follows the backend contract: any delivered status
//! in [200, 500) is returned as an [`ApiResponse`] so callers can inspect
//! structured error bodies, while statuses >= 500 and transport failures are
//! raised as [`ApiError`]. A delivered 401 additionally expires the session —
//! the adapter only emits the signal; navigation is owned by the router.

use crate::config::ClientConfig;
use crate::session::SessionManager;
use crate::types::{ApiError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

/// Query parameters, passed through to the query string untouched.
pub type QueryParams = Vec<(String, String)>;

/// A delivered JSON response: status, headers, and parsed body.
///
/// Bodies that are empty or not JSON parse to `Value::Null` rather than
/// failing, since several endpoints answer 204 or an empty 200.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl ApiResponse {
    /// Build a delivered 200 response locally. Used by the placeholder
    /// services that stand in for unimplemented backend endpoints.
    pub fn stubbed(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Human-readable failure message: the body's `message` or `error`
    /// field when present, else the status line.
    pub fn error_message(&self) -> String {
        self.body
            .get("message")
            .or_else(|| self.body.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "{} {}",
                    self.status.as_u16(),
                    self.status.canonical_reason().unwrap_or("request failed")
                )
            })
    }

    /// Unwrap the body of a 2xx response; a delivered 4xx becomes
    /// [`ApiError::Http`] carrying the body's message.
    pub fn into_result(self) -> Result<Value> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(ApiError::Http {
                status: self.status.as_u16(),
                message: self.error_message(),
            })
        }
    }
}

/// A delivered binary response (report export).
#[derive(Debug, Clone)]
pub struct BinaryResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// HTTP client adapter. Cloning is cheap; clones share the underlying
/// connection pool and session.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
    session: SessionManager,
}

impl HttpClient {
    pub fn new(config: &ClientConfig, session: SessionManager) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer credential when a session token is persisted.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn dispatch(&self, method: Method, path: &str, builder: RequestBuilder) -> Result<ApiResponse> {
        debug!(%method, path, "dispatching request");

        let response = self.authorize(builder).send().await.map_err(ApiError::from)?;
        let status = response.status();
        let headers = response.headers().clone();

        if status.as_u16() >= 500 {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, path, "server error");
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.canonical_reason().unwrap_or("server error").to_string()
                } else {
                    body
                },
            });
        }

        // Global teardown: a 401 from any endpoint invalidates the session.
        // Navigation to the login entry point happens in the router, which
        // listens for the expiry event.
        if status == StatusCode::UNAUTHORIZED {
            self.session.expire();
        }

        let raw = response.bytes().await.map_err(ApiError::from)?;
        let body = if raw.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&raw).unwrap_or(Value::Null)
        };

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    pub async fn get(&self, path: &str, params: &QueryParams) -> Result<ApiResponse> {
        let builder = self.inner.get(self.url(path)).query(params);
        self.dispatch(Method::GET, path, builder).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        let builder = self.inner.post(self.url(path)).json(body);
        self.dispatch(Method::POST, path, builder).await
    }

    /// POST with no body (action endpoints like task cancel).
    pub async fn post_empty(&self, path: &str) -> Result<ApiResponse> {
        let builder = self.inner.post(self.url(path));
        self.dispatch(Method::POST, path, builder).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        let builder = self.inner.put(self.url(path)).json(body);
        self.dispatch(Method::PUT, path, builder).await
    }

    pub async fn patch(&self, path: &str) -> Result<ApiResponse> {
        let builder = self.inner.patch(self.url(path));
        self.dispatch(Method::PATCH, path, builder).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        let builder = self.inner.delete(self.url(path));
        self.dispatch(Method::DELETE, path, builder).await
    }

    /// Multipart upload; the form sets its own content type, overriding the
    /// default JSON contract.
    pub async fn post_multipart(&self, path: &str, form: Form) -> Result<ApiResponse> {
        let builder = self.inner.post(self.url(path)).multipart(form);
        self.dispatch(Method::POST, path, builder).await
    }

    /// GET returning a raw binary payload instead of JSON.
    pub async fn get_bytes(&self, path: &str, params: &QueryParams) -> Result<BinaryResponse> {
        debug!(path, "dispatching binary request");

        let builder = self.inner.get(self.url(path)).query(params);
        let response = self.authorize(builder).send().await.map_err(ApiError::from)?;
        let status = response.status();

        if status.as_u16() >= 500 {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("server error").to_string(),
            });
        }
        if status == StatusCode::UNAUTHORIZED {
            self.session.expire();
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(ApiError::from)?.to_vec();

        Ok(BinaryResponse {
            status,
            content_type,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_message_prefers_body_message() {
        let resp = ApiResponse {
            status: StatusCode::NOT_FOUND,
            headers: HeaderMap::new(),
            body: json!({"message": "no such task"}),
        };
        assert_eq!(resp.error_message(), "no such task");
    }

    #[test]
    fn test_error_message_falls_back_to_status_line() {
        let resp = ApiResponse {
            status: StatusCode::NOT_FOUND,
            headers: HeaderMap::new(),
            body: Value::Null,
        };
        assert_eq!(resp.error_message(), "404 Not Found");
    }

    #[test]
    fn test_into_result_maps_client_errors() {
        let ok = ApiResponse::stubbed(json!({"id": 1}));
        assert_eq!(ok.into_result().unwrap(), json!({"id": 1}));

        let resp = ApiResponse {
            status: StatusCode::CONFLICT,
            headers: HeaderMap::new(),
            body: json!({"error": "duplicate"}),
        };
        match resp.into_result() {
            Err(ApiError::Http { status, message }) => {
                assert_eq!(status, 409);
                assert_eq!(message, "duplicate");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }
}
