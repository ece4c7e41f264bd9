//! # Orgdesk Client
//!
//! Typed async client SDK for the Orgdesk organizational-management REST
//! API: schedule, tasks, documents, chat, and analytics, behind a cached
//! store layer and a navigation guard.
//!
//! ## Overview
//!
//! The crate is layered leaf-first:
//!
//! 1. **HTTP adapter** ([`http`]) — wraps outbound requests, attaches the
//!    bearer token from the persisted session, disables redirects, enforces
//!    the request deadline, and signals session expiry on a 401.
//! 2. **Resource services** ([`services`]) — one module per resource, each
//!    function mapping 1:1 to a REST endpoint and returning the raw
//!    delivered response.
//! 3. **Stores** ([`stores`]) — per-domain in-memory caches with derived
//!    read-only views; bulk fetches absorb failures, everything else
//!    propagates them.
//! 4. **Router** ([`router`]) — static route table with synchronous auth and
//!    admin guards over durable session storage.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use orgdesk::{AppState, ClientConfig};
//! use orgdesk::session::MemoryStorage;
//! use orgdesk::types::LoginRequest;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("https://orgdesk.example.com/api");
//! let app = AppState::new(&config, Arc::new(MemoryStorage::new()))?;
//!
//! app.auth
//!     .login(&LoginRequest {
//!         email: "user@example.com".to_string(),
//!         password: "secret".to_string(),
//!     })
//!     .await?;
//!
//! let events = app.schedule.fetch_events(&Vec::new()).await;
//! println!("{} events today", events.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Session model
//!
//! The session is two string keys in durable storage (bearer token and role),
//! owned by [`session::SessionManager`]. The HTTP adapter, the stores, and
//! the router guard all depend on that one interface; a 401 from any
//! endpoint clears both keys and lands the navigator on the login page.

/// Client configuration.
pub mod config;
/// HTTP client adapter.
pub mod http;
/// Route table, auth guard, and navigator.
pub mod router;
/// Resource service modules mapping domain actions to REST endpoints.
pub mod services;
/// Durable session storage and change notification.
pub mod session;
/// Client-side stores with derived views.
pub mod stores;
/// Entities, request payloads, and error types.
pub mod types;

pub use config::ClientConfig;
pub use http::{ApiResponse, BinaryResponse, HttpClient};
pub use router::{Navigation, Navigator};
pub use session::{SessionEvent, SessionManager, SessionStorage};
pub use stores::{AuthStore, DocumentStore, ScheduleStore, TaskStore};
pub use types::{ApiError, Result};

use services::{
    AnalyticsService, AuthService, ChatService, DocumentService, NotificationService,
    ScheduleService, TaskService,
};
use std::sync::Arc;

/// Application state shared across the embedding UI.
///
/// Bundles the session manager, the HTTP adapter, one store per cached
/// resource domain, the storeless services, and the navigator.
pub struct AppState {
    /// Session manager owning the persisted token and role.
    pub session: SessionManager,
    /// Shared HTTP adapter.
    pub http: HttpClient,
    /// Auth store (current user, login/logout).
    pub auth: AuthStore,
    /// Schedule store.
    pub schedule: ScheduleStore,
    /// Task store.
    pub tasks: TaskStore,
    /// Document store.
    pub documents: DocumentStore,
    /// Chat service (no store; views consume responses directly).
    pub chat: ChatService,
    /// Analytics service, including binary report export.
    pub analytics: AnalyticsService,
    /// Notification service (placeholder-backed).
    pub notifications: NotificationService,
    /// Navigator applying the route guard.
    pub navigator: Arc<Navigator>,
}

impl AppState {
    /// Wire up the full client against the given storage backend.
    ///
    /// Spawn [`Navigator::listen`] afterwards if the embedding app wants
    /// 401 teardown to move the location automatically.
    pub fn new(config: &ClientConfig, storage: Arc<dyn SessionStorage>) -> Result<Self> {
        let session = SessionManager::new(storage);
        let http = HttpClient::new(config, session.clone())?;
        let navigator = Arc::new(Navigator::new(session.clone()));

        Ok(Self {
            auth: AuthStore::new(AuthService::new(http.clone()), session.clone()),
            schedule: ScheduleStore::new(ScheduleService::new(http.clone())),
            tasks: TaskStore::new(TaskService::new(http.clone())),
            documents: DocumentStore::new(DocumentService::new(http.clone())),
            chat: ChatService::new(http.clone()),
            analytics: AnalyticsService::new(http.clone()),
            notifications: NotificationService::new(http.clone()),
            navigator,
            http,
            session,
        })
    }
}
