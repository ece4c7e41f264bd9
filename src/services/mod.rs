//! Resource service modules: one fixed set of functions per REST resource.
//!
//! Each function maps 1:1 to an endpoint and returns the raw adapter result
//! without unwrapping it, so the stores can inspect delivered status codes.
//! Two services (`notifications`, the document taxonomy lookups) have no
//! backing endpoint yet and answer with fixed local payloads instead.

pub mod analytics;
pub mod auth;
pub mod chat;
pub mod documents;
pub mod notifications;
pub mod schedule;
pub mod tasks;

pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use chat::ChatService;
pub use documents::DocumentService;
pub use notifications::NotificationService;
pub use schedule::ScheduleService;
pub use tasks::TaskService;
