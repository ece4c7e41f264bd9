//! Route table and auth guard.
//!
//! The table statically declares every navigable path. Guarding is two
//! independent synchronous checks against durable session storage at
//! navigation time: routes under the authenticated layout require a
//! persisted token (else redirect to `/login`), and admin-flagged routes
//! additionally require the persisted role to be `admin` (else redirect to
//! the dashboard, not to login). No server round-trip validates the token
//! here.
//!
//! [`Navigator`] owns the current location. It applies the guard on every
//! `navigate` call and consumes session-expiry events from the transport
//! layer, turning the adapter's 401 signal into a hard navigation to login.

use crate::session::{SessionEvent, SessionManager};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

pub const LOGIN_PATH: &str = "/login";
pub const DEFAULT_AUTHENTICATED_PATH: &str = "/dashboard";

const ADMIN_ROLE: &str = "admin";

/// A navigable route. `view` names the lazily-loaded view component bound
/// to the path; resolving it is the embedding UI's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub view: &'static str,
    pub requires_auth: bool,
    pub requires_admin: bool,
}

/// Static route table: three public auth pages plus the children of the
/// authenticated layout.
pub fn route_table() -> &'static [Route] {
    const ROUTES: &[Route] = &[
        Route {
            path: "/login",
            name: "login",
            view: "LoginPage",
            requires_auth: false,
            requires_admin: false,
        },
        Route {
            path: "/register",
            name: "register",
            view: "RegisterPage",
            requires_auth: false,
            requires_admin: false,
        },
        Route {
            path: "/forgot-password",
            name: "forgot-password",
            view: "ForgotPasswordPage",
            requires_auth: false,
            requires_admin: false,
        },
        Route {
            path: "/dashboard",
            name: "dashboard",
            view: "DashboardPage",
            requires_auth: true,
            requires_admin: false,
        },
        Route {
            path: "/schedule",
            name: "schedule",
            view: "SchedulePage",
            requires_auth: true,
            requires_admin: false,
        },
        Route {
            path: "/tasks",
            name: "tasks",
            view: "TasksPage",
            requires_auth: true,
            requires_admin: false,
        },
        Route {
            path: "/documents",
            name: "documents",
            view: "DocumentsPage",
            requires_auth: true,
            requires_admin: false,
        },
        Route {
            path: "/chat",
            name: "chat",
            view: "ChatPage",
            requires_auth: true,
            requires_admin: false,
        },
        Route {
            path: "/profile",
            name: "profile",
            view: "ProfilePage",
            requires_auth: true,
            requires_admin: false,
        },
        Route {
            path: "/analytics",
            name: "analytics",
            view: "AnalyticsPage",
            requires_auth: true,
            requires_admin: true,
        },
    ];
    ROUTES
}

/// Outcome of resolving a navigation target against the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Enter the route.
    Proceed(Route),
    /// No persisted token for an authenticated route.
    RedirectToLogin,
    /// Authenticated but not admin on an admin-flagged route.
    RedirectToDashboard,
    /// No such path in the table.
    NotFound,
}

/// Resolve a target path against the route table and the persisted session.
///
/// `/` redirects to the default authenticated landing route before guarding,
/// matching the table's root redirect.
pub fn resolve(path: &str, session: &SessionManager) -> Navigation {
    let target = if path == "/" {
        DEFAULT_AUTHENTICATED_PATH
    } else {
        path
    };

    let Some(route) = route_table().iter().find(|r| r.path == target) else {
        return Navigation::NotFound;
    };

    if route.requires_auth && !session.is_authenticated() {
        return Navigation::RedirectToLogin;
    }

    if route.requires_admin && session.role().as_deref() != Some(ADMIN_ROLE) {
        return Navigation::RedirectToDashboard;
    }

    Navigation::Proceed(*route)
}

/// Owns the current location and applies the guard on every move.
pub struct Navigator {
    session: SessionManager,
    current: Mutex<String>,
}

impl Navigator {
    /// Start at the login page; the embedding app navigates from there.
    pub fn new(session: SessionManager) -> Self {
        Self {
            session,
            current: Mutex::new(LOGIN_PATH.to_string()),
        }
    }

    pub fn current_path(&self) -> String {
        self.current.lock().clone()
    }

    /// Navigate toward `path`, applying the guard. Returns the outcome; the
    /// current location reflects any redirect.
    pub fn navigate(&self, path: &str) -> Navigation {
        let outcome = resolve(path, &self.session);
        match &outcome {
            Navigation::Proceed(route) => {
                debug!(path = route.path, "navigating");
                *self.current.lock() = route.path.to_string();
            }
            Navigation::RedirectToLogin => {
                debug!(path, "unauthenticated, redirecting to login");
                *self.current.lock() = LOGIN_PATH.to_string();
            }
            Navigation::RedirectToDashboard => {
                debug!(path, "not an admin, redirecting to dashboard");
                *self.current.lock() = DEFAULT_AUTHENTICATED_PATH.to_string();
            }
            Navigation::NotFound => {
                warn!(path, "no matching route");
            }
        }
        outcome
    }

    /// React to a session event: expiry forces a hard navigation to login,
    /// regardless of which in-flight request triggered it.
    pub fn handle_session_event(&self, event: &SessionEvent) {
        if *event == SessionEvent::Expired {
            warn!("session expired, navigating to login");
            *self.current.lock() = LOGIN_PATH.to_string();
        }
    }

    /// Consume session events until the channel closes. Spawn this once at
    /// startup so 401 teardown lands on the login page.
    pub fn listen(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let mut events = self.session.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => self.handle_session_event(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "navigator lagged behind session events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStorage;
    use std::sync::Arc;

    fn session() -> SessionManager {
        SessionManager::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_public_routes_open_without_session() {
        let session = session();
        for path in ["/login", "/register", "/forgot-password"] {
            match resolve(path, &session) {
                Navigation::Proceed(route) => assert_eq!(route.path, path),
                other => panic!("expected Proceed for {path}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_authenticated_routes_redirect_without_token() {
        let session = session();
        assert_eq!(resolve("/dashboard", &session), Navigation::RedirectToLogin);
        assert_eq!(resolve("/tasks", &session), Navigation::RedirectToLogin);
    }

    #[test]
    fn test_root_redirects_to_dashboard_then_guards() {
        let session = session();
        assert_eq!(resolve("/", &session), Navigation::RedirectToLogin);

        session.establish("tok", "teacher");
        match resolve("/", &session) {
            Navigation::Proceed(route) => assert_eq!(route.path, "/dashboard"),
            other => panic!("expected Proceed, got {other:?}"),
        }
    }

    #[test]
    fn test_admin_route_redirects_non_admin_to_dashboard() {
        let session = session();
        session.establish("tok", "teacher");
        assert_eq!(
            resolve("/analytics", &session),
            Navigation::RedirectToDashboard
        );

        session.establish("tok", "admin");
        match resolve("/analytics", &session) {
            Navigation::Proceed(route) => assert!(route.requires_admin),
            other => panic!("expected Proceed, got {other:?}"),
        }
    }

    #[test]
    fn test_guard_reads_storage_not_stale_memory() {
        // The guard consults durable storage at navigation time, so a token
        // cleared between navigations takes effect immediately.
        let session = session();
        session.establish("tok", "teacher");
        let navigator = Navigator::new(session.clone());

        assert!(matches!(
            navigator.navigate("/schedule"),
            Navigation::Proceed(_)
        ));

        session.clear();
        assert_eq!(navigator.navigate("/tasks"), Navigation::RedirectToLogin);
        assert_eq!(navigator.current_path(), "/login");
    }

    #[test]
    fn test_unknown_path_is_not_found_and_keeps_location() {
        let session = session();
        session.establish("tok", "teacher");
        let navigator = Navigator::new(session);
        navigator.navigate("/dashboard");

        assert_eq!(navigator.navigate("/nope"), Navigation::NotFound);
        assert_eq!(navigator.current_path(), "/dashboard");
    }

    #[test]
    fn test_expiry_event_forces_login_location() {
        let session = session();
        session.establish("tok", "admin");
        let navigator = Navigator::new(session.clone());
        navigator.navigate("/analytics");
        assert_eq!(navigator.current_path(), "/analytics");

        navigator.handle_session_event(&SessionEvent::Expired);
        assert_eq!(navigator.current_path(), "/login");

        // Non-expiry events leave the location alone.
        navigator.handle_session_event(&SessionEvent::Cleared);
        assert_eq!(navigator.current_path(), "/login");
    }
}
