//! Route guard.
//!
//! `/login` is always reachable. Every other path, including paths that do not
//! exist, needs a stored token; without one the guard redirects to `/login`.
//! The bare root resolves to [`Route::HOME`].

use crate::session::SessionStore;
use core_runtime::navigation::Route;
use std::sync::Arc;
use tracing::debug;

/// Outcome of checking a path against the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the route.
    Allow(Route),
    /// Navigate to this route instead.
    Redirect(Route),
    /// Authenticated, but the path matches no route.
    NotFound,
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: Arc<SessionStore>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    pub fn check(&self, path: &str) -> RouteDecision {
        let decision = decide(path, self.session.is_authenticated());
        debug!(path, ?decision, "route checked");
        decision
    }
}

fn decide(path: &str, authenticated: bool) -> RouteDecision {
    let is_root = path.is_empty() || path == "/";
    let route = Route::from_path(path);

    if route == Some(Route::Login) {
        return RouteDecision::Allow(Route::Login);
    }
    if !authenticated {
        return RouteDecision::Redirect(Route::Login);
    }
    match route {
        Some(route) => RouteDecision::Allow(route),
        None if is_root => RouteDecision::Redirect(Route::HOME),
        None => RouteDecision::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::storage::MemorySettingsStore;

    #[test]
    fn test_login_is_always_allowed() {
        assert_eq!(decide("/login", false), RouteDecision::Allow(Route::Login));
        assert_eq!(decide("/login", true), RouteDecision::Allow(Route::Login));
    }

    #[test]
    fn test_unauthenticated_paths_redirect_to_login() {
        for path in ["/", "/map", "/admin/users", "/does-not-exist"] {
            assert_eq!(decide(path, false), RouteDecision::Redirect(Route::Login));
        }
    }

    #[test]
    fn test_root_redirects_home() {
        assert_eq!(decide("/", true), RouteDecision::Redirect(Route::CementPlant));
        assert_eq!(decide("", true), RouteDecision::Redirect(Route::CementPlant));
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        assert_eq!(decide("/reports", true), RouteDecision::NotFound);
        assert_eq!(decide("/pollution/async", true), RouteDecision::Allow(Route::PollutionAsync));
    }

    #[tokio::test]
    async fn test_guard_follows_session() {
        let session = Arc::new(SessionStore::new(Arc::new(MemorySettingsStore::new()), None));
        let guard = RouteGuard::new(session.clone());

        assert_eq!(guard.check("/files"), RouteDecision::Redirect(Route::Login));
        session.set_token("opaque").await.unwrap();
        assert_eq!(guard.check("/files"), RouteDecision::Allow(Route::Files));
        session.clear().await.unwrap();
        assert_eq!(guard.check("/files"), RouteDecision::Redirect(Route::Login));
    }
}
