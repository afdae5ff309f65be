//! # Navigation Signal
//!
//! The core never drives a router directly. It publishes the route it wants
//! shown; the UI shell observes the latest value and performs the transition.
//!
//! The current route is held in a `tokio::sync::watch` channel, so a burst of
//! requests collapses to the most recent one for late observers. Every request
//! also emits exactly one [`NavigationEvent::Requested`] on the event bus.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;
use tracing::debug;

use crate::events::{CoreEvent, EventBus, NavigationEvent};

/// Application screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Login,
    CementPlant,
    Map,
    TifManagement,
    Pollution,
    /// Current user's profile page.
    Me,
    Files,
    AdminUsers,
    PollutionAsync,
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Login,
        Route::CementPlant,
        Route::Map,
        Route::TifManagement,
        Route::Pollution,
        Route::Me,
        Route::Files,
        Route::AdminUsers,
        Route::PollutionAsync,
    ];

    /// Route shown for the bare root path.
    pub const HOME: Route = Route::CementPlant;

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::CementPlant => "/cement-plant",
            Route::Map => "/map",
            Route::TifManagement => "/tif-management",
            Route::Pollution => "/pollution",
            Route::Me => "/me",
            Route::Files => "/files",
            Route::AdminUsers => "/admin/users",
            Route::PollutionAsync => "/pollution/async",
        }
    }

    /// Exact match against the route table. A single trailing slash is ignored.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = match path.strip_suffix('/') {
            Some(rest) if !rest.is_empty() => rest,
            _ => path,
        };
        Route::ALL.into_iter().find(|route| route.path() == trimmed)
    }

    /// Whether the route needs a stored token.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Publishes navigation requests from the core to the UI shell.
#[derive(Debug, Clone)]
pub struct Navigator {
    current: watch::Sender<Option<Route>>,
    events: EventBus,
}

impl Navigator {
    pub fn new(events: EventBus) -> Self {
        let (current, _) = watch::channel(None);
        Self { current, events }
    }

    /// Request a transition to `route`.
    ///
    /// Emits one navigation event per call even when `route` is already current.
    pub fn navigate(&self, route: Route) {
        debug!(path = route.path(), "navigation requested");
        self.current.send_replace(Some(route));
        let _ = self
            .events
            .emit(CoreEvent::Navigation(NavigationEvent::Requested {
                path: route.path().to_string(),
            }));
    }

    /// Most recently requested route, if any.
    pub fn current(&self) -> Option<Route> {
        *self.current.borrow()
    }

    /// Observe the latest requested route.
    pub fn watch(&self) -> watch::Receiver<Option<Route>> {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_table_round_trips() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/admin/users/"), Some(Route::AdminUsers));
        assert_eq!(Route::from_path("/"), None);
        assert_eq!(Route::from_path("/nope"), None);
    }

    #[test]
    fn test_only_login_is_public() {
        let public: Vec<_> = Route::ALL
            .into_iter()
            .filter(|route| !route.requires_auth())
            .collect();
        assert_eq!(public, vec![Route::Login]);
    }

    #[tokio::test]
    async fn test_navigate_emits_once_per_call() {
        let bus = EventBus::new(16);
        let mut stream = bus.stream();
        let navigator = Navigator::new(bus);

        navigator.navigate(Route::Login);
        navigator.navigate(Route::Login);

        let events = stream.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(navigator.current(), Some(Route::Login));
    }

    #[tokio::test]
    async fn test_watch_sees_latest_value_only() {
        let navigator = Navigator::new(EventBus::new(16));
        let mut rx = navigator.watch();

        navigator.navigate(Route::Map);
        navigator.navigate(Route::Login);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(Route::Login));
        assert!(!rx.has_changed().unwrap());
    }
}
