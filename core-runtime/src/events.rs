//! # Event Bus System
//!
//! Provides an event-driven architecture for the client core using
//! `tokio::sync::broadcast`. The UI shell subscribes once and renders session
//! changes, navigation requests and user-facing notices from a single stream.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   emit   ┌───────────┐
//! │ SessionStore ├─────────>│           │
//! └──────────────┘          │           │
//!                           │ EventBus  │  subscribe  ┌────────────┐
//! ┌──────────────┐   emit   │ (broadcast├────────────>│  UI shell  │
//! │  Dispatcher  ├─────────>│  channel) │             └────────────┘
//! └──────────────┘          │           │
//! ┌──────────────┐   emit   │           │
//! │  Navigator   ├─────────>│           │
//! └──────────────┘          └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, Notice};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus.emit(CoreEvent::Notice(Notice::error(503, "Service unavailable"))).ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert!(matches!(event, CoreEvent::Notice(_)));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber fell behind and missed `n` events.
//!   Non-fatal; keep receiving.
//! - **`RecvError::Closed`**: every sender was dropped. Treat as shutdown.
//!
//! Emitting with no subscribers returns `Err(SendError)`. Producers in this
//! workspace ignore that result: a notice nobody is listening for is dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Session lifecycle
    Session(SessionEvent),
    /// Route change requests
    Navigation(NavigationEvent),
    /// Transient user-facing message
    Notice(Notice),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Session(e) => e.description(),
            CoreEvent::Navigation(_) => "Navigation requested",
            CoreEvent::Notice(notice) => &notice.message,
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Notice(notice) => match notice.level {
                NoticeLevel::Error => EventSeverity::Error,
                NoticeLevel::Warning => EventSeverity::Warning,
                NoticeLevel::Success | NoticeLevel::Info => EventSeverity::Info,
            },
            CoreEvent::Session(SessionEvent::Invalidated { .. }) => EventSeverity::Warning,
            CoreEvent::Session(SessionEvent::SignedIn { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Session Events
// ============================================================================

/// Changes to the stored credential and profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// A token was stored.
    SignedIn {
        /// Username from the stored profile, when one is present.
        username: Option<String>,
    },
    /// The stored profile was replaced.
    ProfileUpdated { username: Option<String> },
    /// The session was cleared locally (explicit logout).
    SignedOut,
    /// The server rejected the credential and the session was cleared.
    Invalidated {
        /// Status code that triggered the invalidation.
        code: i32,
    },
}

impl SessionEvent {
    fn description(&self) -> &str {
        match self {
            SessionEvent::SignedIn { .. } => "User signed in",
            SessionEvent::ProfileUpdated { .. } => "Profile updated",
            SessionEvent::SignedOut => "User signed out",
            SessionEvent::Invalidated { .. } => "Session invalidated by server",
        }
    }
}

// ============================================================================
// Navigation Events
// ============================================================================

/// Route change requested by the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum NavigationEvent {
    Requested {
        /// Target path, e.g. `/login`.
        path: String,
    },
}

// ============================================================================
// Notices
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A short message for the notification surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    /// Status code the notice was derived from.
    pub code: i32,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, code: i32, message: impl Into<String>) -> Self {
        Self {
            level,
            code,
            message: message.into(),
        }
    }

    pub fn success(code: i32, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, code, message)
    }

    pub fn warning(code: i32, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, code, message)
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, code, message)
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to core events.
///
/// Cheap to clone; every clone publishes into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// `capacity` is the number of events buffered per subscriber before it
    /// starts receiving `RecvError::Lagged`. Must be greater than zero.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Creates a filtered-capable stream over a new subscription.
    pub fn stream(&self) -> EventStream {
        EventStream::new(self.subscribe())
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus};
///
/// let event_bus = EventBus::new(100);
/// let notices = event_bus
///     .stream()
///     .filter(|event| matches!(event, CoreEvent::Notice(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive a matching event without waiting.
    ///
    /// Returns `None` if no matching events are currently buffered.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(Ok(event)),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    /// Drains every buffered matching event.
    pub fn drain(&mut self) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        while let Some(result) = self.try_recv() {
            match result {
                Ok(event) => events.push(event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        events
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);

        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        let result = bus.emit(CoreEvent::Session(SessionEvent::SignedOut));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Notice(Notice::error(404, "The requested resource does not exist"));
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = bus
            .stream()
            .filter(|event| matches!(event, CoreEvent::Navigation(_)));

        bus.emit(CoreEvent::Session(SessionEvent::Invalidated { code: 401 }))
            .unwrap();
        bus.emit(CoreEvent::Navigation(NavigationEvent::Requested {
            path: "/login".to_string(),
        }))
        .unwrap();

        let received = stream.recv().await.unwrap();
        assert_eq!(
            received,
            CoreEvent::Navigation(NavigationEvent::Requested {
                path: "/login".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for code in 0..5 {
            bus.emit(CoreEvent::Notice(Notice::error(code, "x"))).unwrap();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(
            CoreEvent::Notice(Notice::error(500, "boom")).severity(),
            EventSeverity::Error
        );
        assert_eq!(
            CoreEvent::Notice(Notice::success(200, "ok")).severity(),
            EventSeverity::Info
        );
        assert_eq!(
            CoreEvent::Session(SessionEvent::Invalidated { code: 401 }).severity(),
            EventSeverity::Warning
        );
        assert_eq!(
            CoreEvent::Session(SessionEvent::SignedOut).severity(),
            EventSeverity::Debug
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Notice(Notice::warning(403, "No permission"));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Notice\""));

        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[tokio::test]
    async fn test_drain_collects_buffered_events() {
        let bus = EventBus::new(10);
        let mut stream = bus
            .stream()
            .filter(|event| matches!(event, CoreEvent::Notice(_)));

        bus.emit(CoreEvent::Notice(Notice::error(409, "a"))).unwrap();
        bus.emit(CoreEvent::Session(SessionEvent::SignedOut)).unwrap();
        bus.emit(CoreEvent::Notice(Notice::error(429, "b"))).unwrap();

        let drained = stream.drain();
        assert_eq!(drained.len(), 2);
        assert!(stream.try_recv().is_none());
    }
}
