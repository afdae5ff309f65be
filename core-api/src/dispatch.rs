//! # Status Dispatch
//!
//! Side effects for a failed call, chosen by code category. Exactly one path
//! runs per call:
//!
//! | Category        | With handler        | Without handler                                   |
//! |-----------------|---------------------|---------------------------------------------------|
//! | 401             | handler only        | clear session, navigate to `/login`, one notice   |
//! | 403/404/409/429 | handler only        | one notice with the category text                 |
//! | other failure   | n/a                 | one notice with the resolved user message         |
//! | 200             | n/a                 | nothing                                           |
//!
//! A supplied handler fully replaces the default recovery for its category.
//! Notices can be suppressed with [`StatusHandlers::notify`]; the 401 session
//! reset and navigation still happen when they are.

use std::fmt;
use std::sync::Arc;

use core_auth::SessionStore;
use core_runtime::events::{CoreEvent, EventBus, Notice, NoticeLevel};
use core_runtime::navigation::{Navigator, Route};
use tracing::{debug, info, warn};

use crate::envelope::ResponseEnvelope;
use crate::status::{user_message_for, StatusCode};

/// Closed set of categories the dispatcher distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeCategory {
    Success,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    TooManyRequests,
    Other,
}

impl CodeCategory {
    pub fn of(code: i32) -> CodeCategory {
        match StatusCode::from_code(code) {
            Some(StatusCode::Success) => CodeCategory::Success,
            Some(StatusCode::Unauthorized) => CodeCategory::Unauthorized,
            Some(StatusCode::Forbidden) => CodeCategory::Forbidden,
            Some(StatusCode::NotFound) => CodeCategory::NotFound,
            Some(StatusCode::Conflict) => CodeCategory::Conflict,
            Some(StatusCode::TooManyRequests) => CodeCategory::TooManyRequests,
            _ => CodeCategory::Other,
        }
    }

    /// Notice text used when no handler is supplied for the category.
    fn fixed_text(self) -> Option<&'static str> {
        match self {
            CodeCategory::Forbidden => Some(StatusCode::Forbidden.user_message()),
            CodeCategory::NotFound => Some(StatusCode::NotFound.user_message()),
            CodeCategory::Conflict => Some(StatusCode::Conflict.user_message()),
            CodeCategory::TooManyRequests => Some(StatusCode::TooManyRequests.user_message()),
            CodeCategory::Success | CodeCategory::Unauthorized | CodeCategory::Other => None,
        }
    }
}

/// What a handler sees about the failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub code: i32,
    /// Raw server message, if any.
    pub message: Option<String>,
    /// Message resolved through the taxonomy.
    pub user_message: String,
}

pub type FailureHandler = Arc<dyn Fn(&Failure) + Send + Sync>;

/// Per-call overrides for the dispatcher.
#[derive(Clone)]
pub struct StatusHandlers {
    on_unauthorized: Option<FailureHandler>,
    on_forbidden: Option<FailureHandler>,
    on_not_found: Option<FailureHandler>,
    on_conflict: Option<FailureHandler>,
    on_too_many_requests: Option<FailureHandler>,
    notify: bool,
}

impl Default for StatusHandlers {
    fn default() -> Self {
        Self {
            on_unauthorized: None,
            on_forbidden: None,
            on_not_found: None,
            on_conflict: None,
            on_too_many_requests: None,
            notify: true,
        }
    }
}

impl StatusHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_unauthorized(mut self, handler: impl Fn(&Failure) + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(handler));
        self
    }

    pub fn on_forbidden(mut self, handler: impl Fn(&Failure) + Send + Sync + 'static) -> Self {
        self.on_forbidden = Some(Arc::new(handler));
        self
    }

    pub fn on_not_found(mut self, handler: impl Fn(&Failure) + Send + Sync + 'static) -> Self {
        self.on_not_found = Some(Arc::new(handler));
        self
    }

    pub fn on_conflict(mut self, handler: impl Fn(&Failure) + Send + Sync + 'static) -> Self {
        self.on_conflict = Some(Arc::new(handler));
        self
    }

    pub fn on_too_many_requests(
        mut self,
        handler: impl Fn(&Failure) + Send + Sync + 'static,
    ) -> Self {
        self.on_too_many_requests = Some(Arc::new(handler));
        self
    }

    /// Enable or suppress notices.
    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    pub fn notifies(&self) -> bool {
        self.notify
    }

    fn handler_for(&self, category: CodeCategory) -> Option<&FailureHandler> {
        match category {
            CodeCategory::Unauthorized => self.on_unauthorized.as_ref(),
            CodeCategory::Forbidden => self.on_forbidden.as_ref(),
            CodeCategory::NotFound => self.on_not_found.as_ref(),
            CodeCategory::Conflict => self.on_conflict.as_ref(),
            CodeCategory::TooManyRequests => self.on_too_many_requests.as_ref(),
            CodeCategory::Success | CodeCategory::Other => None,
        }
    }
}

impl fmt::Debug for StatusHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusHandlers")
            .field("on_unauthorized", &self.on_unauthorized.is_some())
            .field("on_forbidden", &self.on_forbidden.is_some())
            .field("on_not_found", &self.on_not_found.is_some())
            .field("on_conflict", &self.on_conflict.is_some())
            .field("on_too_many_requests", &self.on_too_many_requests.is_some())
            .field("notify", &self.notify)
            .finish()
    }
}

/// Which path a dispatch took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Success code; nothing ran.
    NoOp,
    /// A caller-supplied handler ran instead of the default.
    Handled(CodeCategory),
    /// The default path ran. `notice` is `None` when notices were suppressed.
    Default {
        category: CodeCategory,
        notice: Option<Notice>,
    },
}

/// Runs the side effects for failed calls.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    session: Arc<SessionStore>,
    navigator: Navigator,
    events: EventBus,
}

impl Dispatcher {
    pub fn new(session: Arc<SessionStore>, navigator: Navigator, events: EventBus) -> Self {
        Self {
            session,
            navigator,
            events,
        }
    }

    pub async fn dispatch<T>(
        &self,
        code: i32,
        envelope: &ResponseEnvelope<T>,
        handlers: &StatusHandlers,
    ) -> DispatchOutcome {
        let category = CodeCategory::of(code);
        if category == CodeCategory::Success {
            return DispatchOutcome::NoOp;
        }

        let failure = Failure {
            code,
            message: envelope.message.clone(),
            user_message: user_message_for(code, envelope.message.as_deref()),
        };

        if let Some(handler) = handlers.handler_for(category) {
            debug!(code, ?category, "custom status handler");
            handler(&failure);
            return DispatchOutcome::Handled(category);
        }

        let notice = if category == CodeCategory::Unauthorized {
            self.recover_unauthorized(code).await;
            Notice::new(NoticeLevel::Warning, code, failure.user_message)
        } else if let Some(text) = category.fixed_text() {
            Notice::warning(code, text)
        } else {
            Notice::error(code, failure.user_message)
        };

        let notice = handlers.notify.then(|| {
            let _ = self.events.emit(CoreEvent::Notice(notice.clone()));
            notice
        });

        DispatchOutcome::Default { category, notice }
    }

    /// Clearing is unconditional, so concurrent 401s are harmless.
    async fn recover_unauthorized(&self, code: i32) {
        info!(code, "Credential rejected; clearing session");
        if let Err(e) = self.session.invalidate(code).await {
            warn!(error = %e, "Session cleared in memory but not in storage");
        }
        self.navigator.navigate(Route::Login);
    }
}
