//! # Call Wrapper
//!
//! Runs an API call and returns a [`Classification`] whatever happened.
//!
//! ```text
//! operation ──Ok(envelope)──► dispatch (failures) ──► classify ──► callbacks
//!     │
//!     └──Err(error)──► on_error(raw error) ──► rethrow? ──yes──► Err(error)
//!                                               │
//!                                               no
//!                                               ▼
//!                            network-failure envelope ──► dispatch ──► classify
//! ```
//!
//! Every failure produces exactly one notice (raised by the dispatcher) unless
//! `show_error` is off or a status handler replaces it. Success notices are
//! opt-in through `show_success`.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use core_runtime::events::{CoreEvent, EventBus, Notice};
use tracing::warn;

use crate::classify::{classify, Classification};
use crate::dispatch::{Dispatcher, StatusHandlers};
use crate::envelope::ResponseEnvelope;
use crate::error::ApiError;

/// What the error callback sees.
#[derive(Debug)]
pub struct ErrorReport<'a> {
    pub code: i32,
    /// Resolved display message.
    pub message: &'a str,
    /// The transport error, when no envelope was obtained.
    pub error: Option<&'a ApiError>,
}

pub type SuccessCallback<T> = Arc<dyn Fn(Option<&T>, &str) + Send + Sync>;
pub type ErrorCallback = Arc<dyn for<'a> Fn(&ErrorReport<'a>) + Send + Sync>;

pub struct WrapOptions<T> {
    pub show_success: bool,
    pub show_error: bool,
    pub on_success: Option<SuccessCallback<T>>,
    pub on_error: Option<ErrorCallback>,
    pub handlers: StatusHandlers,
    /// Return transport errors instead of normalizing them.
    pub rethrow: bool,
}

impl<T> Default for WrapOptions<T> {
    fn default() -> Self {
        Self {
            show_success: false,
            show_error: true,
            on_success: None,
            on_error: None,
            handlers: StatusHandlers::default(),
            rethrow: false,
        }
    }
}

impl<T> Clone for WrapOptions<T> {
    fn clone(&self) -> Self {
        Self {
            show_success: self.show_success,
            show_error: self.show_error,
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
            handlers: self.handlers.clone(),
            rethrow: self.rethrow,
        }
    }
}

impl<T> WrapOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_success(mut self, show: bool) -> Self {
        self.show_success = show;
        self
    }

    pub fn show_error(mut self, show: bool) -> Self {
        self.show_error = show;
        self
    }

    pub fn on_success(mut self, callback: impl Fn(Option<&T>, &str) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn on_error(
        mut self,
        callback: impl for<'a> Fn(&ErrorReport<'a>) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    pub fn handlers(mut self, handlers: StatusHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn rethrow(mut self, rethrow: bool) -> Self {
        self.rethrow = rethrow;
        self
    }
}

impl<T> fmt::Debug for WrapOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapOptions")
            .field("show_success", &self.show_success)
            .field("show_error", &self.show_error)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("handlers", &self.handlers)
            .field("rethrow", &self.rethrow)
            .finish()
    }
}

/// Normalizes call results and applies dispatch side effects.
#[derive(Debug, Clone)]
pub struct CallWrapper {
    dispatcher: Arc<Dispatcher>,
    events: EventBus,
}

impl CallWrapper {
    pub fn new(dispatcher: Arc<Dispatcher>, events: EventBus) -> Self {
        Self { dispatcher, events }
    }

    /// Await `operation` and classify its outcome.
    ///
    /// # Errors
    ///
    /// Only when `options.rethrow` is set and the operation failed before an
    /// envelope was obtained.
    pub async fn call<T, F>(
        &self,
        operation: F,
        options: &WrapOptions<T>,
    ) -> Result<Classification<T>, ApiError>
    where
        F: Future<Output = Result<ResponseEnvelope<T>, ApiError>>,
    {
        match operation.await {
            Ok(envelope) => Ok(self.settle(envelope, options, None).await),
            Err(error) => {
                warn!(error = %error, "API call failed");
                if options.rethrow {
                    let fallback = classify::<T>(None);
                    if let Some(on_error) = &options.on_error {
                        on_error(&ErrorReport {
                            code: fallback.code,
                            message: &fallback.message,
                            error: Some(&error),
                        });
                    }
                    return Err(error);
                }
                Ok(self
                    .settle(ResponseEnvelope::network_failure(), options, Some(&error))
                    .await)
            }
        }
    }

    /// Bind `operation` and `options` into a reusable call.
    pub fn wrap<F, T>(&self, operation: F, options: WrapOptions<T>) -> Wrapped<F, T> {
        Wrapped {
            wrapper: self.clone(),
            operation,
            options,
        }
    }

    async fn settle<T>(
        &self,
        envelope: ResponseEnvelope<T>,
        options: &WrapOptions<T>,
        error: Option<&ApiError>,
    ) -> Classification<T> {
        if !envelope.is_success() {
            let handlers = options
                .handlers
                .clone()
                .notify(options.show_error && options.handlers.notifies());
            self.dispatcher
                .dispatch(envelope.code, &envelope, &handlers)
                .await;
        }

        let result = classify(Some(envelope));

        if result.success {
            if options.show_success {
                let _ = self
                    .events
                    .emit(CoreEvent::Notice(Notice::success(result.code, &result.message)));
            }
            if let Some(on_success) = &options.on_success {
                on_success(result.data.as_ref(), &result.message);
            }
        } else if let Some(on_error) = &options.on_error {
            on_error(&ErrorReport {
                code: result.code,
                message: &result.message,
                error,
            });
        }

        result
    }
}

/// An operation bound to a wrapper and options; see [`CallWrapper::wrap`].
pub struct Wrapped<F, T> {
    wrapper: CallWrapper,
    operation: F,
    options: WrapOptions<T>,
}

impl<F, T> Wrapped<F, T> {
    pub async fn invoke<A, Fut>(&self, args: A) -> Result<Classification<T>, ApiError>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<ResponseEnvelope<T>, ApiError>>,
    {
        self.wrapper
            .call((self.operation)(args), &self.options)
            .await
    }

    pub fn options(&self) -> &WrapOptions<T> {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{StatusCode, NETWORK_ERROR_MESSAGE};
    use bridge_traits::storage::MemorySettingsStore;
    use bridge_traits::BridgeError;
    use core_auth::SessionStore;
    use core_runtime::navigation::Navigator;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn wrapper() -> (CallWrapper, EventBus) {
        let events = EventBus::new(32);
        let session = Arc::new(SessionStore::new(
            Arc::new(MemorySettingsStore::new()),
            Some(events.clone()),
        ));
        let dispatcher = Dispatcher::new(session, Navigator::new(events.clone()), events.clone());
        (CallWrapper::new(Arc::new(dispatcher), events.clone()), events)
    }

    fn notices(events: &EventBus) -> core_runtime::events::EventStream {
        events
            .stream()
            .filter(|event| matches!(event, CoreEvent::Notice(_)))
    }

    #[tokio::test]
    async fn test_success_is_silent_by_default() {
        let (wrapper, events) = wrapper();
        let mut notices = notices(&events);

        let result = wrapper
            .call(
                async { Ok(ResponseEnvelope::success(json!({"id": 1}))) },
                &WrapOptions::default(),
            )
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.data, Some(json!({"id": 1})));
        assert!(notices.drain().is_empty());
    }

    #[tokio::test]
    async fn test_success_callback_and_notice() {
        let (wrapper, events) = wrapper();
        let mut notices = notices(&events);
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();

        let options = WrapOptions::new()
            .show_success(true)
            .on_success(move |data: Option<&i64>, message| {
                *sink.lock().unwrap() = Some((data.copied(), message.to_string()));
            });

        wrapper
            .call(async { Ok(ResponseEnvelope::success(7_i64)) }, &options)
            .await
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            Some((Some(7), "Operation successful".to_string()))
        );
        assert_eq!(notices.drain().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_is_normalized() {
        let (wrapper, events) = wrapper();
        let mut notices = notices(&events);
        let saw_raw = Arc::new(AtomicBool::new(false));
        let flag = saw_raw.clone();

        let options = WrapOptions::<Value>::new().on_error(move |report| {
            assert_eq!(report.code, 500);
            flag.store(report.error.is_some_and(ApiError::is_transport), Ordering::SeqCst);
        });

        let result = wrapper
            .call(
                async { Err(ApiError::Transport(BridgeError::Timeout(20_000))) },
                &options,
            )
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.code, 500);
        assert_eq!(result.message, NETWORK_ERROR_MESSAGE);
        assert!(saw_raw.load(Ordering::SeqCst));
        assert_eq!(
            notices.drain(),
            vec![CoreEvent::Notice(Notice::error(500, NETWORK_ERROR_MESSAGE))]
        );
    }

    #[tokio::test]
    async fn test_rethrow_returns_raw_error() {
        let (wrapper, events) = wrapper();
        let mut notices = notices(&events);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let options = WrapOptions::<Value>::new().rethrow(true).on_error(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let result = wrapper
            .call(async { Err(ApiError::QuotaExceeded) }, &options)
            .await;

        assert!(matches!(result, Err(ApiError::QuotaExceeded)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(notices.drain().is_empty());
    }

    #[tokio::test]
    async fn test_failure_envelope_single_notice() {
        let (wrapper, events) = wrapper();
        let mut notices = notices(&events);

        let result = wrapper
            .call(
                async { Ok(ResponseEnvelope::<Value>::new(404, None, None)) },
                &WrapOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(result.message, StatusCode::NotFound.user_message());
        assert_eq!(notices.drain().len(), 1);
    }

    #[tokio::test]
    async fn test_show_error_false_suppresses_notice() {
        let (wrapper, events) = wrapper();
        let mut notices = notices(&events);

        let result = wrapper
            .call(
                async { Ok(ResponseEnvelope::<Value>::new(517, None, None)) },
                &WrapOptions::new().show_error(false),
            )
            .await
            .unwrap();

        assert!(!result.success);
        assert!(notices.drain().is_empty());
    }

    #[tokio::test]
    async fn test_wrapped_is_reusable() {
        let (wrapper, _) = wrapper();
        let wrapped = wrapper.wrap(
            |id: i64| async move {
                if id > 0 {
                    Ok(ResponseEnvelope::success(id * 2))
                } else {
                    Err(ApiError::Transport(BridgeError::ConnectionFailed("refused".into())))
                }
            },
            WrapOptions::<i64>::new().show_error(false),
        );

        assert_eq!(wrapped.invoke(21).await.unwrap().data, Some(42));
        let failed = wrapped.invoke(-1).await.unwrap();
        assert_eq!(failed.code, 500);
        assert!(!wrapped.options().show_success);
    }
}
