use async_trait::async_trait;
use bridge_traits::time::Timer;
use gloo_timers::future::TimeoutFuture;
use std::time::Duration;

/// [`Timer`] driven by `setTimeout` on the browser event loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct WasmTimer;

#[async_trait(?Send)]
impl Timer for WasmTimer {
    async fn sleep(&self, duration: Duration) {
        let millis = duration.as_millis().min(u32::MAX as u128) as u32;
        TimeoutFuture::new(millis).await;
    }
}
