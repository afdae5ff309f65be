//! WebAssembly implementation of the `HttpClient` bridge trait.
//!
//! This client forwards requests to the browser's `fetch` API and converts the
//! resulting `Response` objects back into the bridge-friendly `HttpResponse`
//! type. Timeouts are enforced with an `AbortController` raced against a
//! `gloo-timers` future. A rejected `fetch` promise means no response was
//! obtained and surfaces as [`BridgeError::ConnectionFailed`].

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    http::{FormPart, FormValue, HttpBody, HttpClient, HttpRequest, HttpResponse},
};
use bytes::Bytes;
use futures::{
    future::{select, Either},
    pin_mut, FutureExt,
};
use gloo_timers::future::TimeoutFuture;
use js_sys::{try_iter, Array, Uint8Array};
use std::{collections::HashMap, time::Duration};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AbortController, Blob, BlobPropertyBag, FormData, Request, RequestInit, RequestMode, Response,
    Window,
};

/// Timeout applied when a request does not carry its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// WebAssembly HTTP client backed by the browser's `fetch` API.
pub struct WasmHttpClient {
    window: Window,
    default_timeout: Duration,
}

impl WasmHttpClient {
    /// Create a new client bound to the current browser window.
    pub fn new() -> BridgeResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom fallback timeout.
    pub fn with_timeout(timeout: Duration) -> BridgeResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| BridgeError::NotAvailable("window".to_string()))?;
        Ok(Self {
            window,
            default_timeout: timeout,
        })
    }

    fn build_form(parts: &[FormPart]) -> BridgeResult<FormData> {
        let form = FormData::new().map_err(|err| js_error("create form data", err))?;
        for part in parts {
            match &part.value {
                FormValue::Text(value) => form
                    .append_with_str(&part.name, value)
                    .map_err(|err| js_error("append form field", err))?,
                FormValue::File {
                    file_name,
                    content_type,
                    data,
                } => {
                    let chunks = Array::new();
                    chunks.push(&Uint8Array::from(data.as_ref()));
                    let options = BlobPropertyBag::new();
                    if let Some(mime) = content_type {
                        options.set_type(mime);
                    }
                    let blob = Blob::new_with_u8_array_sequence_and_options(&chunks, &options)
                        .map_err(|err| js_error("create blob", err))?;
                    form.append_with_blob_and_filename(&part.name, &blob, file_name)
                        .map_err(|err| js_error("append form file", err))?;
                }
            }
        }
        Ok(form)
    }

    fn build_request(
        &self,
        request: &HttpRequest,
        signal: &web_sys::AbortSignal,
    ) -> BridgeResult<Request> {
        let init = RequestInit::new();
        init.set_method(request.method.as_str());
        init.set_mode(RequestMode::Cors);
        init.set_signal(Some(signal));

        match &request.body {
            Some(HttpBody::Bytes(body)) => {
                init.set_body(&JsValue::from(Uint8Array::from(body.as_ref())));
            }
            Some(HttpBody::Multipart(parts)) => {
                init.set_body(&JsValue::from(Self::build_form(parts)?));
            }
            None => {}
        }

        let headers = web_sys::Headers::new().map_err(|err| js_error("create headers", err))?;
        for (key, value) in &request.headers {
            headers
                .set(key, value)
                .map_err(|err| js_error("set header", err))?;
        }
        init.set_headers(&headers);

        Request::new_with_str_and_init(&request.url, &init)
            .map_err(|err| js_error("build request", err))
    }

    async fn fetch_with_timeout(
        &self,
        req: &Request,
        controller: AbortController,
        timeout: Duration,
    ) -> BridgeResult<Response> {
        let fetch = JsFuture::from(self.window.fetch_with_request(req));
        let timeout_ms = timeout.as_millis().min(u32::MAX as u128) as u32;
        let timeout_fut = TimeoutFuture::new(timeout_ms).map(|_| ());
        pin_mut!(timeout_fut);
        pin_mut!(fetch);

        let result = match select(fetch, timeout_fut).await {
            Either::Left((response, _)) => response,
            Either::Right((_, pending_fetch)) => {
                controller.abort();
                // Poll once more so the aborted promise settles.
                let _ = pending_fetch.await;
                return Err(BridgeError::Timeout(timeout.as_millis()));
            }
        };

        let js_value = result.map_err(|err| {
            BridgeError::ConnectionFailed(describe_js_error(&err))
        })?;
        js_value
            .dyn_into::<Response>()
            .map_err(|_| BridgeError::OperationFailed("fetch returned non-Response".into()))
    }

    async fn read_body(response: &Response) -> BridgeResult<Bytes> {
        let promise = response
            .array_buffer()
            .map_err(|err| js_error("response.array_buffer", err))?;
        let buffer = JsFuture::from(promise)
            .await
            .map_err(|err| BridgeError::ConnectionFailed(describe_js_error(&err)))?;
        let array = Uint8Array::new(&buffer);
        let mut bytes = vec![0u8; array.length() as usize];
        array.copy_to(&mut bytes);
        Ok(Bytes::from(bytes))
    }

    fn collect_headers(response: &Response) -> BridgeResult<HashMap<String, String>> {
        let headers = response.headers();
        let iterator = try_iter(&JsValue::from(headers.clone()))
            .map_err(|err| js_error("iterate headers", err))?
            .ok_or_else(|| BridgeError::OperationFailed("Headers iterator unavailable".into()))?;

        let mut map = HashMap::new();
        for entry in iterator {
            let entry = entry.map_err(|err| js_error("header iteration", err))?;
            let pair = Array::from(&entry);
            if pair.length() >= 2 {
                if let (Some(key), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string())
                {
                    map.insert(key, value);
                }
            }
        }

        Ok(map)
    }
}

#[async_trait(?Send)]
impl HttpClient for WasmHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let controller =
            AbortController::new().map_err(|err| js_error("create abort controller", err))?;
        let signal = controller.signal();

        let req = self.build_request(&request, &signal)?;
        tracing::debug!(method = request.method.as_str(), url = %request.loggable_url(), "fetch");

        let response = self.fetch_with_timeout(&req, controller, timeout).await?;
        let body = Self::read_body(&response).await?;
        let headers = Self::collect_headers(&response)?;

        Ok(HttpResponse {
            status: response.status(),
            headers,
            body,
        })
    }
}

fn describe_js_error(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        text
    } else if let Some(js_err) = err.dyn_ref::<js_sys::Error>() {
        js_err.message().into()
    } else {
        format!("{err:?}")
    }
}

fn js_error(context: &str, err: JsValue) -> BridgeError {
    BridgeError::OperationFailed(format!(
        "WasmHttpClient {context}: {}",
        describe_js_error(&err)
    ))
}
