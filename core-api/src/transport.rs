//! # Transport
//!
//! Thin layer over the host [`HttpClient`]: builds URLs against the API base,
//! attaches the session token and turns replies into envelopes.
//!
//! The transport never interprets business codes and never mutates the
//! session. A bare HTTP 401 without an envelope body is reported as an
//! envelope with code 401 so the dispatcher can apply its recovery.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::http::{FormPart, HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bytes::Bytes;
use core_auth::SessionStore;
use core_runtime::logging::redact_if_sensitive;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::envelope::ResponseEnvelope;
use crate::error::{ApiError, Result};

/// Body of an [`ApiRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(Vec<FormPart>),
}

/// Method, path, query and body of one call, relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Append one query pair. Repeating a key is allowed.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append every field of `params` as query pairs. `None` fields are skipped.
    pub fn query_params<P: Serialize + ?Sized>(mut self, params: &P) -> Result<Self> {
        let encoded =
            serde_urlencoded::to_string(params).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.query.extend(
            url::form_urlencoded::parse(encoded.as_bytes())
                .map(|(key, value)| (key.into_owned(), value.into_owned())),
        );
        Ok(self)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = Some(RequestBody::Multipart(parts));
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// HTTP client bound to the API base URL and the session token.
#[derive(Clone)]
pub struct ApiClient {
    http: Arc<dyn HttpClient>,
    session: Arc<SessionStore>,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    /// # Errors
    ///
    /// [`ApiError::InvalidUrl`] when `base_url` is not an absolute http(s) URL.
    pub fn new(
        http: Arc<dyn HttpClient>,
        session: Arc<SessionStore>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                base_url.scheme()
            )));
        }
        Ok(Self {
            http,
            session,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Absolute URL for `path` below the base URL, without query.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    fn build(&self, request: ApiRequest) -> Result<HttpRequest> {
        let mut url = self.url_for(&request.path)?;
        if !request.query.is_empty() {
            debug!(query = %loggable_query(&request.query), "Query parameters");
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }

        let mut http = HttpRequest::new(request.method, url.as_str()).timeout(self.timeout);
        if let Some(token) = self.session.token() {
            http = http.authorization(token);
        }
        for (key, value) in request.headers {
            http = http.header(key, value);
        }

        match request.body {
            None => Ok(http),
            Some(RequestBody::Json(value)) => http
                .json(&value)
                .map_err(|e| ApiError::Encode(e.to_string())),
            Some(RequestBody::Multipart(parts)) => Ok(http.multipart(parts)),
        }
    }

    async fn execute(&self, request: ApiRequest) -> Result<HttpResponse> {
        let http = self.build(request)?;
        self.http.execute(http).await.map_err(|e| {
            warn!(error = %e, "Request did not complete");
            ApiError::Transport(e)
        })
    }

    /// Send a request that answers with an envelope.
    #[instrument(skip(self, request), fields(method = request.method.as_str(), path = %request.path))]
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<ResponseEnvelope<T>> {
        let response = self.execute(request).await?;
        debug!(status = response.status, "Response received");

        if response.is_success() {
            return serde_json::from_slice(&response.body)
                .map_err(|e| ApiError::Decode(e.to_string()));
        }

        match serde_json::from_slice::<ResponseEnvelope<T>>(&response.body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if response.status == 401 => Ok(ResponseEnvelope::new(401, None, None)),
            Err(_) => Err(status_error(&response)),
        }
    }

    /// Send a request that answers with raw bytes (file downloads).
    #[instrument(skip(self, request), fields(method = request.method.as_str(), path = %request.path))]
    pub async fn download(&self, request: ApiRequest) -> Result<Bytes> {
        let response = self.execute(request).await?;

        match response.status {
            429 => {
                warn!(reason = ?response.header("X-Reason"), "Download quota exhausted");
                Err(ApiError::QuotaExceeded)
            }
            _ if response.is_success() => {
                debug!(bytes = response.body.len(), "Download complete");
                Ok(response.body)
            }
            _ => Err(status_error(&response)),
        }
    }
}

fn status_error(response: &HttpResponse) -> ApiError {
    ApiError::Status {
        status: response.status,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    }
}

/// `key=value` pairs joined with `&`, credential values redacted.
fn loggable_query(query: &[(String, String)]) -> String {
    query
        .iter()
        .map(|(key, value)| format!("{key}={}", redact_if_sensitive(key, value)))
        .collect::<Vec<_>>()
        .join("&")
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
