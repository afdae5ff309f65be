//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{FormPart, FormValue, HttpBody, HttpClient, HttpMethod, HttpRequest, HttpResponse},
};
use reqwest::{multipart, Client};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Timeout applied when a request does not carry its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Reqwest-based HTTP client implementation
///
/// Provides HTTP operations with:
/// - Connection pooling via reqwest
/// - Per-request timeouts
/// - Multipart form bodies
///
/// Requests are sent exactly once. Every HTTP status, including 4xx and 5xx,
/// comes back as `Ok(HttpResponse)`.
pub struct ReqwestHttpClient {
    client: Client,
    default_timeout: Duration,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with the default 20 second timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("plantwatch-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                BridgeError::NotAvailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Wrap a preconfigured reqwest client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Convert bridge HttpMethod to reqwest Method
    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
        }
    }

    fn build_form(parts: Vec<FormPart>) -> Result<multipart::Form> {
        let mut form = multipart::Form::new();
        for part in parts {
            form = match part.value {
                FormValue::Text(value) => form.text(part.name, value),
                FormValue::File {
                    file_name,
                    content_type,
                    data,
                } => {
                    let mut file = multipart::Part::bytes(data.to_vec()).file_name(file_name);
                    if let Some(mime) = content_type {
                        file = file.mime_str(&mime).map_err(|e| {
                            BridgeError::OperationFailed(format!("Invalid content type: {}", e))
                        })?;
                    }
                    form.part(part.name, file)
                }
            };
        }
        Ok(form)
    }

    /// Build reqwest request from bridge request
    fn build_request(&self, request: HttpRequest) -> Result<reqwest::RequestBuilder> {
        let method = Self::convert_method(request.method);
        let mut req = self
            .client
            .request(method, &request.url)
            .timeout(request.timeout.unwrap_or(self.default_timeout));

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        match request.body {
            Some(HttpBody::Bytes(body)) => req = req.body(body),
            Some(HttpBody::Multipart(parts)) => req = req.multipart(Self::build_form(parts)?),
            None => {}
        }

        Ok(req)
    }

    fn map_send_error(e: reqwest::Error, timeout: Duration) -> BridgeError {
        if e.is_timeout() {
            BridgeError::Timeout(timeout.as_millis())
        } else if e.is_connect() || e.is_request() || e.is_body() {
            BridgeError::ConnectionFailed(e.without_url().to_string())
        } else {
            BridgeError::OperationFailed(e.without_url().to_string())
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let method = request.method.as_str();
        let url = request.loggable_url().to_owned();

        debug!(method, url = %url, "Executing HTTP request");

        let response = self
            .build_request(request)?
            .send()
            .await
            .map_err(|e| {
                let error = Self::map_send_error(e, timeout);
                warn!(error = %error, url = %url, "HTTP request failed");
                error
            })?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_send_error(e, timeout))?;

        debug!(status, url = %url, bytes = body.len(), "HTTP response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_http_client_creation() {
        assert!(ReqwestHttpClient::new().is_ok());
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Get),
            reqwest::Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Post),
            reqwest::Method::POST
        );
    }

    #[tokio::test]
    async fn test_error_status_is_returned_as_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/info"))
            .and(header("Authorization", "opaque-token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new().unwrap();
        let request = HttpRequest::new(HttpMethod::Get, format!("{}/user/info", server.uri()))
            .authorization("opaque-token");

        let response = client.execute(request).await.unwrap();
        assert_eq!(response.status, 401);
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new().unwrap();
        let request = HttpRequest::new(HttpMethod::Get, server.uri())
            .timeout(Duration::from_millis(50));

        let err = client.execute(request).await.unwrap_err();
        assert!(matches!(err, BridgeError::Timeout(50)));
        assert!(err.is_network_failure());
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_failure() {
        let client = ReqwestHttpClient::new().unwrap();
        let request = HttpRequest::new(HttpMethod::Get, "http://127.0.0.1:9/unreachable");

        let err = client.execute(request).await.unwrap_err();
        assert!(err.is_network_failure());
    }

    #[tokio::test]
    async fn test_multipart_upload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/files/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"code":200}"#))
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new().unwrap();
        let request = HttpRequest::new(HttpMethod::Post, format!("{}/files/upload", server.uri()))
            .multipart(vec![
                FormPart::text("description", "plant survey"),
                FormPart::file("file", "survey.tif", bytes::Bytes::from_static(b"II*\0")),
            ]);

        let response = client.execute(request).await.unwrap();
        assert!(response.is_success());

        let received = server.received_requests().await.unwrap();
        let content_type = received[0]
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data"));
    }
}
