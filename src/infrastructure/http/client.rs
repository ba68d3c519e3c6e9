use async_trait::async_trait;
use reqwest::{header, multipart, Client as ReqwestClient, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::errors::{from_reqwest, from_status};
use crate::domain::errors::{ClientError, ClientResult};
use crate::domain::models::{ApiConfig, HealthResponse, ServiceInfo};
use crate::domain::ports::{Method, Transport, TransportResponse};

/// HTTP transport for the simulation server
///
/// Features:
/// - Connection pooling and reuse (via reqwest::Client)
/// - Per-request timeout
/// - JSON bodies for all calls except the multipart upload
/// - Uniform `RequestFailed` normalization of every failure
///
/// Writes are never retried here.
pub struct HttpTransport {
    http_client: ReqwestClient,
    base_url: String,
    api_prefix: String,
}

impl HttpTransport {
    /// Create a transport for the configured server
    ///
    /// # Example
    /// ```no_run
    /// use simsync::domain::models::ApiConfig;
    /// use simsync::infrastructure::http::HttpTransport;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let transport = HttpTransport::new(&ApiConfig::default())?;
    /// assert_eq!(transport.api_url("/agents"), "http://localhost:8000/api/agents");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = ReqwestClient::builder()
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_nodelay(true)
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::transport(format!("Failed to build HTTP client: {e}")))?;

        debug!(
            base_url = %config.base_url,
            api_prefix = %config.api_prefix,
            timeout_secs = config.timeout_secs,
            "HTTP transport initialized"
        );

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_prefix: normalize_prefix(&config.api_prefix),
        })
    }

    /// Full URL of a resource path under the API prefix.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, ensure_leading_slash(path))
    }

    /// Full URL of a path at the server root.
    pub fn root_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, ensure_leading_slash(path))
    }

    /// `GET /health`
    pub async fn health(&self) -> ClientResult<HealthResponse> {
        self.get_root("/health").await?.decode()
    }

    /// `GET /` - service name, version and backend configuration state.
    pub async fn service_info(&self) -> ClientResult<ServiceInfo> {
        self.get_root("/").await?.decode()
    }

    async fn get_root(&self, path: &str) -> ClientResult<TransportResponse> {
        let url = self.root_url(path);
        debug!("GET {}", url);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| from_reqwest(&e))?;
        handle_response(Method::Get, path, response).await
    }

    fn request_builder(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        match method {
            Method::Get => self.http_client.get(url),
            Method::Post => self.http_client.post(url),
            Method::Put => self.http_client.put(url),
            Method::Delete => self.http_client.delete(url),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, method, body), fields(method = %method))]
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ClientResult<TransportResponse> {
        let url = self.api_url(path);
        debug!("{} {}", method, url);

        let mut builder = self.request_builder(method, &url);
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            let err = from_reqwest(&e);
            warn!(method = %method, path, error = %err, "Request failed before a response");
            err
        })?;

        handle_response(method, path, response).await
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        path: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ClientResult<TransportResponse> {
        let url = self.api_url(path);
        debug!("POST {} (multipart, file={})", url, file_name);

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/json")
            .map_err(|e| from_reqwest(&e))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                let err = from_reqwest(&e);
                warn!(path, error = %err, "Upload failed before a response");
                err
            })?;

        handle_response(Method::Post, path, response).await
    }
}

/// Convert an HTTP response into the uniform success/failure contract.
async fn handle_response(
    method: Method,
    path: &str,
    response: Response,
) -> ClientResult<TransportResponse> {
    let status = response.status();
    debug!(method = %method, path, status = status.as_u16(), "Response received");

    let bytes = response.bytes().await.map_err(|e| from_reqwest(&e))?;

    if !status.is_success() {
        let err = from_status(status, &String::from_utf8_lossy(&bytes));
        warn!(
            method = %method,
            path,
            status = status.as_u16(),
            error = %err,
            "Request rejected by server"
        );
        return Err(err);
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(TransportResponse::new(status.as_u16(), None));
    }

    let body: Value = serde_json::from_slice(&bytes).map_err(|e| {
        ClientError::request_failed(
            format!("Response body is not valid JSON: {e}"),
            status.as_u16(),
        )
    })?;

    Ok(TransportResponse::new(status.as_u16(), Some(body)))
}

fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        ensure_leading_slash(trimmed)
    }
}
