//! Transport port.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

use crate::domain::errors::{ClientError, ClientResult};

/// HTTP verbs used by the resource surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful (2xx) exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code of the response
    pub status: u16,
    /// Decoded JSON body; `None` for empty bodies such as `204 No Content`
    pub body: Option<Value>,
}

impl TransportResponse {
    pub const fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    /// Decode the body into a typed value.
    ///
    /// A missing or mismatched body is a `RequestFailed` carrying the
    /// status of the otherwise successful exchange.
    pub fn decode<T: DeserializeOwned>(self) -> ClientResult<T> {
        let status = self.status;
        let body = self.body.ok_or_else(|| {
            ClientError::request_failed("Expected a response body but none was returned", status)
        })?;
        serde_json::from_value(body).map_err(|err| {
            ClientError::request_failed(format!("Unexpected response shape: {err}"), status)
        })
    }
}

/// Request/response exchanges against named resource paths.
///
/// Implementations normalize every non-2xx outcome and every transport
/// failure into [`ClientError::RequestFailed`]. Paths are relative to the
/// API prefix (e.g. `/simulations/abc/start`).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a JSON request.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ClientResult<TransportResponse>;

    /// Send a single file as `multipart/form-data` (part name `file`).
    async fn upload(
        &self,
        path: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ClientResult<TransportResponse>;
}
