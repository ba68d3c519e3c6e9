//! HTTP transport infrastructure
//!
//! reqwest-backed implementation of the `Transport` port:
//! - JSON request/response exchanges
//! - Multipart file upload
//! - Normalization of every failure into `RequestFailed`

pub mod client;
pub mod errors;

pub use client::HttpTransport;
