//! Domain layer for the simsync client
//!
//! This module contains the wire models, the uniform error contract and the
//! port traits the infrastructure implements.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ClientError, ClientResult};
