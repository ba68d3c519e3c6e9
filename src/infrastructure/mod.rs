//! Infrastructure layer
//!
//! - `config`: layered configuration loading
//! - `http`: reqwest-based transport to the simulation server
//! - `logging`: tracing subscriber setup

pub mod config;
pub mod http;
pub mod logging;
