//! AtomPub client module.
//!
//! This module provides the HTTP client that talks to an AtomPub service
//! endpoint. It wraps the `reqwest` crate and adds basic authentication,
//! status checking and a per-client cache of parsed service documents.

mod client;
mod config;

pub use client::AtomPubClient;
pub use config::{AtomPubConfig, DEFAULT_TIMEOUT_SECS};
