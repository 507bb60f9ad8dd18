#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for AtomPub client operations.
pub const TRACING_TARGET: &str = "cmis_atompub::client";

mod connect;
mod error;
mod service;
mod xml;

pub use crate::connect::{AtomPubClient, AtomPubConfig, DEFAULT_TIMEOUT_SECS};
pub use crate::error::{Error, Result};
