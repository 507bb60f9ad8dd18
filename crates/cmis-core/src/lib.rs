#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for the in-memory repository.
pub const TRACING_TARGET_MEMORY: &str = "cmis_core::memory";

mod binding;
mod error;
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod memory;
#[doc(hidden)]
pub mod prelude;
pub mod types;

pub use binding::{BulkUpdateEntry, CmisBinding, merge_secondary_types};
pub use error::{BoxedError, Error, ErrorKind, PartialFailure, Result};
