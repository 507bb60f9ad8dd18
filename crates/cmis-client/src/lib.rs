#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for session operations.
pub const TRACING_TARGET: &str = "cmis_client::session";

/// Tracing target for repository discovery and session creation.
pub const TRACING_TARGET_FACTORY: &str = "cmis_client::factory";

mod context;
mod factory;
mod object;
mod pager;
mod parameters;
#[doc(hidden)]
pub mod prelude;
mod session;

pub use cmis_core::{Error, ErrorKind, PartialFailure, Result};

pub use crate::context::OperationContext;
pub use crate::factory::SessionFactory;
pub use crate::object::{AsObjectId, CmisObject, Document, Folder, ObjectFactory, ObjectHandle};
pub use crate::pager::{ItemIterable, ItemStream};
pub use crate::parameters::{BindingKind, ConnectionParameters};
pub use crate::session::Session;
