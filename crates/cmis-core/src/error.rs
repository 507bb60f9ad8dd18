//! Structured error handling for CMIS operations.

use std::collections::{BTreeMap, BTreeSet};

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

use crate::types::ObjectId;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while talking to a CMIS repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The service endpoint could not be reached.
    Connectivity,
    /// The credentials were rejected.
    Authentication,
    /// The credentials were accepted but the operation is not permitted.
    PermissionDenied,
    /// The requested repository id does not exist on the server.
    RepositoryNotFound,
    /// The requested type id is not registered in the repository.
    UnknownType,
    /// The object id is stale, deleted or was never valid.
    NotFound,
    /// A sibling with the same name already exists.
    NameConflict,
    /// A property is undefined, mistyped or not updatable.
    InvalidProperty,
    /// A folder still has children.
    NotEmpty,
    /// The version series already has a private working copy.
    AlreadyCheckedOut,
    /// The object is not a private working copy.
    NotCheckedOut,
    /// A multi-object operation applied to some objects only.
    PartialFailure,
    /// A caller-supplied argument is malformed.
    InvalidArgument,
    /// The operation is not supported by the binding or repository.
    NotSupported,
    /// The operation did not finish before its deadline.
    Timeout,
    /// The operation was cancelled by the caller.
    Cancelled,
    /// The server response violated the protocol.
    Protocol,
    /// Serialization/deserialization error.
    Serialization,
    /// Configuration error.
    Configuration,
    /// Unclassified server-side failure.
    #[default]
    Runtime,
}

impl ErrorKind {
    /// Check if this error kind is typically retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Connectivity | Self::Timeout)
    }

    /// Check if this error kind can leave a server-side change in an unknown state.
    #[must_use]
    pub const fn is_interruption(&self) -> bool {
        matches!(self, Self::Timeout | Self::Cancelled)
    }
}

/// Per-object outcome of a non-atomic bulk operation.
#[derive(Debug, Default)]
pub struct PartialFailure {
    /// Objects the operation was applied to.
    pub succeeded: BTreeSet<ObjectId>,
    /// Objects the operation failed on, with the reason.
    pub failed: BTreeMap<ObjectId, Error>,
}

impl PartialFailure {
    /// Returns true if no object failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Structured error type with classification and context tracking.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}]{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Primary error message.
    pub message: Option<String>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
    /// Additional context information.
    pub context: Option<String>,
    /// Set when a mutating call was interrupted and its outcome is unknown.
    pub indeterminate: bool,
    /// Per-object outcomes for [`ErrorKind::PartialFailure`].
    pub partial: Option<Box<PartialFailure>>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
            context: None,
            indeterminate: false,
            partial: None,
        }
    }

    /// Creates a new error from a source error.
    pub fn from_source(kind: ErrorKind, source: impl Into<BoxedError>) -> Self {
        Self::new(kind).with_source(source)
    }

    /// Creates a partial failure error carrying the per-object outcomes.
    pub fn partial_failure(outcome: PartialFailure) -> Self {
        let message = format!(
            "{} of {} objects failed",
            outcome.failed.len(),
            outcome.failed.len() + outcome.succeeded.len()
        );

        let mut error = Self::new(ErrorKind::PartialFailure).with_message(message);
        error.partial = Some(Box::new(outcome));
        error
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds context to the error.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Marks the outcome of the failed operation as unknown.
    pub fn into_indeterminate(mut self) -> Self {
        self.indeterminate = true;
        self
    }

    /// Creates a new connectivity error.
    pub fn connectivity() -> Self {
        Self::new(ErrorKind::Connectivity)
    }

    /// Creates a new authentication error.
    pub fn authentication() -> Self {
        Self::new(ErrorKind::Authentication)
    }

    /// Creates a new permission denied error.
    pub fn permission_denied() -> Self {
        Self::new(ErrorKind::PermissionDenied)
    }

    /// Creates a new repository not found error.
    pub fn repository_not_found() -> Self {
        Self::new(ErrorKind::RepositoryNotFound)
    }

    /// Creates a new unknown type error.
    pub fn unknown_type() -> Self {
        Self::new(ErrorKind::UnknownType)
    }

    /// Creates a new not found error.
    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    /// Creates a new name conflict error.
    pub fn name_conflict() -> Self {
        Self::new(ErrorKind::NameConflict)
    }

    /// Creates a new invalid property error.
    pub fn invalid_property() -> Self {
        Self::new(ErrorKind::InvalidProperty)
    }

    /// Creates a new not empty error.
    pub fn not_empty() -> Self {
        Self::new(ErrorKind::NotEmpty)
    }

    /// Creates a new already checked out error.
    pub fn already_checked_out() -> Self {
        Self::new(ErrorKind::AlreadyCheckedOut)
    }

    /// Creates a new not checked out error.
    pub fn not_checked_out() -> Self {
        Self::new(ErrorKind::NotCheckedOut)
    }

    /// Creates a new invalid argument error.
    pub fn invalid_argument() -> Self {
        Self::new(ErrorKind::InvalidArgument)
    }

    /// Creates a new not supported error.
    pub fn not_supported() -> Self {
        Self::new(ErrorKind::NotSupported)
    }

    /// Creates a new timeout error.
    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout)
    }

    /// Creates a new cancelled error.
    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled)
    }

    /// Creates a new protocol error.
    pub fn protocol() -> Self {
        Self::new(ErrorKind::Protocol)
    }

    /// Creates a new serialization error.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Creates a new configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Creates a new runtime error.
    pub fn runtime() -> Self {
        Self::new(ErrorKind::Runtime)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Check if this error is retryable based on its kind.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Returns true if the server-side effect of the failed call is unknown.
    ///
    /// Callers must re-query the affected objects before assuming anything.
    #[must_use]
    pub const fn is_indeterminate(&self) -> bool {
        self.indeterminate
    }

    /// Returns the per-object outcomes of a partial failure.
    pub fn partial_failure_details(&self) -> Option<&PartialFailure> {
        self.partial.as_deref()
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::from_source(ErrorKind::Runtime, error).with_message("I/O operation failed")
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(error: std::string::FromUtf8Error) -> Self {
        Self::from_source(ErrorKind::Serialization, error).with_message("Invalid UTF-8 encoding")
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_error_new() {
        let error = Error::new(ErrorKind::Runtime);
        assert_eq!(error.kind, ErrorKind::Runtime);
        assert!(error.message.is_none());
        assert!(error.source.is_none());
        assert!(!error.is_indeterminate());
        assert!(error.partial_failure_details().is_none());
    }

    #[test]
    fn test_error_builder_pattern() {
        let error = Error::name_conflict()
            .with_message("sibling named 'a' exists")
            .with_context("create_folder");

        assert_eq!(error.kind(), ErrorKind::NameConflict);
        assert_eq!(error.message.as_deref(), Some("sibling named 'a' exists"));
        assert_eq!(error.context.as_deref(), Some("create_folder"));
    }

    #[test]
    fn test_error_display() {
        let error = Error::already_checked_out().with_message("doc-1");
        let display = error.to_string();
        assert!(display.contains("already_checked_out"));
        assert!(display.contains("doc-1"));
    }

    #[test]
    fn test_indeterminate_marker() {
        let error = Error::timeout().into_indeterminate();
        assert!(error.is_indeterminate());
        assert!(error.kind.is_interruption());
    }

    #[test]
    fn test_partial_failure_counts() {
        let mut outcome = PartialFailure::default();
        outcome.succeeded.insert(ObjectId::new("a"));
        outcome.failed.insert(ObjectId::new("b"), Error::not_found());

        let error = Error::partial_failure(outcome);
        assert_eq!(error.kind, ErrorKind::PartialFailure);
        assert_eq!(error.message.as_deref(), Some("1 of 2 objects failed"));

        let details = error.partial_failure_details().unwrap();
        assert!(!details.is_complete());
        assert!(details.failed.contains_key(&ObjectId::new("b")));
    }

    #[test]
    fn test_from_str() {
        assert_eq!(ErrorKind::from_str("not_found").unwrap(), ErrorKind::NotFound);
        assert_eq!(
            ErrorKind::from_str("already_checked_out").unwrap(),
            ErrorKind::AlreadyCheckedOut
        );
        assert!(ErrorKind::from_str("bogus").is_err());
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorKind::Connectivity.is_retryable());
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(!ErrorKind::Authentication.is_retryable());
        assert!(!ErrorKind::NameConflict.is_retryable());
        assert!(!ErrorKind::Cancelled.is_retryable());
    }
}
