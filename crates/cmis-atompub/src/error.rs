//! Internal error types for cmis-atompub.

use cmis_core::ErrorKind;
use thiserror::Error;

/// Result type alias for cmis-atompub operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Internal error type for cmis-atompub operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Response body is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    /// A link or template produced an invalid URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
    /// Server answered with a non-success status.
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    /// Response is well-formed but misses required AtomPub elements.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// CMIS exception name reported in a status body, lowercased.
    pub(crate) fn exception(&self) -> Option<String> {
        match self {
            Self::Status { body, .. } => exception_name(body),
            _ => None,
        }
    }

    /// Converts into a core error, reporting a `versioning` exception as `kind`.
    ///
    /// The exception name alone does not say which check-out state was
    /// wrong; the operation that failed does.
    pub(crate) fn into_versioning(self, kind: ErrorKind) -> cmis_core::Error {
        let versioning = self.exception().as_deref() == Some(VERSIONING_EXCEPTION);
        let mut err = cmis_core::Error::from(self);
        if versioning {
            err.kind = kind;
        }
        err
    }
}

const VERSIONING_EXCEPTION: &str = "versioning";

/// Extracts the name between the `<!--exception-->` markers servers embed
/// in error pages.
fn exception_name(body: &str) -> Option<String> {
    const OPEN: &str = "<!--exception-->";
    const CLOSE: &str = "<!--/exception-->";

    let start = body.find(OPEN)? + OPEN.len();
    let end = start + body[start..].find(CLOSE)?;
    let name = body[start..end].trim();
    (!name.is_empty()).then(|| name.to_ascii_lowercase())
}

/// Maps an HTTP status and the CMIS exception in its body onto an error kind.
pub(crate) fn classify_status(status: u16, body: &str) -> ErrorKind {
    match status {
        400 => classify_exception(body).unwrap_or(ErrorKind::InvalidArgument),
        401 => ErrorKind::Authentication,
        403 => ErrorKind::PermissionDenied,
        404 => ErrorKind::NotFound,
        405 => ErrorKind::NotSupported,
        409 => classify_exception(body).unwrap_or(ErrorKind::InvalidProperty),
        408 | 504 => ErrorKind::Timeout,
        502 | 503 => ErrorKind::Connectivity,
        _ => ErrorKind::Runtime,
    }
}

/// Recognizes CMIS exception names and common server phrasings in an error body.
fn classify_exception(body: &str) -> Option<ErrorKind> {
    let exception = exception_name(body);
    let body = body.to_ascii_lowercase();

    match exception.as_deref() {
        Some("nameconstraintviolation") => return Some(ErrorKind::NameConflict),
        Some("objectnotfound") => return Some(ErrorKind::NotFound),
        Some("invalidargument") => return Some(ErrorKind::InvalidArgument),
        Some("permissiondenied") => return Some(ErrorKind::PermissionDenied),
        Some("notsupported") => return Some(ErrorKind::NotSupported),
        Some(VERSIONING_EXCEPTION) => {
            return Some(checkout_phrase(&body).unwrap_or(ErrorKind::InvalidArgument));
        }
        _ => {}
    }

    let kind = if body.contains("nameconstraintviolation") || body.contains("already exists") {
        ErrorKind::NameConflict
    } else if body.contains("not empty") || body.contains("has children") {
        ErrorKind::NotEmpty
    } else if let Some(kind) = checkout_phrase(&body) {
        kind
    } else if body.contains("invalidargument") {
        ErrorKind::InvalidArgument
    } else if body.contains("constraint") || body.contains("property") {
        ErrorKind::InvalidProperty
    } else {
        return None;
    };
    Some(kind)
}

fn checkout_phrase(body: &str) -> Option<ErrorKind> {
    if body.contains("not checked out") || body.contains("not a private working copy") {
        Some(ErrorKind::NotCheckedOut)
    } else if body.contains("already checked out") || body.contains("is checked out") {
        Some(ErrorKind::AlreadyCheckedOut)
    } else {
        None
    }
}

impl From<Error> for cmis_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    cmis_core::Error::timeout()
                        .with_message(e.to_string())
                        .with_source(e)
                } else if e.is_connect() {
                    cmis_core::Error::connectivity()
                        .with_message("Connection failed")
                        .with_source(e)
                } else if e.is_decode() || e.is_body() {
                    cmis_core::Error::protocol()
                        .with_message(e.to_string())
                        .with_source(e)
                } else {
                    cmis_core::Error::connectivity()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Xml(e) => cmis_core::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
            Error::Url(e) => cmis_core::Error::protocol()
                .with_message(e.to_string())
                .with_source(e),
            Error::Status { status, body } => {
                let message: String = body.trim().chars().take(512).collect();
                cmis_core::Error::new(classify_status(status, &body))
                    .with_message(if message.is_empty() {
                        format!("HTTP {status}")
                    } else {
                        message
                    })
                    .with_context(format!("HTTP {status}"))
            }
            Error::Malformed(message) => cmis_core::Error::protocol().with_message(message),
        }
    }
}
