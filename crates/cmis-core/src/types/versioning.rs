//! Versioning inputs.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use super::{ContentStream, Properties};

/// Version state a new document is created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VersioningState {
    /// The document is not versionable.
    None,
    /// First version is a major version (`1.0`).
    #[default]
    Major,
    /// First version is a minor version (`0.1`).
    Minor,
    /// The document is created as a private working copy.
    CheckedOut,
}

/// Everything a check-in sends to the server.
#[derive(Debug, Default)]
pub struct CheckIn {
    /// Whether the new version is a major version.
    pub major: bool,
    /// Properties to set on the new version.
    pub properties: Option<Properties>,
    /// Content of the new version; the PWC content is kept when absent.
    pub content: Option<ContentStream>,
    /// Check-in comment recorded on the new version.
    pub comment: String,
}

impl CheckIn {
    pub fn new(major: bool, comment: impl Into<String>) -> Self {
        Self {
            major,
            comment: comment.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: ContentStream) -> Self {
        self.content = Some(content);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names() {
        assert_eq!(VersioningState::CheckedOut.as_ref(), "checkedout");
        assert_eq!("major".parse::<VersioningState>().unwrap(), VersioningState::Major);
    }
}
