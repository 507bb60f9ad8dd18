//! Typed property values and property definitions.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Well-known CMIS property ids.
pub mod property_ids {
    pub const NAME: &str = "cmis:name";
    pub const DESCRIPTION: &str = "cmis:description";
    pub const OBJECT_ID: &str = "cmis:objectId";
    pub const OBJECT_TYPE_ID: &str = "cmis:objectTypeId";
    pub const BASE_TYPE_ID: &str = "cmis:baseTypeId";
    pub const SECONDARY_OBJECT_TYPE_IDS: &str = "cmis:secondaryObjectTypeIds";
    pub const CREATED_BY: &str = "cmis:createdBy";
    pub const CREATION_DATE: &str = "cmis:creationDate";
    pub const LAST_MODIFIED_BY: &str = "cmis:lastModifiedBy";
    pub const LAST_MODIFICATION_DATE: &str = "cmis:lastModificationDate";
    pub const CHANGE_TOKEN: &str = "cmis:changeToken";
    pub const PARENT_ID: &str = "cmis:parentId";
    pub const PATH: &str = "cmis:path";
    pub const IS_IMMUTABLE: &str = "cmis:isImmutable";
    pub const IS_LATEST_VERSION: &str = "cmis:isLatestVersion";
    pub const IS_MAJOR_VERSION: &str = "cmis:isMajorVersion";
    pub const IS_LATEST_MAJOR_VERSION: &str = "cmis:isLatestMajorVersion";
    pub const IS_PRIVATE_WORKING_COPY: &str = "cmis:isPrivateWorkingCopy";
    pub const VERSION_LABEL: &str = "cmis:versionLabel";
    pub const VERSION_SERIES_ID: &str = "cmis:versionSeriesId";
    pub const IS_VERSION_SERIES_CHECKED_OUT: &str = "cmis:isVersionSeriesCheckedOut";
    pub const VERSION_SERIES_CHECKED_OUT_BY: &str = "cmis:versionSeriesCheckedOutBy";
    pub const VERSION_SERIES_CHECKED_OUT_ID: &str = "cmis:versionSeriesCheckedOutId";
    pub const CHECKIN_COMMENT: &str = "cmis:checkinComment";
    pub const CONTENT_STREAM_LENGTH: &str = "cmis:contentStreamLength";
    pub const CONTENT_STREAM_MIME_TYPE: &str = "cmis:contentStreamMimeType";
    pub const CONTENT_STREAM_FILE_NAME: &str = "cmis:contentStreamFileName";
    pub const CONTENT_STREAM_ID: &str = "cmis:contentStreamId";
}

/// Primitive data type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Id,
    Integer,
    Decimal,
    Boolean,
    DateTime,
    Uri,
    Html,
}

/// Whether a property holds one value or a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    Single,
    Multi,
}

/// When a property may be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Updatability {
    /// Maintained by the repository.
    ReadOnly,
    /// Writable at any time.
    #[default]
    ReadWrite,
    /// Writable only on a private working copy.
    WhenCheckedOut,
    /// Writable only when the object is created.
    OnCreate,
}

/// Tagged property value.
///
/// Multi-valued properties use [`PropertyValue::List`], whose elements all
/// share one scalar type. Lists never nest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    String(String),
    Id(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    DateTime(Timestamp),
    Uri(String),
    Html(String),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Builds a multi-valued id property.
    pub fn id_list<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(ids.into_iter().map(|id| Self::Id(id.into())).collect())
    }

    /// Returns the scalar type, or the element type of a non-empty list.
    ///
    /// Returns `None` for an empty list.
    pub fn property_type(&self) -> Option<PropertyType> {
        match self {
            Self::String(_) => Some(PropertyType::String),
            Self::Id(_) => Some(PropertyType::Id),
            Self::Integer(_) => Some(PropertyType::Integer),
            Self::Decimal(_) => Some(PropertyType::Decimal),
            Self::Boolean(_) => Some(PropertyType::Boolean),
            Self::DateTime(_) => Some(PropertyType::DateTime),
            Self::Uri(_) => Some(PropertyType::Uri),
            Self::Html(_) => Some(PropertyType::Html),
            Self::List(values) => values.first().and_then(Self::property_type),
        }
    }

    /// Returns true for multi-valued properties.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Returns the textual content of string-like scalars.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) | Self::Id(v) | Self::Uri(v) | Self::Html(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value of a boolean scalar.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value of an integer scalar.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value of a date-time scalar.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the scalars of this value: the list elements, or the value itself.
    pub fn values(&self) -> &[PropertyValue] {
        match self {
            Self::List(values) => values,
            scalar => std::slice::from_ref(scalar),
        }
    }

    /// Renders a scalar the way it travels on the wire.
    ///
    /// Lists render as their elements joined by `,`.
    pub fn to_wire_string(&self) -> String {
        match self {
            Self::String(v) | Self::Id(v) | Self::Uri(v) | Self::Html(v) => v.clone(),
            Self::Integer(v) => v.to_string(),
            Self::Decimal(v) => v.to_string(),
            Self::Boolean(v) => v.to_string(),
            Self::DateTime(v) => v.to_string(),
            Self::List(values) => values
                .iter()
                .map(Self::to_wire_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Parses a single wire scalar of the given type.
    pub fn parse_scalar(property_type: PropertyType, raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let value = match property_type {
            PropertyType::String => Self::String(raw.to_owned()),
            PropertyType::Id => Self::Id(raw.to_owned()),
            PropertyType::Uri => Self::Uri(raw.to_owned()),
            PropertyType::Html => Self::Html(raw.to_owned()),
            PropertyType::Integer => Self::Integer(raw.parse().ok()?),
            PropertyType::Decimal => Self::Decimal(raw.parse().ok()?),
            PropertyType::Boolean => Self::Boolean(raw.parse().ok()?),
            PropertyType::DateTime => Self::DateTime(raw.parse().ok()?),
        };
        Some(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Timestamp> for PropertyValue {
    fn from(value: Timestamp) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Schema entry describing one property of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    /// Property id, e.g. `cmis:name`.
    pub id: String,
    /// Human readable name.
    pub display_name: String,
    /// Data type of each value.
    pub property_type: PropertyType,
    /// Single or multi valued.
    pub cardinality: Cardinality,
    /// When the property may be written.
    pub updatability: Updatability,
    /// Whether a value must be supplied on create.
    pub required: bool,
}

impl PropertyDefinition {
    /// Creates a single-valued, read-write, optional property definition.
    pub fn new(id: impl Into<String>, property_type: PropertyType) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            property_type,
            cardinality: Cardinality::Single,
            updatability: Updatability::ReadWrite,
            required: false,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Sets the cardinality.
    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Sets the updatability.
    #[must_use]
    pub fn with_updatability(mut self, updatability: Updatability) -> Self {
        self.updatability = updatability;
        self
    }

    /// Marks the property as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}
