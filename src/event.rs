//! Event records and property values.
//!
//! An [`Event`] is the unit handed to a [`Consumer`](crate::consumer::Consumer)
//! and serialized onto the wire. Property values are restricted to the six
//! types the collection endpoint accepts, modeled as the [`PropertyValue`]
//! sum type so anything else is rejected at construction time.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Kind of record sent to the collection endpoint.
///
/// Track-family kinds (`Track`, `TrackSignup`) describe timestamped behavior
/// and carry an event name; the profile kinds mutate persistent per-subject
/// attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Track,
    TrackSignup,
    ProfileSet,
    ProfileSetOnce,
    ProfileIncrement,
    ProfileAppend,
    ProfileUnset,
}

impl EventType {
    /// Whether super properties are merged into this kind of record.
    pub fn is_track_family(&self) -> bool {
        matches!(self, EventType::Track | EventType::TrackSignup)
    }

    /// SDK method tag reported in `$lib_detail`.
    pub(crate) fn method_name(&self) -> &'static str {
        match self {
            EventType::Track => "track",
            EventType::TrackSignup => "track_signup",
            EventType::ProfileSet => "profile_set",
            EventType::ProfileSetOnce => "profile_set_once",
            EventType::ProfileIncrement => "profile_increment",
            EventType::ProfileAppend => "profile_append",
            EventType::ProfileUnset => "profile_unset",
        }
    }
}

/// A property value accepted by the collection endpoint.
///
/// Serializes untagged: numbers, strings, booleans and string lists map to
/// their JSON counterparts, datetimes to `YYYY-MM-DD HH:MM:SS.mmm` text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    DateTime(#[serde(serialize_with = "serialize_datetime")] DateTime<Utc>),
    List(Vec<String>),
}

impl PropertyValue {
    /// Human-readable type name used in validation messages.
    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Int(_) => "Integer",
            PropertyValue::Float(_) => "Float",
            PropertyValue::String(_) => "String",
            PropertyValue::Bool(_) => "Bool",
            PropertyValue::DateTime(_) => "DateTime",
            PropertyValue::List(_) => "List",
        }
    }
}

/// Render a datetime in the fixed millisecond-precision form the endpoint
/// stores verbatim.
pub(crate) fn format_datetime(datetime: &DateTime<Utc>) -> String {
    datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

fn serialize_datetime<S>(datetime: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_datetime(datetime))
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(value as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(value: DateTime<Utc>) -> Self {
        PropertyValue::DateTime(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        PropertyValue::List(value)
    }
}

impl From<Vec<&str>> for PropertyValue {
    fn from(value: Vec<&str>) -> Self {
        PropertyValue::List(value.into_iter().map(String::from).collect())
    }
}

/// Ordered mapping from property key to [`PropertyValue`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, PropertyValue>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chainable insert, for building property sets inline.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.0.iter()
    }

    /// Overlay `other` onto `self`; `other` wins on key collision.
    pub fn extend(&mut self, other: Properties) {
        self.0.extend(other.0);
    }
}

impl IntoIterator for Properties {
    type Item = (String, PropertyValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, PropertyValue)> for Properties {
    fn from_iter<T: IntoIterator<Item = (String, PropertyValue)>>(iter: T) -> Self {
        Properties(iter.into_iter().collect())
    }
}

/// Fixed diagnostic fields describing the SDK that produced an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibProperties {
    #[serde(rename = "$lib")]
    pub lib: String,
    #[serde(rename = "$lib_version")]
    pub lib_version: String,
    #[serde(rename = "$lib_method")]
    pub lib_method: String,
    #[serde(rename = "$lib_detail")]
    pub lib_detail: String,
    #[serde(rename = "$app_version", skip_serializing_if = "Option::is_none")]
    pub app_version: Option<PropertyValue>,
}

/// A fully validated, normalized record ready for transmission.
///
/// Produced by [`EventBuilder`](crate::builder::EventBuilder); field order
/// matches the wire format expected by the collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventType,
    /// Milliseconds since epoch.
    pub time: i64,
    pub distinct_id: String,
    pub properties: Properties,
    pub lib: LibProperties,
    /// Event name, present only on track-family records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Pre-signup id, present only on `track_signup` records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,
}
