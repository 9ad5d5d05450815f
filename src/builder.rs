//! Assembly of validated, normalized [`Event`] records.
//!
//! [`EventBuilder`] takes the raw arguments of a tracking call, runs the
//! naming and typing rules, merges super properties, resolves the record
//! timestamp and fills in the library metadata. Consumers only ever see
//! records that came out of [`EventBuilder::build`].

use crate::error::{Result, SensorsAnalyticsError};
use crate::event::{format_datetime, Event, EventType, LibProperties, Properties, PropertyValue};
use crate::validate::{validate_key, validate_key_with_pattern, validate_properties, KeyKind};
use chrono::Utc;
use std::panic::Location;

/// Fixed event name carried by every `track_signup` record.
pub const SIGNUP_EVENT_NAME: &str = "$SignUp";

/// Property key holding a caller-supplied record timestamp.
const TIME_PROPERTY: &str = "$time";

/// Super-property key propagated into the library metadata.
const APP_VERSION_PROPERTY: &str = "$app_version";

/// Builder for a single event record.
///
/// ```
/// use sensors_analytics_sdk::builder::EventBuilder;
/// use sensors_analytics_sdk::event::{EventType, Properties};
///
/// let event = EventBuilder::new(EventType::Track, "abcdefg")
///     .event_name("DemoStart")
///     .properties(Properties::new().with("sex", "male").with("age", 123))
///     .build()
///     .unwrap();
///
/// assert_eq!(event.event.as_deref(), Some("DemoStart"));
/// ```
#[derive(Debug, Clone)]
pub struct EventBuilder {
    kind: EventType,
    distinct_id: String,
    origin_distinct_id: Option<String>,
    event_name: Option<String>,
    properties: Properties,
    super_properties: Properties,
}

impl EventBuilder {
    pub fn new(kind: EventType, distinct_id: impl Into<String>) -> Self {
        Self {
            kind,
            distinct_id: distinct_id.into(),
            origin_distinct_id: None,
            event_name: None,
            properties: Properties::new(),
            super_properties: Properties::new(),
        }
    }

    /// Pre-signup id; only meaningful for [`EventType::TrackSignup`].
    pub fn origin_distinct_id(mut self, id: impl Into<String>) -> Self {
        self.origin_distinct_id = Some(id.into());
        self
    }

    /// Event name; required for [`EventType::Track`].
    pub fn event_name(mut self, name: impl Into<String>) -> Self {
        self.event_name = Some(name.into());
        self
    }

    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Session-scoped properties merged into track-family records. Caller
    /// properties win on key collision.
    pub fn super_properties(mut self, super_properties: Properties) -> Self {
        self.super_properties = super_properties;
        self
    }

    /// Validate and normalize into an [`Event`].
    ///
    /// Fails with [`SensorsAnalyticsError::IllegalData`] naming the offending
    /// field on any rule violation. Nothing is transmitted here.
    #[track_caller]
    pub fn build(mut self) -> Result<Event> {
        let location = Location::caller();

        validate_key(KeyKind::DistinctId, &self.distinct_id)?;
        let origin_distinct_id =
            self.origin_distinct_id.clone().unwrap_or_else(|| self.distinct_id.clone());
        validate_key(KeyKind::OriginalDistinctId, &origin_distinct_id)?;

        let event_name = match self.kind {
            EventType::Track => {
                let name = self.event_name.as_deref().ok_or_else(|| {
                    SensorsAnalyticsError::illegal("event_name is required for track")
                })?;
                validate_key_with_pattern(KeyKind::EventName, name)?;
                Some(name.to_string())
            }
            EventType::TrackSignup => Some(SIGNUP_EVENT_NAME.to_string()),
            _ => None,
        };

        validate_properties(self.kind, &self.properties)?;

        // Record timestamp: a $time property with a datetime value wins over
        // the wall clock. The key never reaches the wire either way.
        let time = match self.properties.remove(TIME_PROPERTY) {
            Some(PropertyValue::DateTime(datetime)) => datetime.timestamp_millis(),
            _ => Utc::now().timestamp_millis(),
        };

        let mut properties = if self.kind.is_track_family() {
            self.super_properties.clone()
        } else {
            Properties::new()
        };
        properties.extend(self.properties);

        // Datetime values go out as fixed-format text.
        let properties: Properties = properties
            .into_iter()
            .map(|(key, value)| match value {
                PropertyValue::DateTime(datetime) => {
                    (key, PropertyValue::String(format_datetime(&datetime)))
                }
                other => (key, other),
            })
            .collect();

        let lib = LibProperties {
            lib: crate::LIB_NAME.to_string(),
            lib_version: crate::VERSION.to_string(),
            lib_method: "code".to_string(),
            lib_detail: format!(
                "##{}##{}##{}",
                self.kind.method_name(),
                location.file(),
                location.line()
            ),
            app_version: self.super_properties.get(APP_VERSION_PROPERTY).cloned(),
        };

        let original_id = match self.kind {
            EventType::TrackSignup => Some(origin_distinct_id),
            _ => None,
        };

        Ok(Event {
            kind: self.kind,
            time,
            distinct_id: self.distinct_id,
            properties,
            lib,
            event: event_name,
            original_id,
        })
    }
}
