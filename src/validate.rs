//! Naming and typing rules for keys and property values.
//!
//! Every record is checked here before it reaches a consumer, so transport
//! code never sees malformed data. Violations fail fast with
//! [`SensorsAnalyticsError::IllegalData`] on the first offending key or value.

use crate::error::{Result, SensorsAnalyticsError};
use crate::event::{EventType, Properties, PropertyValue};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Maximum length of a distinct id or key, in characters.
pub const MAX_KEY_LENGTH: usize = 255;

/// Maximum length of a string value or list element, in characters.
pub const MAX_STRING_LENGTH: usize = 8192;

/// Names the endpoint reserves for its own schema. Keys and event names must
/// not collide with these (case-sensitive, exact match).
pub const RESERVED_KEYWORDS: &[&str] = &[
    "distinct_id",
    "original_id",
    "time",
    "properties",
    "id",
    "first_id",
    "second_id",
    "users",
    "events",
    "event",
    "user_id",
    "date",
    "datetime",
];

/// What a key is used as, for validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    DistinctId,
    OriginalDistinctId,
    EventName,
    PropertyKey,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyKind::DistinctId => "distinct_id",
            KeyKind::OriginalDistinctId => "origin_distinct_id",
            KeyKind::EventName => "event_name",
            KeyKind::PropertyKey => "property key",
        };
        f.write_str(name)
    }
}

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z_$][a-zA-Z0-9_$]{0,99}$").expect("key pattern is valid")
    })
}

/// Generic key check: non-empty and at most [`MAX_KEY_LENGTH`] characters.
pub fn validate_key(kind: KeyKind, key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(SensorsAnalyticsError::illegal(format!("{kind} is empty")));
    }
    if key.chars().count() > MAX_KEY_LENGTH {
        return Err(SensorsAnalyticsError::illegal(format!(
            "{kind} is too long, max length is {MAX_KEY_LENGTH}"
        )));
    }
    Ok(())
}

/// Strict key check: the generic check plus the naming pattern (letter, `_`
/// or `$` start, then up to 99 letters, digits, `_` or `$`) and the reserved
/// keyword list. Applies to property keys and event names.
pub fn validate_key_with_pattern(kind: KeyKind, key: &str) -> Result<()> {
    validate_key(kind, key)?;
    if !key_pattern().is_match(key) || RESERVED_KEYWORDS.contains(&key) {
        return Err(SensorsAnalyticsError::illegal(format!("{kind} '{key}' is invalid")));
    }
    Ok(())
}

/// Validate a property map for the given event kind.
///
/// Checks run per property, in order: key pattern, value constraints, then
/// the kind-specific constraint (`profile_increment` takes only integers,
/// `profile_append` only string lists).
pub fn validate_properties(kind: EventType, properties: &Properties) -> Result<()> {
    for (key, value) in properties.iter() {
        validate_key_with_pattern(KeyKind::PropertyKey, key)?;
        validate_value(key, value)?;

        match kind {
            EventType::ProfileIncrement => {
                if !matches!(value, PropertyValue::Int(_)) {
                    return Err(SensorsAnalyticsError::illegal(format!(
                        "property '{key}' of profile_increment must be an Integer, got {}",
                        value.type_name()
                    )));
                }
            }
            EventType::ProfileAppend => {
                if !matches!(value, PropertyValue::List(_)) {
                    return Err(SensorsAnalyticsError::illegal(format!(
                        "property '{key}' of profile_append must be a List of String, got {}",
                        value.type_name()
                    )));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_value(key: &str, value: &PropertyValue) -> Result<()> {
    match value {
        PropertyValue::String(s) => {
            if s.chars().count() > MAX_STRING_LENGTH {
                return Err(SensorsAnalyticsError::illegal(format!(
                    "value of property '{key}' is too long, max length is {MAX_STRING_LENGTH}"
                )));
            }
        }
        PropertyValue::List(items) => {
            for item in items {
                if item.chars().count() > MAX_STRING_LENGTH {
                    return Err(SensorsAnalyticsError::illegal(format!(
                        "list element of property '{key}' is too long, max length is {MAX_STRING_LENGTH}"
                    )));
                }
            }
        }
        _ => {}
    }
    Ok(())
}
