// Domain types shared by the agent, the state store and both front ends
//
// Everything here is deserialized from model output at some point, so the
// types accept missing fields, nulls, numbers-as-strings and unknown enum
// values instead of rejecting the whole response.

/// Serde helpers for sloppy JSON
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Number, numeric string, or null (-> 0.0). "20%" and "5h" are accepted.
    pub fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => parse_loose_number(&s).unwrap_or(0.0),
            _ => 0.0,
        })
    }

    /// String, number, or null (-> "").
    pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    /// Array of strings; null or a single string are tolerated.
    pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
            Value::String(s) if !s.trim().is_empty() => vec![s],
            _ => Vec::new(),
        })
    }

    /// Array of objects; entries that are not objects or fail to decode are
    /// dropped. Anything other than an array yields an empty list.
    pub fn object_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: serde::de::DeserializeOwned,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => decode_objects(items),
            _ => Vec::new(),
        })
    }

    pub(crate) fn decode_objects<T: serde::de::DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
        items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    tracing::debug!("Skipping malformed entry: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Percentage clamped into 0..=100; null or junk reads as 0.
    pub fn percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => parse_loose_number(&s).unwrap_or(0.0),
            _ => 0.0,
        };
        Ok(value.round().clamp(0.0, 100.0) as u8)
    }

    pub(crate) fn parse_loose_number(s: &str) -> Option<f64> {
        let trimmed: String = s
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();
        trimmed.parse().ok()
    }
}

/// Declares a lowercase string enum with a catch-all variant.
///
/// Unknown or differently-cased input, null and non-string values all map
/// onto the catch-all instead of failing deserialization.
macro_rules! loose_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? } else $fallback:ident => $fallback_text:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            $fallback,
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                    Self::$fallback => $fallback_text,
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($text => Self::$variant,)+
                    _ => Self::$fallback,
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                Ok(match <serde_json::Value as serde::Deserialize>::deserialize(deserializer)? {
                    serde_json::Value::String(s) => Self::from(s),
                    _ => Self::$fallback,
                })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

mod course;
mod notification;
mod schedule;
mod workload;

pub use course::{Assignment, AssignmentKind, Course, CourseSource};
pub use notification::{sort_feed, Notification, NotificationKind, Urgency};
pub use schedule::{Priority, StudySchedule, StudyTask};
pub use workload::{RiskLevel, WorkloadAnalysis};
