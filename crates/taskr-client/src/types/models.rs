/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::Priority;

/// Timestamp layout used by the MySQL backend
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A task row as the server reports it.
///
/// Accepts both the current column names and the legacy `tasks.php` ones
/// (`task_title`, `task_description`, `is_soft_deleted`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(deserialize_with = "serde_helpers::deserialize_lenient_i64")]
    pub id: i64,
    #[serde(deserialize_with = "serde_helpers::deserialize_lenient_i64")]
    pub user_id: i64,
    #[serde(alias = "task_title")]
    pub title: String,
    #[serde(
        default,
        alias = "task_description",
        deserialize_with = "serde_helpers::deserialize_optional_text"
    )]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_priority")]
    pub priority: Priority,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_lenient_i64"
    )]
    pub order: i64,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_flag",
        serialize_with = "serde_helpers::serialize_flag"
    )]
    pub is_completed: bool,
    #[serde(
        default,
        alias = "is_soft_deleted",
        deserialize_with = "serde_helpers::deserialize_flag",
        serialize_with = "serde_helpers::serialize_flag"
    )]
    pub is_deleted: bool,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_optional_text")]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_optional_text")]
    pub completed_at: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_optional_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_optional_text")]
    pub updated_at: Option<String>,
}

impl Task {
    /// Visible in the active list
    pub fn is_active(&self) -> bool {
        !self.is_completed && !self.is_deleted
    }

    /// Visible in the completed history
    pub fn is_in_history(&self) -> bool {
        self.is_completed && !self.is_deleted
    }

    /// Parsed completion time; `None` when absent or unparsable
    /// (MySQL zero dates included).
    pub fn completed_time(&self) -> Option<NaiveDateTime> {
        self.completed_at
            .as_deref()
            .and_then(|raw| NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok())
    }
}

/// Logged-in user returned by `login.php`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

pub(crate) mod serde_helpers {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::types::enums::Priority;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
    }

    pub fn deserialize_lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Loose::deserialize(deserializer)? {
            Loose::Int(value) => Ok(value),
            Loose::Float(value) if value.fract() == 0.0 => Ok(value as i64),
            Loose::Text(value) => value
                .trim()
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("expected integer, got '{value}'"))),
            Loose::Float(value) => Err(serde::de::Error::custom(format!(
                "expected integer, got {value}"
            ))),
            Loose::Bool(_) => Err(serde::de::Error::custom("expected integer, got boolean")),
        }
    }

    /// 0/1 flags arrive as numbers, strings or booleans depending on the
    /// server script; null means unset.
    pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Loose>::deserialize(deserializer)? {
            None => Ok(false),
            Some(Loose::Bool(value)) => Ok(value),
            Some(Loose::Int(value)) => Ok(value != 0),
            Some(Loose::Float(value)) => Ok(value != 0.0),
            Some(Loose::Text(value)) => match value.trim() {
                "1" | "true" | "TRUE" => Ok(true),
                "0" | "false" | "FALSE" | "" => Ok(false),
                other => Err(serde::de::Error::custom(format!(
                    "expected 0/1 flag, got '{other}'"
                ))),
            },
        }
    }

    pub fn serialize_flag<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*value))
    }

    /// Null or blank priority falls back to the default (medium)
    pub fn deserialize_priority<'de, D>(deserializer: D) -> Result<Priority, D::Error>
    where
        D: Deserializer<'de>,
    {
        match deserialize_optional_text(deserializer)? {
            Some(raw) => raw.parse().map_err(serde::de::Error::custom),
            None => Ok(Priority::default()),
        }
    }

    pub fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|text| !text.trim().is_empty()))
    }
}
