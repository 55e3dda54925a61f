/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Task priority. Groups are displayed High, Medium, Low.
///
/// The older server schema calls the middle level `NORMAL`; both spellings
/// parse to [`Priority::Medium`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Spelling understood by the given backend flavor
    pub fn wire_name(self, flavor: ApiFlavor) -> &'static str {
        match (flavor, self) {
            (ApiFlavor::Rest, Priority::High) => "HIGH",
            (ApiFlavor::Rest, Priority::Medium) => "MEDIUM",
            (ApiFlavor::Rest, Priority::Low) => "LOW",
            (ApiFlavor::Script, Priority::High) => "High",
            (ApiFlavor::Script, Priority::Medium) => "Normal",
            (ApiFlavor::Script, Priority::Low) => "Low",
        }
    }

    /// Heading used when listing a priority group
    pub fn heading(self) -> &'static str {
        match self {
            Priority::High => "High Priority",
            Priority::Medium => "Medium Priority",
            Priority::Low => "Low Priority",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name(ApiFlavor::Rest))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePriorityError(pub String);

impl fmt::Display for ParsePriorityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown priority '{}' (expected high, medium or low)", self.0)
    }
}

impl std::error::Error for ParsePriorityError {}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(Priority::High),
            "MEDIUM" | "NORMAL" => Ok(Priority::Medium),
            "LOW" => Ok(Priority::Low),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name(ApiFlavor::Rest))
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Which server script layout the backend exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFlavor {
    /// One script per operation (`get_tasks.php`, `add_task.php`, ...)
    Rest,
    /// Single `tasks.php` script with an `action` discriminator
    #[default]
    Script,
}

/// `action` values accepted by the legacy `tasks.php` script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    Fetch,
    FetchCompleted,
    Add,
    Update,
    SoftDelete,
}

impl TaskAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskAction::Fetch => "fetch",
            TaskAction::FetchCompleted => "fetch_completed",
            TaskAction::Add => "add",
            TaskAction::Update => "update",
            TaskAction::SoftDelete => "soft_delete",
        }
    }
}
