/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust response structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

use super::models::{serde_helpers, Task, User};

/// `{"success": bool, "message": "..."}` wrapper used by the PHP scripts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(deserialize_with = "serde_helpers::deserialize_flag")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Envelope carrying a task list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasksEnvelope {
    #[serde(deserialize_with = "serde_helpers::deserialize_flag")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// `get_tasks.php` answers with a bare array; some deployments wrap it
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TaskListResponse {
    Bare(Vec<Task>),
    Wrapped(TasksEnvelope),
}

/// `login.php` answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(deserialize_with = "serde_helpers::deserialize_flag")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Older scripts nest the profile under `user`
    #[serde(default)]
    pub user: Option<LegacyUser>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyUser {
    #[serde(deserialize_with = "serde_helpers::deserialize_lenient_i64")]
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl LoginResponse {
    /// Profile of the logged-in user, whichever layout the script used
    pub fn into_user(self, fallback_email: &str) -> Option<User> {
        if let Some(id) = self.user_id {
            return Some(User {
                id,
                username: self.username.unwrap_or_default(),
                email: self.email.unwrap_or_else(|| fallback_email.to_string()),
            });
        }
        self.user.map(|user| User {
            id: user.id,
            username: user.name,
            email: user.email,
        })
    }
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "serde_helpers::deserialize_lenient_i64")] i64);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(id)| id))
}
