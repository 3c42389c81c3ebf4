use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public view of a user account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A recurring weekly schedule slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    /// 1 = Monday .. 5 = Friday
    pub day_of_week: i64,
    pub start_time: String,
    pub end_time: String,
    pub location: Option<String>,
    pub teacher: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Homework,
    Task,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Homework => "homework",
            TaskKind::Task => "task",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTaskKind(pub String);

impl fmt::Display for UnknownTaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown task type '{}'", self.0)
    }
}

impl std::error::Error for UnknownTaskKind {}

impl FromStr for TaskKind {
    type Err = UnknownTaskKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "homework" => Ok(TaskKind::Homework),
            "task" => Ok(TaskKind::Task),
            other => Err(UnknownTaskKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    /// Client-supplied date strings, stored verbatim.
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub completed: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    /// Free-form relationship label, e.g. "Classmate".
    pub identity: Option<String>,
    /// Comma-joined tag list.
    pub tags: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A journal entry, optionally linked to one of the owner's contacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thought {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: Option<String>,
    pub related_contact_id: Option<i64>,
    /// Name of the related contact, when it still exists and has the same owner.
    pub contact_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
