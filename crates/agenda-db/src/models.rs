//! Database row types. These map directly to SQLite rows and stay distinct
//! from the agenda-types API models; the `From` impls below are the only
//! bridge between the two.

use agenda_types::models::{Contact, Course, Task, TaskKind, Thought, UserProfile};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

pub struct CourseRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub day_of_week: i64,
    pub start_time: String,
    pub end_time: String,
    pub location: Option<String>,
    pub teacher: Option<String>,
    pub color: Option<String>,
}

pub struct TaskRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub kind: String,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub completed: bool,
    pub description: Option<String>,
}

pub struct ContactRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub identity: Option<String>,
    pub tags: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

pub struct ThoughtRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: Option<String>,
    pub related_contact_id: Option<i64>,
    pub contact_name: Option<String>,
    pub created_at: String,
}

// -- Write payloads (already validated by the caller) --

pub struct CourseFields {
    pub name: String,
    pub day_of_week: i64,
    pub start_time: String,
    pub end_time: String,
    pub location: Option<String>,
    pub teacher: Option<String>,
    pub color: Option<String>,
}

pub struct TaskFields {
    pub title: String,
    pub kind: TaskKind,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub description: Option<String>,
}

pub struct ContactFields {
    pub name: String,
    pub identity: Option<String>,
    pub tags: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
}

pub struct ThoughtFields {
    pub title: String,
    pub content: Option<String>,
    pub related_contact_id: Option<i64>,
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without a timezone; they
/// are always UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

fn timestamp_or_default(raw: &str, what: &str, id: i64) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap_or_else(|| {
        warn!("Corrupt created_at '{}' on {} '{}'", raw, what, id);
        DateTime::default()
    })
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        let created_at = timestamp_or_default(&row.created_at, "user", row.id);
        UserProfile {
            id: row.id,
            username: row.username,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            created_at,
        }
    }
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Course {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            day_of_week: row.day_of_week,
            start_time: row.start_time,
            end_time: row.end_time,
            location: row.location,
            teacher: row.teacher,
            color: row.color,
        }
    }
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        let kind = row.kind.parse().unwrap_or_else(|e| {
            warn!("Corrupt type on task '{}': {}", row.id, e);
            TaskKind::Task
        });
        Task {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            kind,
            start_date: row.start_date,
            due_date: row.due_date,
            completed: row.completed,
            description: row.description,
        }
    }
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        let created_at = timestamp_or_default(&row.created_at, "contact", row.id);
        Contact {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            identity: row.identity,
            tags: row.tags,
            description: row.description,
            avatar_url: row.avatar_url,
            created_at,
        }
    }
}

impl From<ThoughtRow> for Thought {
    fn from(row: ThoughtRow) -> Self {
        let created_at = timestamp_or_default(&row.created_at, "thought", row.id);
        Thought {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            content: row.content,
            related_contact_id: row.related_contact_id,
            contact_name: row.contact_name,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_sqlite_and_rfc3339_timestamps() {
        let ts = parse_timestamp("2026-10-18 09:30:05").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2026, 10, 18));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (9, 30, 5));

        assert!(parse_timestamp("2026-10-18T09:30:05Z").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn unknown_task_type_falls_back_to_task() {
        let row = TaskRow {
            id: 3,
            user_id: 1,
            title: "x".into(),
            kind: "chore".into(),
            start_date: None,
            due_date: None,
            completed: true,
            description: None,
        };
        let task = Task::from(row);
        assert_eq!(task.kind, TaskKind::Task);
        assert!(task.completed);
    }
}
