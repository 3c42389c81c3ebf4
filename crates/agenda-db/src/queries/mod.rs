//! Owner-scoped queries. Every statement touching a resource table filters on
//! `user_id`; a row belonging to someone else behaves exactly like a missing row.

mod contacts;
mod courses;
mod tasks;
mod thoughts;
mod users;

use anyhow::Result;
use rusqlite::Connection;

/// LIMIT/OFFSET slice of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: u32,
    pub offset: u64,
}

impl Window {
    pub fn new(limit: u32, offset: u64) -> Self {
        Self { limit, offset }
    }
}

/// SQLite treats a negative LIMIT as "no limit".
fn bounds(window: Option<Window>) -> (i64, i64) {
    match window {
        Some(w) => (i64::from(w.limit), w.offset as i64),
        None => (-1, 0),
    }
}

/// Tables holding per-user resources.
#[derive(Debug, Clone, Copy)]
enum Owned {
    Courses,
    Tasks,
    Contacts,
    Thoughts,
}

impl Owned {
    fn table(self) -> &'static str {
        match self {
            Owned::Courses => "courses",
            Owned::Tasks => "tasks",
            Owned::Contacts => "contacts",
            Owned::Thoughts => "thoughts",
        }
    }
}

fn count_owned(conn: &Connection, table: Owned, owner: i64) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE user_id = ?1", table.table());
    let total: i64 = conn.query_row(&sql, [owner], |r| r.get(0))?;
    Ok(total as u64)
}

/// Returns false when nothing matched (missing id or not the caller's row).
fn delete_owned(conn: &Connection, table: Owned, owner: i64, id: i64) -> Result<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?1 AND user_id = ?2", table.table());
    let changed = conn.execute(&sql, [id, owner])?;
    Ok(changed > 0)
}
