use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};

use super::{Owned, Window, bounds, count_owned, delete_owned};
use crate::Database;
use crate::models::{TaskFields, TaskRow};

const TASK_COLUMNS: &str =
    "id, user_id, title, type, start_date, due_date, completed, description";

impl Database {
    /// Tasks ordered by due date; undated tasks sort first.
    pub fn list_tasks(&self, owner: i64, window: Option<Window>) -> Result<Vec<TaskRow>> {
        let (limit, offset) = bounds(window);
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE user_id = ?1
                 ORDER BY due_date ASC, id ASC
                 LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![owner, limit, offset], task_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_tasks(&self, owner: i64) -> Result<u64> {
        self.with_conn(|conn| count_owned(conn, Owned::Tasks, owner))
    }

    pub fn get_task(&self, owner: i64, id: i64) -> Result<Option<TaskRow>> {
        self.with_conn(|conn| query_task(conn, owner, id))
    }

    pub fn insert_task(&self, owner: i64, fields: &TaskFields) -> Result<TaskRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (user_id, title, type, start_date, due_date, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    owner,
                    fields.title,
                    fields.kind.as_str(),
                    fields.start_date,
                    fields.due_date,
                    fields.description,
                ],
            )?;
            let id = conn.last_insert_rowid();
            query_task(conn, owner, id)?
                .ok_or_else(|| anyhow::anyhow!("Task {} vanished after insert", id))
        })
    }

    /// Replace the editable fields; `completed` is left untouched.
    pub fn update_task(&self, owner: i64, id: i64, fields: &TaskFields) -> Result<Option<TaskRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE tasks
                 SET title = ?1, type = ?2, start_date = ?3, due_date = ?4, description = ?5
                 WHERE id = ?6 AND user_id = ?7",
                rusqlite::params![
                    fields.title,
                    fields.kind.as_str(),
                    fields.start_date,
                    fields.due_date,
                    fields.description,
                    id,
                    owner,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_task(conn, owner, id)
        })
    }

    /// Flip `completed` in place. Returns false when no owned row matched.
    pub fn toggle_task(&self, owner: i64, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE tasks SET completed = NOT completed WHERE id = ?1 AND user_id = ?2",
                [id, owner],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_task(&self, owner: i64, id: i64) -> Result<bool> {
        self.with_conn(|conn| delete_owned(conn, Owned::Tasks, owner, id))
    }
}

fn query_task(conn: &Connection, owner: i64, id: i64) -> Result<Option<TaskRow>> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2");
    let row = conn.query_row(&sql, [id, owner], task_from_row).optional()?;
    Ok(row)
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        kind: row.get(3)?,
        start_date: row.get(4)?,
        due_date: row.get(5)?,
        completed: row.get(6)?,
        description: row.get(7)?,
    })
}
