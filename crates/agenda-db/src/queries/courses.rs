use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};

use super::{Owned, Window, bounds, count_owned, delete_owned};
use crate::Database;
use crate::models::{CourseFields, CourseRow};

const COURSE_COLUMNS: &str =
    "id, user_id, name, day_of_week, start_time, end_time, location, teacher, color";

impl Database {
    /// The owner's weekly schedule, Monday first, earliest slot first.
    pub fn list_courses(&self, owner: i64, window: Option<Window>) -> Result<Vec<CourseRow>> {
        let (limit, offset) = bounds(window);
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COURSE_COLUMNS} FROM courses
                 WHERE user_id = ?1
                 ORDER BY day_of_week ASC, start_time ASC, id ASC
                 LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![owner, limit, offset], course_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_courses(&self, owner: i64) -> Result<u64> {
        self.with_conn(|conn| count_owned(conn, Owned::Courses, owner))
    }

    pub fn get_course(&self, owner: i64, id: i64) -> Result<Option<CourseRow>> {
        self.with_conn(|conn| query_course(conn, owner, id))
    }

    pub fn insert_course(&self, owner: i64, fields: &CourseFields) -> Result<CourseRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO courses (user_id, name, day_of_week, start_time, end_time, location, teacher, color)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    owner,
                    fields.name,
                    fields.day_of_week,
                    fields.start_time,
                    fields.end_time,
                    fields.location,
                    fields.teacher,
                    fields.color,
                ],
            )?;
            let id = conn.last_insert_rowid();
            query_course(conn, owner, id)?
                .ok_or_else(|| anyhow::anyhow!("Course {} vanished after insert", id))
        })
    }

    /// Replace every editable field. `None` when no owned row matched.
    pub fn update_course(
        &self,
        owner: i64,
        id: i64,
        fields: &CourseFields,
    ) -> Result<Option<CourseRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE courses
                 SET name = ?1, day_of_week = ?2, start_time = ?3, end_time = ?4,
                     location = ?5, teacher = ?6, color = ?7
                 WHERE id = ?8 AND user_id = ?9",
                rusqlite::params![
                    fields.name,
                    fields.day_of_week,
                    fields.start_time,
                    fields.end_time,
                    fields.location,
                    fields.teacher,
                    fields.color,
                    id,
                    owner,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_course(conn, owner, id)
        })
    }

    pub fn delete_course(&self, owner: i64, id: i64) -> Result<bool> {
        self.with_conn(|conn| delete_owned(conn, Owned::Courses, owner, id))
    }
}

fn query_course(conn: &Connection, owner: i64, id: i64) -> Result<Option<CourseRow>> {
    let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1 AND user_id = ?2");
    let row = conn.query_row(&sql, [id, owner], course_from_row).optional()?;
    Ok(row)
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<CourseRow> {
    Ok(CourseRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        day_of_week: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        location: row.get(6)?,
        teacher: row.get(7)?,
        color: row.get(8)?,
    })
}
