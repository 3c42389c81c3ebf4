use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, ffi};

use crate::Database;
use crate::models::UserRow;

const USER_COLUMNS: &str = "id, username, password, display_name, avatar_url, created_at";

impl Database {
    /// Insert a new user. Returns `None` when the username is already taken.
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, password) VALUES (?1, ?2)",
                rusqlite::params![username, password_hash],
            );
            match inserted {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
                {
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", &username))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", &id))
    }

    /// Replace the profile fields. The password hash only changes when a new
    /// one is supplied. Returns false when the user does not exist.
    pub fn update_profile(
        &self,
        id: i64,
        display_name: Option<&str>,
        avatar_url: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users
                 SET display_name = ?1, avatar_url = ?2, password = COALESCE(?3, password)
                 WHERE id = ?4",
                rusqlite::params![display_name, avatar_url, password_hash, id],
            )?;
            Ok(changed > 0)
        })
    }
}

fn query_user(
    conn: &Connection,
    predicate: &str,
    value: &dyn rusqlite::ToSql,
) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate}");
    let row = conn.query_row(&sql, [value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        display_name: row.get(3)?,
        avatar_url: row.get(4)?,
        created_at: row.get(5)?,
    })
}
