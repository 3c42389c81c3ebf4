use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};

use super::{Owned, Window, bounds, count_owned, delete_owned};
use crate::Database;
use crate::models::{ContactFields, ContactRow};

const CONTACT_COLUMNS: &str =
    "id, user_id, name, identity, tags, description, avatar_url, created_at";

impl Database {
    pub fn list_contacts(&self, owner: i64, window: Option<Window>) -> Result<Vec<ContactRow>> {
        let (limit, offset) = bounds(window);
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {CONTACT_COLUMNS} FROM contacts
                 WHERE user_id = ?1
                 ORDER BY name ASC, id ASC
                 LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![owner, limit, offset], contact_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_contacts(&self, owner: i64) -> Result<u64> {
        self.with_conn(|conn| count_owned(conn, Owned::Contacts, owner))
    }

    pub fn get_contact(&self, owner: i64, id: i64) -> Result<Option<ContactRow>> {
        self.with_conn(|conn| query_contact(conn, owner, id))
    }

    pub fn insert_contact(&self, owner: i64, fields: &ContactFields) -> Result<ContactRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO contacts (user_id, name, identity, tags, description, avatar_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    owner,
                    fields.name,
                    fields.identity,
                    fields.tags,
                    fields.description,
                    fields.avatar_url,
                ],
            )?;
            let id = conn.last_insert_rowid();
            query_contact(conn, owner, id)?
                .ok_or_else(|| anyhow::anyhow!("Contact {} vanished after insert", id))
        })
    }

    pub fn update_contact(
        &self,
        owner: i64,
        id: i64,
        fields: &ContactFields,
    ) -> Result<Option<ContactRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE contacts
                 SET name = ?1, identity = ?2, tags = ?3, description = ?4, avatar_url = ?5
                 WHERE id = ?6 AND user_id = ?7",
                rusqlite::params![
                    fields.name,
                    fields.identity,
                    fields.tags,
                    fields.description,
                    fields.avatar_url,
                    id,
                    owner,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_contact(conn, owner, id)
        })
    }

    /// Thoughts pointing at this contact keep their dangling id.
    pub fn delete_contact(&self, owner: i64, id: i64) -> Result<bool> {
        self.with_conn(|conn| delete_owned(conn, Owned::Contacts, owner, id))
    }
}

fn query_contact(conn: &Connection, owner: i64, id: i64) -> Result<Option<ContactRow>> {
    let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1 AND user_id = ?2");
    let row = conn.query_row(&sql, [id, owner], contact_from_row).optional()?;
    Ok(row)
}

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<ContactRow> {
    Ok(ContactRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        identity: row.get(3)?,
        tags: row.get(4)?,
        description: row.get(5)?,
        avatar_url: row.get(6)?,
        created_at: row.get(7)?,
    })
}
