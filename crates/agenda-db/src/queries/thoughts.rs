use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};

use super::{Owned, Window, bounds, count_owned, delete_owned};
use crate::Database;
use crate::models::{ThoughtFields, ThoughtRow};

/// The contact join is scoped to the same owner so a foreign contact id never
/// leaks someone else's contact name.
const THOUGHT_SELECT: &str = "
    SELECT t.id, t.user_id, t.title, t.content, t.related_contact_id, c.name, t.created_at
    FROM thoughts t
    LEFT JOIN contacts c ON c.id = t.related_contact_id AND c.user_id = t.user_id";

impl Database {
    /// Newest first, each with its related contact's name when present.
    pub fn list_thoughts(&self, owner: i64, window: Option<Window>) -> Result<Vec<ThoughtRow>> {
        let (limit, offset) = bounds(window);
        self.with_conn(|conn| {
            let sql = format!(
                "{THOUGHT_SELECT}
                 WHERE t.user_id = ?1
                 ORDER BY t.created_at DESC, t.id DESC
                 LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![owner, limit, offset], thought_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_thoughts(&self, owner: i64) -> Result<u64> {
        self.with_conn(|conn| count_owned(conn, Owned::Thoughts, owner))
    }

    pub fn get_thought(&self, owner: i64, id: i64) -> Result<Option<ThoughtRow>> {
        self.with_conn(|conn| query_thought(conn, owner, id))
    }

    pub fn insert_thought(&self, owner: i64, fields: &ThoughtFields) -> Result<ThoughtRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO thoughts (user_id, title, content, related_contact_id)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![owner, fields.title, fields.content, fields.related_contact_id],
            )?;
            let id = conn.last_insert_rowid();
            query_thought(conn, owner, id)?
                .ok_or_else(|| anyhow::anyhow!("Thought {} vanished after insert", id))
        })
    }

    pub fn update_thought(
        &self,
        owner: i64,
        id: i64,
        fields: &ThoughtFields,
    ) -> Result<Option<ThoughtRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE thoughts
                 SET title = ?1, content = ?2, related_contact_id = ?3
                 WHERE id = ?4 AND user_id = ?5",
                rusqlite::params![fields.title, fields.content, fields.related_contact_id, id, owner],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_thought(conn, owner, id)
        })
    }

    pub fn delete_thought(&self, owner: i64, id: i64) -> Result<bool> {
        self.with_conn(|conn| delete_owned(conn, Owned::Thoughts, owner, id))
    }
}

fn query_thought(conn: &Connection, owner: i64, id: i64) -> Result<Option<ThoughtRow>> {
    let sql = format!("{THOUGHT_SELECT} WHERE t.id = ?1 AND t.user_id = ?2");
    let row = conn.query_row(&sql, [id, owner], thought_from_row).optional()?;
    Ok(row)
}

fn thought_from_row(row: &Row<'_>) -> rusqlite::Result<ThoughtRow> {
    Ok(ThoughtRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        related_contact_id: row.get(4)?,
        contact_name: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::models::{ContactFields, ThoughtFields};
    use crate::queries::test_support::db_with_two_users;

    fn thought(title: &str, contact: Option<i64>) -> ThoughtFields {
        ThoughtFields {
            title: title.into(),
            content: Some("...".into()),
            related_contact_id: contact,
        }
    }

    fn contact(name: &str) -> ContactFields {
        ContactFields {
            name: name.into(),
            identity: None,
            tags: None,
            description: None,
            avatar_url: None,
        }
    }

    #[test]
    fn joins_related_contact_name() {
        let (db, alice, _) = db_with_two_users();
        let ada = db.insert_contact(alice, &contact("Ada")).unwrap();

        let row = db.insert_thought(alice, &thought("chat with Ada", Some(ada.id))).unwrap();
        assert_eq!(row.contact_name.as_deref(), Some("Ada"));

        let plain = db.insert_thought(alice, &thought("solo", None)).unwrap();
        assert!(plain.contact_name.is_none());
    }

    #[test]
    fn foreign_contact_name_is_not_joined() {
        let (db, alice, bob) = db_with_two_users();
        let secret = db.insert_contact(bob, &contact("Bob's secret")).unwrap();

        let row = db.insert_thought(alice, &thought("probe", Some(secret.id))).unwrap();
        assert_eq!(row.related_contact_id, Some(secret.id));
        assert!(row.contact_name.is_none());
    }

    #[test]
    fn deleting_contact_leaves_thought_dangling() {
        let (db, alice, _) = db_with_two_users();
        let ada = db.insert_contact(alice, &contact("Ada")).unwrap();
        let row = db.insert_thought(alice, &thought("chat", Some(ada.id))).unwrap();

        assert!(db.delete_contact(alice, ada.id).unwrap());
        let after = db.get_thought(alice, row.id).unwrap().unwrap();
        assert_eq!(after.related_contact_id, Some(ada.id));
        assert!(after.contact_name.is_none());
    }

    #[test]
    fn newest_first_and_owner_scoped() {
        let (db, alice, bob) = db_with_two_users();
        db.insert_thought(alice, &thought("first", None)).unwrap();
        db.insert_thought(alice, &thought("second", None)).unwrap();
        let foreign = db.insert_thought(bob, &thought("bob's", None)).unwrap();

        let titles: Vec<_> = db
            .list_thoughts(alice, None)
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["second", "first"]);

        assert!(db.update_thought(alice, foreign.id, &thought("x", None)).unwrap().is_none());
        assert!(!db.delete_thought(alice, foreign.id).unwrap());
        assert_eq!(db.count_thoughts(bob).unwrap(), 1);
    }
}
