use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

enum Step {
    Sql(&'static str),
    Apply(fn(&Connection) -> Result<()>),
}

/// Ordered schema steps. A step's version is its position in the list plus one;
/// append new steps, never edit applied ones.
const MIGRATIONS: &[(&str, Step)] = &[
    (
        "initial schema",
        Step::Sql(
            "
        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            username        TEXT NOT NULL UNIQUE,
            password        TEXT NOT NULL,
            display_name    TEXT,
            avatar_url      TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS courses (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id         INTEGER NOT NULL REFERENCES users(id),
            name            TEXT NOT NULL,
            day_of_week     INTEGER NOT NULL,
            start_time      TEXT NOT NULL,
            end_time        TEXT NOT NULL,
            location        TEXT,
            teacher         TEXT,
            color           TEXT
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id         INTEGER NOT NULL REFERENCES users(id),
            title           TEXT NOT NULL,
            type            TEXT NOT NULL,
            start_date      TEXT,
            due_date        TEXT,
            completed       INTEGER NOT NULL DEFAULT 0,
            description     TEXT
        );

        CREATE TABLE IF NOT EXISTS contacts (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id         INTEGER NOT NULL REFERENCES users(id),
            name            TEXT NOT NULL,
            identity        TEXT,
            tags            TEXT,
            description     TEXT,
            avatar_url      TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- related_contact_id is a weak link: no foreign key, no cascade
        CREATE TABLE IF NOT EXISTS thoughts (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id             INTEGER NOT NULL REFERENCES users(id),
            title               TEXT NOT NULL,
            content             TEXT,
            related_contact_id  INTEGER,
            created_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
        ),
    ),
    (
        "owner indexes",
        Step::Sql(
            "
        CREATE INDEX IF NOT EXISTS idx_courses_owner
            ON courses(user_id, day_of_week, start_time);

        CREATE INDEX IF NOT EXISTS idx_tasks_owner
            ON tasks(user_id, due_date);

        CREATE INDEX IF NOT EXISTS idx_contacts_owner
            ON contacts(user_id, name);

        CREATE INDEX IF NOT EXISTS idx_thoughts_owner
            ON thoughts(user_id, created_at);
        ",
        ),
    ),
    ("adopt legacy tables", Step::Apply(adopt_legacy_tables)),
];

/// Columns added to the original tables after their first release.
const LATE_COLUMNS: &[(&str, &str)] = &[
    ("tasks", "start_date"),
    ("courses", "teacher"),
    ("users", "display_name"),
    ("users", "avatar_url"),
];

fn column_names(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}

/// Bring tables created before `schema_version` existed up to the current shape:
/// add late columns, and rebuild `thoughts` if it still enforces a foreign key
/// on `related_contact_id`.
fn adopt_legacy_tables(conn: &Connection) -> Result<()> {
    for (table, column) in LATE_COLUMNS {
        if !column_names(conn, table)?.iter().any(|c| c == column) {
            info!("Adding missing column {}.{}", table, column);
            conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} TEXT;"))?;
        }
    }

    let contact_fk: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_foreign_key_list('thoughts') WHERE \"from\" = 'related_contact_id'",
        [],
        |r| r.get(0),
    )?;
    if contact_fk > 0 {
        info!("Rebuilding thoughts without the related_contact_id foreign key");
        conn.execute_batch(
            "
            CREATE TABLE thoughts_rebuilt (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id             INTEGER NOT NULL REFERENCES users(id),
                title               TEXT NOT NULL,
                content             TEXT,
                related_contact_id  INTEGER,
                created_at          TEXT NOT NULL DEFAULT (datetime('now'))
            );

            INSERT INTO thoughts_rebuilt (id, user_id, title, content, related_contact_id, created_at)
                SELECT id, user_id, title, content, related_contact_id,
                       COALESCE(created_at, datetime('now'))
                FROM thoughts;

            DROP TABLE thoughts;
            ALTER TABLE thoughts_rebuilt RENAME TO thoughts;

            CREATE INDEX IF NOT EXISTS idx_thoughts_owner
                ON thoughts(user_id, created_at);
            ",
        )?;
    }
    Ok(())
}

/// Latest schema version this build knows about.
pub fn latest_version() -> i64 {
    MIGRATIONS.len() as i64
}

pub fn current_version(conn: &Connection) -> Result<i64> {
    let version =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;
    Ok(version)
}

/// Apply every pending step, each in its own transaction.
pub fn run(conn: &mut Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let applied = current_version(conn)?;

    for (idx, (name, step)) in MIGRATIONS.iter().enumerate() {
        let version = idx as i64 + 1;
        if version <= applied {
            continue;
        }

        info!("Running migration v{} ({})", version, name);
        let tx = conn.transaction()?;
        match step {
            Step::Sql(sql) => tx.execute_batch(sql)?,
            Step::Apply(apply) => apply(&*tx)?,
        }
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
        tx.commit()?;
    }

    info!("Database migrations complete (schema v{})", latest_version());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_every_step_once() {
        let mut conn = Connection::open_in_memory().unwrap();
        run(&mut conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), latest_version());

        // Second run is a no-op
        run(&mut conn).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, latest_version());
    }

    /// Tables as the first release created them, before the late columns
    /// and with a hard foreign key from thoughts to contacts.
    const LEGACY_SCHEMA: &str = "
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            password TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
        CREATE TABLE courses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            day_of_week INTEGER NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            location TEXT,
            color TEXT,
            FOREIGN KEY (user_id) REFERENCES users (id)
        );
        CREATE TABLE tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            type TEXT NOT NULL,
            due_date DATETIME,
            completed BOOLEAN DEFAULT 0,
            description TEXT,
            FOREIGN KEY (user_id) REFERENCES users (id)
        );
        CREATE TABLE contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            identity TEXT,
            tags TEXT,
            description TEXT,
            avatar_url TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (user_id) REFERENCES users (id)
        );
        CREATE TABLE thoughts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            content TEXT,
            related_contact_id INTEGER,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (user_id) REFERENCES users (id),
            FOREIGN KEY (related_contact_id) REFERENCES contacts (id)
        );

        INSERT INTO users (id, username, password) VALUES (1, 'ada', 'x');
        INSERT INTO contacts (id, user_id, name) VALUES (7, 1, 'Grace');
        INSERT INTO thoughts (id, user_id, title, related_contact_id, created_at)
            VALUES (3, 1, 'call Grace', 7, '2024-03-01 09:30:00');
    ";

    fn legacy_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        conn.execute_batch(LEGACY_SCHEMA).unwrap();
        conn
    }

    #[test]
    fn legacy_tables_gain_late_columns() {
        let mut conn = legacy_conn();
        run(&mut conn).unwrap();

        for (table, column) in LATE_COLUMNS {
            assert!(
                column_names(&conn, table).unwrap().iter().any(|c| c == column),
                "missing {table}.{column}"
            );
        }
        assert_eq!(current_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn legacy_thought_link_no_longer_blocks_contact_delete() {
        let mut conn = legacy_conn();
        assert!(conn.execute("DELETE FROM contacts WHERE id = 7", []).is_err());

        run(&mut conn).unwrap();

        assert_eq!(conn.execute("DELETE FROM contacts WHERE id = 7", []).unwrap(), 1);
        let (title, related, created): (String, Option<i64>, String) = conn
            .query_row(
                "SELECT title, related_contact_id, created_at FROM thoughts WHERE id = 3",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(title, "call Grace");
        assert_eq!(related, Some(7));
        assert_eq!(created, "2024-03-01 09:30:00");
    }

    #[test]
    fn fresh_schema_is_left_alone_by_adoption() {
        let mut conn = Connection::open_in_memory().unwrap();
        run(&mut conn).unwrap();
        let sql: String = conn
            .query_row(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = 'thoughts'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert!(!sql.contains("thoughts_rebuilt"));
        assert!(!sql.contains("REFERENCES contacts"));
    }

    #[test]
    fn creates_resource_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        run(&mut conn).unwrap();

        for table in ["users", "courses", "tasks", "contacts", "thoughts"] {
            let found: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(found, 1, "missing table {table}");
        }
    }
}
