use anyhow::{bail, Result};
use rusqlite::Connection;

/// Tables and virtual tables every search path reads.
pub const REQUIRED_TABLES: [&str; 4] = ["emails", "entities", "entity_emails", "emails_fts"];

/// Fail unless the archive carries every required table.
pub fn verify_schema(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut present = Vec::new();
    for row in rows {
        present.push(row?);
    }

    let missing: Vec<&str> = REQUIRED_TABLES
        .iter()
        .copied()
        .filter(|t| !present.iter().any(|p| p == t))
        .collect();
    if !missing.is_empty() {
        bail!("missing table(s): {}", missing.join(", "));
    }
    Ok(())
}

/// Archive layout, used to build fixtures. The explorer itself never writes.
#[cfg(test)]
pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Core tables
        CREATE TABLE IF NOT EXISTS emails (
            email_id INTEGER PRIMARY KEY,
            file_id INTEGER,
            sent TEXT NOT NULL,
            subject TEXT,
            from_email TEXT,
            to_emails TEXT,
            topic TEXT,
            body TEXT NOT NULL DEFAULT '',
            pg_cnt INTEGER NOT NULL DEFAULT 0,
            file_pg_start INTEGER,
            source_url_email TEXT,
            scrape_url TEXT
        );

        CREATE TABLE IF NOT EXISTS entities (
            entity_id INTEGER PRIMARY KEY,
            entity TEXT NOT NULL,
            enttype TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS entity_emails (
            entity_id INTEGER NOT NULL REFERENCES entities(entity_id) ON DELETE CASCADE,
            email_id INTEGER NOT NULL REFERENCES emails(email_id) ON DELETE CASCADE,
            PRIMARY KEY (entity_id, email_id)
        );

        -- Indexes for common filters
        CREATE INDEX IF NOT EXISTS idx_emails_sent ON emails(sent);
        CREATE INDEX IF NOT EXISTS idx_entities_entity ON entities(entity);
        CREATE INDEX IF NOT EXISTS idx_entities_enttype ON entities(enttype);
        CREATE INDEX IF NOT EXISTS idx_entity_emails_email ON entity_emails(email_id);

        -- FTS5 over the email body (content-sync mode)
        CREATE VIRTUAL TABLE IF NOT EXISTS emails_fts USING fts5(
            body,
            content='emails',
            content_rowid='email_id'
        );

        CREATE TRIGGER IF NOT EXISTS emails_ai AFTER INSERT ON emails BEGIN
            INSERT INTO emails_fts(rowid, body) VALUES (new.email_id, new.body);
        END;

        CREATE TRIGGER IF NOT EXISTS emails_ad AFTER DELETE ON emails BEGIN
            INSERT INTO emails_fts(emails_fts, rowid, body)
            VALUES ('delete', old.email_id, old.body);
        END;

        CREATE TRIGGER IF NOT EXISTS emails_au AFTER UPDATE ON emails BEGIN
            INSERT INTO emails_fts(emails_fts, rowid, body)
            VALUES ('delete', old.email_id, old.body);
            INSERT INTO emails_fts(rowid, body) VALUES (new.email_id, new.body);
        END;
        ",
    )?;

    Ok(())
}
