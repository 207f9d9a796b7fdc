pub mod cache;
pub mod models;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::info;

use cache::QueryCache;
use models::*;

/// Data-access context: the one connection plus its memoized results.
/// Passed explicitly to everything that reads the archive.
pub struct Database {
    pub conn: Connection,
    pub path: PathBuf,
    pub cache: QueryCache,
}

impl Database {
    /// Open an existing archive read-only. A missing file or an archive
    /// without the search tables is an error; nothing is ever created.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open archive: {}", path.display()))?;

        conn.execute_batch(
            "PRAGMA query_only = ON;
             PRAGMA cache_size = -64000;",
        )?;

        schema::verify_schema(&conn)
            .with_context(|| format!("Failed to open archive: {}", path.display()))?;

        info!("Opened archive: {}", path.display());

        Ok(Database {
            conn,
            path: path.to_path_buf(),
            cache: QueryCache::default(),
        })
    }

    /// Create a fresh, writable archive with the full schema.
    #[cfg(test)]
    pub(crate) fn create(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::create_schema(&conn)?;
        Ok(Database {
            conn,
            path: path.to_path_buf(),
            cache: QueryCache::default(),
        })
    }

    /// Default database path: ~/.foiex/foiex.db
    pub fn default_db_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".foiex").join("foiex.db"))
    }

    /// Fetch one email by id, with its preview columns.
    pub fn get_email(&self, email_id: i64) -> Result<Option<EmailRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.sent, coalesce(e.subject, ''), e.pg_cnt,
                    coalesce(e.from_email, ''), coalesce(e.to_emails, ''),
                    coalesce(e.topic, ''), e.source_url_email, e.scrape_url,
                    e.email_id, e.file_id, e.file_pg_start
             FROM emails e WHERE e.email_id = ?1",
        )?;

        let result = stmt.query_row([email_id], EmailRow::from_row).optional()?;
        Ok(result)
    }

    /// Get database statistics.
    pub fn stats(&self) -> Result<DbStats> {
        let emails: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM emails", [], |r| r.get(0))?;
        let entities: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entities", [], |r| r.get(0))?;
        let entity_links: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entity_emails", [], |r| r.get(0))?;
        let (first_sent, last_sent): (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(sent), MAX(sent) FROM emails",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;

        let db_size_bytes = std::fs::metadata(&self.path)
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(DbStats {
            emails,
            entities,
            entity_links,
            first_sent,
            last_sent,
            db_size_bytes,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Database;
    use tempfile::TempDir;

    /// A throwaway archive with four emails and a handful of entities.
    /// Entity 5 sits below the default id floor.
    pub fn seeded() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::create(&dir.path().join("test.db")).unwrap();
        db.conn
            .execute_batch(
                "INSERT INTO emails (email_id, file_id, sent, subject, from_email, to_emails, topic,
                                     body, pg_cnt, file_pg_start, source_url_email, scrape_url)
                 VALUES
                 (1, 1, '2020-03-19 08:15:00', 'Re: coronavirus briefing', 'fauci@niaid.gov',
                  'collins@nih.gov', 'briefing',
                  'We looked at the electron microscope images today.', 2, 101,
                  'https://example.org/fauci/101', 'Fauci FOIA release, part 1'),
                 (2, 1, '2020-03-19 17:40:00', 'Masks', 'obrien@hhs.gov', NULL, NULL,
                  'Guidance on masks and gowns for staff.', 1, 103,
                  'https://example.org/fauci/103', 'Fauci FOIA release, part 1'),
                 (3, 2, '2020-03-20 09:00:00', 'Wuhan lab', 'fauci@niaid.gov', NULL, 'lab',
                  'Questions about the Wuhan institute.', 3, NULL, NULL, NULL),
                 (4, 2, '2020-02-01 10:00:00', NULL, NULL, NULL, NULL,
                  'Early warning signs.', 1, 7, NULL, NULL);

                 INSERT INTO entities (entity_id, entity, enttype) VALUES
                 (5, 'Fauci Noise', 'PERSON'),
                 (600, 'Anthony Fauci', 'PERSON'),
                 (601, 'O''Brien', 'PERSON'),
                 (602, 'NIH', 'ORG'),
                 (603, 'Wuhan', 'GPE'),
                 (604, 'Chinese', 'NORP');

                 INSERT INTO entity_emails (entity_id, email_id) VALUES
                 (5, 2), (600, 1), (600, 3), (601, 2), (602, 1), (603, 3);",
            )
            .unwrap();
        (dir, db)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::seeded;
    use super::Database;
    use crate::search::filters::FilterSet;
    use crate::search::query::QueryBuilder;
    use rusqlite::Connection;
    use tempfile::TempDir;

    #[test]
    fn missing_archive_is_an_error_and_nothing_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("dc19-typo.db");
        let err = Database::open(&path).err().unwrap();
        assert!(format!("{err:#}").contains("Failed to open archive"));
        assert!(!path.exists());
        assert!(!dir.path().join("nested").exists());
    }

    #[test]
    fn archive_without_search_tables_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE emails (email_id INTEGER PRIMARY KEY, sent TEXT);")
                .unwrap();
        }
        let before = std::fs::read(&path).unwrap();

        let err = Database::open(&path).err().unwrap();
        let msg = format!("{err:#}");
        assert!(msg.contains("Failed to open archive"));
        assert!(msg.contains("emails_fts"));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn reading_leaves_archive_untouched() {
        let (dir, db) = seeded();
        let path = db.path.clone();
        drop(db);
        let before = std::fs::read(&path).unwrap();

        let db = Database::open(&path).unwrap();
        let q = QueryBuilder::default().build(&FilterSet::default()).unwrap();
        assert_eq!(db.run_search(&q).unwrap().len(), 2);
        db.stats().unwrap();
        let mode: String = db
            .conn
            .query_row("PRAGMA journal_mode", [], |r| r.get(0))
            .unwrap();
        assert_ne!(mode.to_lowercase(), "wal");
        assert!(db.conn.execute("DELETE FROM emails", []).is_err());
        drop(db);

        assert_eq!(std::fs::read(&path).unwrap(), before);
        assert!(!dir.path().join("test.db-wal").exists());
    }

    #[test]
    fn get_email_reads_preview_columns() {
        let (_dir, db) = seeded();
        let email = db.get_email(1).unwrap().unwrap();
        assert_eq!(email.subject, "Re: coronavirus briefing");
        assert_eq!(email.pg_number, Some(101));
        assert_eq!(
            email.file_description.as_deref(),
            Some("Fauci FOIA release, part 1")
        );

        let bare = db.get_email(4).unwrap().unwrap();
        assert_eq!(bare.subject, "");
        assert!(bare.source_url_email.is_none());

        assert!(db.get_email(99).unwrap().is_none());
    }

    #[test]
    fn stats_cover_all_tables() {
        let (_dir, db) = seeded();
        let stats = db.stats().unwrap();
        assert_eq!(stats.emails, 4);
        assert_eq!(stats.entities, 6);
        assert_eq!(stats.entity_links, 6);
        assert_eq!(stats.first_sent.as_deref(), Some("2020-02-01 10:00:00"));
        assert_eq!(stats.last_sent.as_deref(), Some("2020-03-20 09:00:00"));
    }
}
