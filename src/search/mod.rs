pub mod filters;
pub mod grid;
pub mod query;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::db::models::{DailyCount, EmailRow, EntityKind};
use crate::db::Database;
use query::BuiltQuery;

/// Everything `foiex search --json` prints.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutput<'a> {
    pub explanation: &'a str,
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub emails: &'a [EmailRow],
}

impl Database {
    /// Run a built search. Identical queries are answered from the cache.
    pub fn run_search(&self, query: &BuiltQuery) -> Result<Vec<EmailRow>> {
        let key = query.cache_key();
        if let Some(hit) = self.cache.emails(&key) {
            debug!("search cache hit ({} rows)", hit.len());
            return Ok(hit);
        }

        debug!(sql = %query.sql, params = query.params.len(), "running search");

        let mut stmt = self
            .conn
            .prepare(&query.sql)
            .with_context(|| format!("Failed to prepare search: {}", query.explanation))?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(query.params.iter()), EmailRow::from_row)
            .with_context(|| format!("Search failed: {}", query.explanation))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.with_context(|| format!("Search failed: {}", query.explanation))?);
        }

        self.cache.put_emails(key, results.clone());
        Ok(results)
    }

    /// Names of one entity kind above the id floor, alphabetically.
    pub fn entity_vocabulary(&self, kind: EntityKind, floor: i64) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT entity FROM entities WHERE entity_id > ?1 AND {} ORDER BY entity",
            kind.enttype_predicate()
        );
        let key = format!("{sql}|{floor}");
        if let Some(hit) = self.cache.list(&key) {
            return Ok(hit);
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([floor], |row| row.get::<_, String>(0))?;
        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }

        self.cache.put_list(key, names.clone());
        Ok(names)
    }

    /// Emails per calendar day from `since` onward.
    pub fn daily_counts(&self, since: &str) -> Result<Vec<DailyCount>> {
        let sql = "SELECT date(sent) AS day, COUNT(*) AS emails
                   FROM emails WHERE sent >= ?1
                   GROUP BY day ORDER BY day";
        let key = format!("{sql}|{since}");
        if let Some(hit) = self.cache.counts(&key) {
            return Ok(hit);
        }

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([since], |row| {
            Ok(DailyCount {
                date: row.get(0)?,
                emails: row.get(1)?,
            })
        })?;
        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }

        self.cache.put_counts(key, counts.clone());
        Ok(counts)
    }
}
