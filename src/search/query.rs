//! SQL construction for the email search.
//!
//! A [`FilterSet`] becomes one SELECT over `emails` plus a parallel
//! explanation string. Predicates are appended in a fixed order (date range,
//! entity membership, full-text) and every user value is a positional
//! parameter. The explanation renders entity names as SQL string literals so
//! a reader sees exactly which names were matched.

use rusqlite::types::Value;

use super::filters::{FilterError, FilterSet};

/// Entity ids at or below this value are system/noise records, not
/// extracted names.
pub const DEFAULT_ENTITY_ID_FLOOR: i64 = 515;

const SELECT_WITH_PREVIEW: &str = "SELECT e.sent, coalesce(e.subject, '') AS subject, e.pg_cnt,
       coalesce(e.from_email, '') AS \"from\", coalesce(e.to_emails, '') AS \"to\",
       coalesce(e.topic, '') AS topic,
       e.source_url_email, e.scrape_url AS file_description,
       e.email_id, e.file_id, e.file_pg_start AS pg_number
FROM emails e
";

const SELECT_MINIMAL: &str = "SELECT e.sent, coalesce(e.subject, '') AS subject, e.pg_cnt,
       coalesce(e.from_email, '') AS \"from\", coalesce(e.to_emails, '') AS \"to\",
       coalesce(e.topic, '') AS topic,
       NULL AS source_url_email, NULL AS file_description,
       e.email_id, e.file_id, NULL AS pg_number
FROM emails e
";

/// Which columns the base SELECT carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// Include source/preview URLs and the page offset.
    #[default]
    WithPreview,
    /// Same row shape, preview columns always NULL.
    Minimal,
}

impl Projection {
    fn select_from(&self) -> &'static str {
        match self {
            Projection::WithPreview => SELECT_WITH_PREVIEW,
            Projection::Minimal => SELECT_MINIMAL,
        }
    }
}

/// A ready-to-run search: SQL text, its positional parameters, and the
/// human-readable description of the active filters.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
    pub explanation: String,
}

impl BuiltQuery {
    /// Memoization key: SQL text plus rendered parameters. Text is
    /// length-prefixed so no parameter list can alias another.
    pub fn cache_key(&self) -> String {
        let mut key = self.sql.clone();
        for p in &self.params {
            key.push('\u{1f}');
            match p {
                Value::Null => key.push_str("null"),
                Value::Integer(i) => key.push_str(&format!("i:{i}")),
                Value::Real(r) => key.push_str(&format!("r:{r}")),
                Value::Text(t) => {
                    key.push_str(&format!("t{}:", t.len()));
                    key.push_str(t);
                }
                Value::Blob(b) => key.push_str(&format!("b{}:{b:?}", b.len())),
            }
        }
        key
    }
}

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    projection: Projection,
    entity_id_floor: i64,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        QueryBuilder::new(Projection::default(), DEFAULT_ENTITY_ID_FLOOR)
    }
}

impl QueryBuilder {
    pub fn new(projection: Projection, entity_id_floor: i64) -> Self {
        QueryBuilder {
            projection,
            entity_id_floor,
        }
    }

    /// Translate a filter set into SQL, params and explanation.
    pub fn build(&self, filters: &FilterSet) -> Result<BuiltQuery, FilterError> {
        filters.validate()?;

        let mut sql = String::from(self.projection.select_from());
        let mut params: Vec<Value> = Vec::new();

        let begin = filters.begin_date.format("%Y-%m-%d").to_string();
        let end = filters.end_date.format("%Y-%m-%d").to_string();
        sql.push_str("WHERE e.sent BETWEEN ?1 AND ?2\n");
        let mut explanation = format!(
            "where sent between {} and {}",
            quote_literal(&begin),
            quote_literal(&end)
        );
        params.push(Value::Text(begin));
        params.push(Value::Text(end));

        let entities = filters.entities();
        if !entities.is_empty() {
            let floor_idx = params.len() + 1;
            params.push(Value::Integer(self.entity_id_floor));
            let list = placeholders(params.len() + 1, entities.len());
            params.extend(entities.iter().cloned().map(Value::Text));

            sql.push_str(&format!(
                "  AND e.email_id IN (
      SELECT eem.email_id
      FROM entities ent
      JOIN entity_emails eem ON ent.entity_id = eem.entity_id
      WHERE ent.entity_id > ?{floor_idx} AND ent.entity IN ({list}))\n"
            ));
            explanation.push_str(&format!(
                " and email references at least one of {}",
                literal_list(&entities)
            ));
        }

        if let Some(raw) = filters.full_text_query() {
            let term = normalize_full_text(raw);
            sql.push_str(&format!(
                "  AND e.email_id IN (SELECT rowid FROM emails_fts WHERE emails_fts MATCH ?{})\n",
                params.len() + 1
            ));
            explanation.push_str(&format!(" and email body matches {term}"));
            params.push(Value::Text(term));
        }

        sql.push_str("ORDER BY e.sent");

        Ok(BuiltQuery {
            sql,
            params,
            explanation,
        })
    }
}

/// Render a value as a single-quoted SQL string literal, doubling any
/// embedded single quotes.
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// `('a', 'b', ...)` in input order.
pub fn literal_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| quote_literal(s)).collect();
    format!("({})", quoted.join(", "))
}

/// A query typed as `'some words'` is a phrase search: the single quotes are
/// replaced by double quotes around the inner text. Anything else passes
/// through for the match operator to interpret.
pub fn normalize_full_text(raw: &str) -> String {
    let q = raw.trim();
    match q.strip_prefix('\'') {
        Some(rest) => {
            let inner = rest.strip_suffix('\'').unwrap_or(rest);
            format!("\"{}\"", inner.replace('"', "\"\""))
        }
        None => q.to_string(),
    }
}

/// `?start, ?start+1, ...` for `count` parameters.
fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}
