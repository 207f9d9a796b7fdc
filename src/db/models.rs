use serde::Serialize;

/// One row of the search result grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailRow {
    pub sent: String,
    pub subject: String,
    pub pg_cnt: i64,
    pub from: String,
    pub to: String,
    pub topic: String,
    pub source_url_email: Option<String>,
    pub file_description: Option<String>,
    pub email_id: i64,
    pub file_id: Option<i64>,
    pub pg_number: Option<i64>,
}

impl EmailRow {
    /// Column names in projection order, as exported to CSV.
    pub const COLUMNS: [&'static str; 11] = [
        "sent",
        "subject",
        "pg_cnt",
        "from",
        "to",
        "topic",
        "source_url_email",
        "file_description",
        "email_id",
        "file_id",
        "pg_number",
    ];

    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(EmailRow {
            sent: row.get(0)?,
            subject: row.get(1)?,
            pg_cnt: row.get(2)?,
            from: row.get(3)?,
            to: row.get(4)?,
            topic: row.get(5)?,
            source_url_email: row.get(6)?,
            file_description: row.get(7)?,
            email_id: row.get(8)?,
            file_id: row.get(9)?,
            pg_number: row.get(10)?,
        })
    }

    /// Field values in `COLUMNS` order; missing values render empty.
    pub fn values(&self) -> [String; 11] {
        let opt_str = |v: &Option<String>| v.clone().unwrap_or_default();
        let opt_num = |v: &Option<i64>| v.map(|n| n.to_string()).unwrap_or_default();
        [
            self.sent.clone(),
            self.subject.clone(),
            self.pg_cnt.to_string(),
            self.from.clone(),
            self.to.clone(),
            self.topic.clone(),
            opt_str(&self.source_url_email),
            opt_str(&self.file_description),
            self.email_id.to_string(),
            opt_num(&self.file_id),
            opt_num(&self.pg_number),
        ]
    }
}

/// Entity vocabularies offered as filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Person,
    Org,
    Location,
}

impl EntityKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "person" | "persons" | "people" => Some(EntityKind::Person),
            "org" | "orgs" | "organization" | "organizations" => Some(EntityKind::Org),
            "location" | "locations" | "loc" => Some(EntityKind::Location),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntityKind::Person => "person",
            EntityKind::Org => "org",
            EntityKind::Location => "location",
        }
    }

    /// `enttype` predicate for this kind. Static text, never user input.
    pub fn enttype_predicate(&self) -> &'static str {
        match self {
            EntityKind::Person => "enttype = 'PERSON'",
            EntityKind::Org => "enttype = 'ORG'",
            EntityKind::Location => "enttype IN ('GPE', 'LOC', 'NORP', 'FAC')",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    pub date: String,
    pub emails: i64,
}

/// Stats returned by `foiex stats`.
#[derive(Debug, Clone, Serialize)]
pub struct DbStats {
    pub emails: i64,
    pub entities: i64,
    pub entity_links: i64,
    pub first_sent: Option<String>,
    pub last_sent: Option<String>,
    pub db_size_bytes: u64,
}
