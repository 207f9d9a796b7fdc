use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::db::models::EmailRow;

/// Filename offered for the download when none is given.
pub const DEFAULT_CSV_FILENAME: &str = "foia-covid19.csv";

/// Serialize the full result set: a leading row-index column, then every
/// projected column.
pub fn to_csv(rows: &[EmailRow]) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(&csv_line(
        std::iter::once(String::new()).chain(EmailRow::COLUMNS.iter().map(|c| c.to_string())),
    ));
    for (i, row) in rows.iter().enumerate() {
        out.push_str(&csv_line(
            std::iter::once(i.to_string()).chain(row.values()),
        ));
    }
    out.into_bytes()
}

/// Write the CSV to `path`, or stdout when `path` is `-`. Returns bytes written.
pub fn write_csv(rows: &[EmailRow], path: &Path) -> Result<usize> {
    let bytes = to_csv(rows);
    if path == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&bytes)?;
        stdout.flush()?;
    } else {
        std::fs::write(path, &bytes)
            .with_context(|| format!("Failed to write CSV: {}", path.display()))?;
    }
    Ok(bytes.len())
}

fn csv_line(fields: impl Iterator<Item = String>) -> String {
    let escaped: Vec<String> = fields.map(|f| csv_escape(&f)).collect();
    format!("{}\n", escaped.join(","))
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> EmailRow {
        EmailRow {
            sent: "2020-03-19 08:15:00".into(),
            subject: "Re: \"urgent\", please read".into(),
            pg_cnt: 2,
            from: "fauci@niaid.gov".into(),
            to: "a@x.gov, b@x.gov".into(),
            topic: String::new(),
            source_url_email: None,
            file_description: Some("part 1".into()),
            email_id: 1,
            file_id: Some(3),
            pg_number: None,
        }
    }

    #[test]
    fn header_starts_with_index_column() {
        let csv = String::from_utf8(to_csv(&[])).unwrap();
        assert_eq!(
            csv,
            ",sent,subject,pg_cnt,from,to,topic,source_url_email,file_description,email_id,file_id,pg_number\n"
        );
    }

    #[test]
    fn fields_with_commas_and_quotes_are_quoted() {
        let csv = String::from_utf8(to_csv(&[row()])).unwrap();
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(
            line,
            "0,2020-03-19 08:15:00,\"Re: \"\"urgent\"\", please read\",2,fauci@niaid.gov,\"a@x.gov, b@x.gov\",,,part 1,1,3,"
        );
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CSV_FILENAME);
        let n = write_csv(&[row(), row()], &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.len(), n);
        assert_eq!(content.lines().count(), 3);
    }
}
