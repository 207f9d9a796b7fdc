use serde::Serialize;

use crate::config::PreviewConfig;
use crate::db::models::EmailRow;

pub const NO_SELECTION_PROMPT: &str = "Select row to view email";

/// What the preview pane shows for one selected email.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub email_id: i64,
    pub subject: String,
    pub sent: String,
    pub source_url_email: Option<String>,
    pub file_description: Option<String>,
    /// Embedded PDF viewer pointed at the email's first page.
    pub pdf_viewer_url: Option<String>,
}

impl Preview {
    pub fn for_row(row: &EmailRow, cfg: &PreviewConfig) -> Self {
        Preview {
            email_id: row.email_id,
            subject: row.subject.clone(),
            sent: row.sent.clone(),
            source_url_email: row.source_url_email.clone(),
            file_description: row.file_description.clone(),
            pdf_viewer_url: row.pg_number.map(|pg| pdf_viewer_url(cfg, pg)),
        }
    }
}

/// `{viewer}?embedded=true&url={base}/fauci_{pg}.pdf`
pub fn pdf_viewer_url(cfg: &PreviewConfig, pg_number: i64) -> String {
    format!(
        "{}?embedded=true&url={}/fauci_{pg_number}.pdf",
        cfg.viewer_url.trim_end_matches('?'),
        cfg.pdf_base_url.trim_end_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pg: Option<i64>) -> EmailRow {
        EmailRow {
            sent: "2020-03-19 08:15:00".into(),
            subject: "Re: coronavirus briefing".into(),
            pg_cnt: 2,
            from: "fauci@niaid.gov".into(),
            to: String::new(),
            topic: String::new(),
            source_url_email: Some("https://example.org/fauci/101".into()),
            file_description: Some("Fauci FOIA release, part 1".into()),
            email_id: 1,
            file_id: Some(1),
            pg_number: pg,
        }
    }

    #[test]
    fn viewer_url_uses_page_offset() {
        let p = Preview::for_row(&row(Some(101)), &PreviewConfig::default());
        assert_eq!(
            p.pdf_viewer_url.as_deref(),
            Some(
                "https://drive.google.com/viewerng/viewer?embedded=true\
                 &url=https://foiarchive-covid-19.s3.amazonaws.com/fauci/pdfs/fauci_101.pdf"
            )
        );
        assert_eq!(p.file_description.as_deref(), Some("Fauci FOIA release, part 1"));
    }

    #[test]
    fn no_page_no_viewer() {
        let p = Preview::for_row(&row(None), &PreviewConfig::default());
        assert!(p.pdf_viewer_url.is_none());
        assert!(p.source_url_email.is_some());
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let cfg = PreviewConfig {
            viewer_url: "https://viewer.test/v".into(),
            pdf_base_url: "https://pdfs.test/".into(),
        };
        assert_eq!(
            pdf_viewer_url(&cfg, 7),
            "https://viewer.test/v?embedded=true&url=https://pdfs.test/fauci_7.pdf"
        );
    }
}
