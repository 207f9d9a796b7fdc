use chrono::NaiveDate;
use thiserror::Error;

/// Start of the default search window (first day with dense coverage).
pub const DEFAULT_BEGIN: (i32, u32, u32) = (2020, 3, 19);
/// End of the default search window.
pub const DEFAULT_END: (i32, u32, u32) = (2020, 3, 20);

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("invalid date \"{0}\" (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("start date {begin} is after end date {end}")]
    InvertedDateRange { begin: NaiveDate, end: NaiveDate },
}

/// Search criteria for one query execution.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet {
    pub begin_date: NaiveDate,
    pub end_date: NaiveDate,
    pub persons: Vec<String>,
    pub orgs: Vec<String>,
    pub locations: Vec<String>,
    pub full_text: Option<String>,
}

impl Default for FilterSet {
    fn default() -> Self {
        FilterSet::new(default_date(DEFAULT_BEGIN), default_date(DEFAULT_END))
    }
}

impl FilterSet {
    pub fn new(begin_date: NaiveDate, end_date: NaiveDate) -> Self {
        FilterSet {
            begin_date,
            end_date,
            persons: Vec::new(),
            orgs: Vec::new(),
            locations: Vec::new(),
            full_text: None,
        }
    }

    /// Persons, then organizations, then locations. Duplicates keep their
    /// first position.
    pub fn entities(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for name in self
            .persons
            .iter()
            .chain(self.orgs.iter())
            .chain(self.locations.iter())
        {
            if !out.iter().any(|seen| seen == name) {
                out.push(name.clone());
            }
        }
        out
    }

    /// The full-text query, or None when absent or blank.
    pub fn full_text_query(&self) -> Option<&str> {
        self.full_text
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.begin_date > self.end_date {
            return Err(FilterError::InvertedDateRange {
                begin: self.begin_date,
                end: self.end_date,
            });
        }
        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` date as typed on the command line or in config.
pub fn parse_date(s: &str) -> Result<NaiveDate, FilterError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| FilterError::InvalidDate(s.to_string()))
}

pub(crate) fn default_date((y, m, d): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn default_window_is_march_19_to_20() {
        let f = FilterSet::default();
        assert_eq!(f.begin_date, date("2020-03-19"));
        assert_eq!(f.end_date, date("2020-03-20"));
        assert!(f.entities().is_empty());
        assert!(f.full_text_query().is_none());
    }

    #[test]
    fn entities_union_keeps_order_and_drops_duplicates() {
        let mut f = FilterSet::default();
        f.persons = vec!["Anthony Fauci".into(), "Francis Collins".into()];
        f.orgs = vec!["NIH".into(), "Anthony Fauci".into()];
        f.locations = vec!["Wuhan".into()];
        assert_eq!(
            f.entities(),
            vec!["Anthony Fauci", "Francis Collins", "NIH", "Wuhan"]
        );
    }

    #[test]
    fn blank_full_text_is_absent() {
        let mut f = FilterSet::default();
        f.full_text = Some("   ".into());
        assert!(f.full_text_query().is_none());
        f.full_text = Some("  masks ".into());
        assert_eq!(f.full_text_query(), Some("masks"));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let f = FilterSet::new(date("2020-04-01"), date("2020-03-01"));
        assert_eq!(
            f.validate(),
            Err(FilterError::InvertedDateRange {
                begin: date("2020-04-01"),
                end: date("2020-03-01"),
            })
        );
        assert!(FilterSet::new(date("2020-03-01"), date("2020-03-01"))
            .validate()
            .is_ok());
    }

    #[test]
    fn bad_dates_are_reported() {
        assert_eq!(
            parse_date("03/19/2020"),
            Err(FilterError::InvalidDate("03/19/2020".into()))
        );
        assert_eq!(parse_date(" 2020-03-19 ").unwrap(), date("2020-03-19"));
    }
}
