use serde::Serialize;
use std::cmp::Ordering;

use crate::db::models::EmailRow;

pub const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Sent,
    Subject,
    From,
    To,
    Topic,
    Pages,
}

impl SortColumn {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sent" | "date" => Some(SortColumn::Sent),
            "subject" => Some(SortColumn::Subject),
            "from" => Some(SortColumn::From),
            "to" => Some(SortColumn::To),
            "topic" => Some(SortColumn::Topic),
            "pages" | "pg_cnt" => Some(SortColumn::Pages),
            _ => None,
        }
    }

    fn compare(&self, a: &EmailRow, b: &EmailRow) -> Ordering {
        match self {
            SortColumn::Sent => a.sent.cmp(&b.sent),
            SortColumn::Subject => a.subject.to_lowercase().cmp(&b.subject.to_lowercase()),
            SortColumn::From => a.from.to_lowercase().cmp(&b.from.to_lowercase()),
            SortColumn::To => a.to.to_lowercase().cmp(&b.to.to_lowercase()),
            SortColumn::Topic => a.topic.to_lowercase().cmp(&b.topic.to_lowercase()),
            SortColumn::Pages => a.pg_cnt.cmp(&b.pg_cnt),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// One page of the grid, 1-based.
#[derive(Debug, Clone, Serialize)]
pub struct GridPage<'a> {
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
    /// Index of the first row of this page within the whole result set.
    pub offset: usize,
    pub rows: &'a [EmailRow],
}

/// Sortable, paginated view over an executed result set.
#[derive(Debug, Clone)]
pub struct ResultGrid {
    rows: Vec<EmailRow>,
    page_size: usize,
}

impl ResultGrid {
    pub fn new(rows: Vec<EmailRow>, page_size: usize) -> Self {
        ResultGrid {
            rows,
            page_size: page_size.max(1),
        }
    }

    pub fn rows(&self) -> &[EmailRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stable sort, so ties keep the query's `sent` order.
    pub fn sort(&mut self, column: SortColumn, order: SortOrder) {
        self.rows.sort_by(|a, b| {
            let ord = column.compare(a, b);
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });
    }

    /// An empty grid still has one (empty) page.
    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(self.page_size).max(1)
    }

    /// Page `n` (1-based), clamped into range.
    pub fn page(&self, n: usize) -> GridPage<'_> {
        let page_count = self.page_count();
        let page = n.clamp(1, page_count);
        let offset = ((page - 1) * self.page_size).min(self.rows.len());
        let end = (offset + self.page_size).min(self.rows.len());
        GridPage {
            page,
            page_count,
            total: self.rows.len(),
            offset,
            rows: &self.rows[offset..end],
        }
    }

    /// Select a single row by its index in the (sorted) result set.
    pub fn select(&self, index: usize) -> Option<&EmailRow> {
        self.rows.get(index)
    }
}
