use std::cell::RefCell;
use std::collections::HashMap;

use super::models::{DailyCount, EmailRow};

/// Results memoized by query text for the life of a `Database`.
///
/// Entries are never invalidated; a different query text is a different key.
#[derive(Debug, Default)]
pub struct QueryCache {
    lists: RefCell<HashMap<String, Vec<String>>>,
    emails: RefCell<HashMap<String, Vec<EmailRow>>>,
    counts: RefCell<HashMap<String, Vec<DailyCount>>>,
}

impl QueryCache {
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        self.lists.borrow().get(key).cloned()
    }

    pub fn put_list(&self, key: String, value: Vec<String>) {
        self.lists.borrow_mut().insert(key, value);
    }

    pub fn emails(&self, key: &str) -> Option<Vec<EmailRow>> {
        self.emails.borrow().get(key).cloned()
    }

    pub fn put_emails(&self, key: String, value: Vec<EmailRow>) {
        self.emails.borrow_mut().insert(key, value);
    }

    pub fn counts(&self, key: &str) -> Option<Vec<DailyCount>> {
        self.counts.borrow().get(key).cloned()
    }

    pub fn put_counts(&self, key: String, value: Vec<DailyCount>) {
        self.counts.borrow_mut().insert(key, value);
    }

    /// Total memoized entries across all kinds.
    pub fn len(&self) -> usize {
        self.lists.borrow().len() + self.emails.borrow().len() + self.counts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
