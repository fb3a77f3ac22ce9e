use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Key format for completion dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// One activity's completion history: calendar date -> completed.
///
/// Keys are validated on the way in, so every lookup works on real dates.
/// Serializes as a JSON object keyed by `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, bool>", into = "BTreeMap<String, bool>")]
pub struct CompletionMap {
    entries: BTreeMap<NaiveDate, bool>,
}

impl CompletionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `YYYY-MM-DD` key. Shorter forms like `2025-5-1` are rejected
    /// even though chrono would accept them.
    pub fn parse_key(key: &str) -> Result<NaiveDate, CompletionError> {
        let bytes = key.as_bytes();
        let shaped = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !shaped {
            return Err(CompletionError::InvalidDate(key.to_string()));
        }
        NaiveDate::parse_from_str(key, DATE_FORMAT)
            .map_err(|_| CompletionError::InvalidDate(key.to_string()))
    }

    /// Build from string-keyed entries. Later duplicates overwrite earlier ones.
    pub fn from_entries<I, K>(entries: I) -> Result<Self, CompletionError>
    where
        I: IntoIterator<Item = (K, bool)>,
        K: AsRef<str>,
    {
        let mut map = Self::new();
        for (key, completed) in entries {
            let date = Self::parse_key(key.as_ref())?;
            map.entries.insert(date, completed);
        }
        Ok(map)
    }

    pub fn insert(&mut self, date: NaiveDate, completed: bool) {
        self.entries.insert(date, completed);
    }

    pub fn get(&self, date: NaiveDate) -> Option<bool> {
        self.entries.get(&date).copied()
    }

    /// Absent entries count as not completed.
    pub fn is_completed(&self, date: NaiveDate) -> bool {
        self.get(date).unwrap_or(false)
    }

    /// Returns a copy with `date` flipped; an absent day becomes completed.
    pub fn toggled(&self, date: NaiveDate) -> Self {
        let mut next = self.clone();
        next.entries.insert(date, !self.is_completed(date));
        next
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, bool)> + '_ {
        self.entries.iter().map(|(d, c)| (*d, *c))
    }
}

impl TryFrom<BTreeMap<String, bool>> for CompletionMap {
    type Error = CompletionError;

    fn try_from(raw: BTreeMap<String, bool>) -> Result<Self, Self::Error> {
        Self::from_entries(raw)
    }
}

impl From<CompletionMap> for BTreeMap<String, bool> {
    fn from(map: CompletionMap) -> Self {
        map.entries
            .into_iter()
            .map(|(d, c)| (d.format(DATE_FORMAT).to_string(), c))
            .collect()
    }
}
