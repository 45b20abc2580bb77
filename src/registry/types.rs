//! Time-keyed status collections and the ordering primitives used to sort them.

use super::error::{RegistryError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;

/// Key type for every status and join date in the registry.
pub type Timestamp = DateTime<Utc>;

/// Separator between the fields of a rendered line.
pub const FIELD_SEPARATOR: char = '\t';

/// Parses an RFC3339 timestamp as found in twtxt files.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| RegistryError::malformed(format!("invalid timestamp {:?}: {}", raw, e)))
}

/// Current time in the RFC3339 wire format used for `joined_at`.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Renders a stored status line: `nick \t url \t timestamp \t message`.
pub fn render_status(nick: &str, url: &str, timestamp: &str, message: &str) -> String {
    format!("{nick}\t{url}\t{timestamp}\t{message}")
}

/// Renders a user summary line: `nick \t url \t joined_at`.
pub fn render_user(nick: &str, url: &str, joined_at: &str) -> String {
    format!("{nick}\t{url}\t{joined_at}")
}

/// The message part of a rendered status line (the final tab-separated field).
pub fn message_of(line: &str) -> &str {
    line.rsplit(FIELD_SEPARATOR).next().unwrap_or(line)
}

/// Statuses keyed by their own timestamp.
///
/// At most one entry exists per exact timestamp; inserting an existing
/// timestamp overwrites the previous line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeMap {
    entries: HashMap<Timestamp, String>,
}

impl TimeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a line, returning the one it replaced.
    pub fn insert(&mut self, timestamp: Timestamp, line: String) -> Option<String> {
        self.entries.insert(timestamp, line)
    }

    pub fn get(&self, timestamp: &Timestamp) -> Option<&String> {
        self.entries.get(timestamp)
    }

    pub fn contains(&self, timestamp: &Timestamp) -> bool {
        self.entries.contains_key(timestamp)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Timestamp, &String)> {
        self.entries.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &String> {
        self.entries.values()
    }

    /// Union with `other`; on equal timestamps `other` wins.
    pub fn merge(&mut self, other: TimeMap) {
        self.entries.extend(other.entries);
    }

    /// Collects the timestamps into a sortable key list.
    pub fn keys(&self) -> TimeSlice {
        TimeSlice(self.entries.keys().copied().collect())
    }

    /// Lines ordered by timestamp, newest first.
    pub fn sorted_lines(&self) -> Vec<String> {
        let mut keys = self.keys();
        keys.sort_descending();
        keys.0
            .iter()
            .filter_map(|ts| self.entries.get(ts).cloned())
            .collect()
    }
}

impl FromIterator<(Timestamp, String)> for TimeMap {
    fn from_iter<I: IntoIterator<Item = (Timestamp, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TimeMap {
    type Item = (Timestamp, String);
    type IntoIter = std::collections::hash_map::IntoIter<Timestamp, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A list of timestamps that sorts newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeSlice(pub Vec<Timestamp>);

impl TimeSlice {
    pub fn sort_descending(&mut self) {
        self.0.sort_unstable_by(|a, b| b.cmp(a));
    }
}

/// Several status collections waiting to be merged into one sorted result.
#[derive(Debug, Clone, Default)]
pub struct TimeMapSlice(pub Vec<TimeMap>);

impl TimeMapSlice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: TimeMap) {
        self.0.push(map);
    }

    /// Unions every collection and projects the lines newest first.
    ///
    /// Two collections holding the same timestamp collapse into one line.
    /// Which one survives depends on merge order and is not guaranteed.
    pub fn sort_by_time(self) -> Vec<String> {
        let mut union = TimeMap::new();
        for map in self.0 {
            union.merge(map);
        }
        union.sorted_lines()
    }
}
