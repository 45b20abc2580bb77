//! User records and the per-user lock guarding their mutable state.

use super::error::{RegistryError, Result};
use super::types::{TimeMap, message_of, now_rfc3339};
use std::net::IpAddr;
use tokio::sync::RwLock;

/// Longest substring `find_in_status` will look for.
pub const MAX_STATUS_QUERY_LEN: usize = 140;

/// One registered publisher.
///
/// Identity fields are immutable after construction. Statuses and the cached
/// content-length signature live behind the record's own lock.
#[derive(Debug)]
pub struct UserRecord {
    nick: String,
    url: String,
    ip: Option<IpAddr>,
    joined_at: String,
    state: RwLock<UserState>,
}

#[derive(Debug, Default)]
struct UserState {
    statuses: TimeMap,
    content_length: Option<String>,
    /// Set once the record has been unlinked from its index.
    removed: bool,
}

impl UserRecord {
    /// Creates a record that joined now.
    pub fn new(
        nick: impl Into<String>,
        url: impl Into<String>,
        ip: Option<IpAddr>,
        statuses: TimeMap,
    ) -> Self {
        Self::with_joined_at(nick, url, ip, now_rfc3339(), statuses)
    }

    /// Creates a record with an explicit join date, e.g. when restoring from a dump.
    pub fn with_joined_at(
        nick: impl Into<String>,
        url: impl Into<String>,
        ip: Option<IpAddr>,
        joined_at: impl Into<String>,
        statuses: TimeMap,
    ) -> Self {
        Self {
            nick: nick.into(),
            url: url.into(),
            ip,
            joined_at: joined_at.into(),
            state: RwLock::new(UserState {
                statuses,
                ..UserState::default()
            }),
        }
    }

    /// Seeds the cached content-length signature of a record not yet shared.
    pub fn with_content_length(mut self, content_length: Option<String>) -> Self {
        self.state.get_mut().content_length = content_length;
        self
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn ip(&self) -> Option<IpAddr> {
        self.ip
    }

    pub fn joined_at(&self) -> &str {
        &self.joined_at
    }

    /// Snapshot of the user's statuses.
    pub async fn statuses(&self) -> TimeMap {
        self.state.read().await.statuses.clone()
    }

    pub async fn status_count(&self) -> usize {
        self.state.read().await.statuses.len()
    }

    /// Last content-length signature seen for the remote feed.
    pub async fn content_length(&self) -> Option<String> {
        self.state.read().await.content_length.clone()
    }

    pub async fn is_removed(&self) -> bool {
        self.state.read().await.removed
    }

    /// Statuses whose message contains `word`, case-insensitively.
    ///
    /// Words longer than [`MAX_STATUS_QUERY_LEN`] never match.
    pub async fn find_in_status(&self, word: &str) -> TimeMap {
        if word.chars().count() > MAX_STATUS_QUERY_LEN {
            return TimeMap::new();
        }
        let needle = word.to_lowercase();

        let state = self.state.read().await;
        state
            .statuses
            .iter()
            .filter(|(_, line)| message_of(line).to_lowercase().contains(&needle))
            .map(|(ts, line)| (*ts, line.clone()))
            .collect()
    }

    /// Folds freshly fetched statuses into this record.
    ///
    /// Existing statuses are never removed; equal timestamps take the new line.
    /// Fails with `NotFound` once the record has been unlinked from its index,
    /// so an update racing a deletion cannot write into a dead record.
    pub async fn merge_statuses(&self, fresh: TimeMap, content_length: Option<String>) -> Result<usize> {
        let mut state = self.state.write().await;
        if state.removed {
            return Err(RegistryError::not_found(format!(
                "user {} was removed",
                self.url
            )));
        }

        let before = state.statuses.len();
        state.statuses.merge(fresh);
        if content_length.is_some() {
            state.content_length = content_length;
        }

        Ok(state.statuses.len() - before)
    }

    /// Marks the record as unlinked. Callers must hold the index write lock.
    pub(crate) async fn mark_removed(&self) {
        self.state.write().await.removed = true;
    }
}
