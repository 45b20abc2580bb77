//! Query Engine
//!
//! Read-only searches over an [`Index`]. Every query holds the index read
//! lock for its whole scan, so it sees one consistent set of users.

use super::error::{RegistryError, Result};
use super::index::Index;
use super::types::{TimeMapSlice, Timestamp, parse_timestamp, render_user};

/// Number of lines in one page of results.
pub const PAGE_SIZE: usize = 20;

impl Index {
    /// Users whose nick or URL contains `term`, case-insensitively,
    /// most recently joined first. An empty term matches everyone.
    ///
    /// Users with an unreadable join date are left out.
    pub async fn query_user(&self, term: &str) -> Result<Vec<String>> {
        let needle = term.to_lowercase();
        let mut matches: Vec<(Timestamp, String)> = Vec::new();

        let users = self.users.read().await;
        for (url, record) in users.iter() {
            let hit = record.nick().to_lowercase().contains(&needle)
                || url.to_lowercase().contains(&needle);
            if !hit {
                continue;
            }
            let Ok(joined) = parse_timestamp(record.joined_at()) else {
                tracing::debug!("Skipping {} with bad join date {:?}", url, record.joined_at());
                continue;
            };
            matches.push((joined, render_user(record.nick(), url, record.joined_at())));
        }
        drop(users);

        // Line text breaks ties so equal join dates still come out in a stable order.
        matches.sort_unstable_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        Ok(matches.into_iter().map(|(_, line)| line).collect())
    }

    /// Statuses from every user whose message contains `substr`,
    /// case-insensitively, newest first.
    pub async fn query_in_status(&self, substr: &str) -> Result<Vec<String>> {
        if substr.is_empty() {
            return Err(RegistryError::invalid_argument("cannot query for empty tag"));
        }

        let mut found = TimeMapSlice::new();
        let users = self.users.read().await;
        for record in users.values() {
            found.push(record.find_in_status(substr).await);
        }
        drop(users);

        Ok(found.sort_by_time())
    }

    /// Every known status, newest first.
    pub async fn query_all_statuses(&self) -> Result<Vec<String>> {
        let statuses = self.get_statuses().await?;
        Ok(TimeMapSlice(vec![statuses]).sort_by_time())
    }
}

/// Cuts one page of [`PAGE_SIZE`] lines out of `data`. Pages are 1-indexed.
///
/// - A page inside the data returns exactly its window.
/// - A page running past the end returns the tail from the last page
///   boundary that still leaves a full page (or from 0 for short data).
/// - Page 0 or a negative page returns everything.
pub fn reduce_to_page<T>(page: i64, data: &[T]) -> &[T] {
    let len = data.len() as i64;
    let size = PAGE_SIZE as i64;

    let mut end = size.saturating_mul(page);
    let mut start = end.saturating_sub(size);

    if end < 1 {
        end = len;
    } else if end > len {
        end = len;
        start = ((len - size).max(0) / size) * size;
    }
    if start < 0 || start >= len {
        start = 0;
    }

    &data[start as usize..end as usize]
}
