//! Registry Index
//!
//! The shared map from a user's feed URL to their record.
//!
//! ## Locking
//! Two levels, always acquired in this order:
//! 1. the index lock, guarding which URLs exist;
//! 2. a record's own lock, guarding its statuses and cached signature.
//!
//! Updates clone the record's `Arc` under the index read lock, drop it, and
//! only then take the record lock. Removal takes the index write lock, unlinks
//! the record, then takes the record lock to mark it removed. An update that
//! raced a removal therefore finds the mark and writes nothing.

use super::error::{LineIssue, RegistryError, Result};
use super::types::TimeMap;
use super::user::UserRecord;
use crate::fetch::client::{Fetcher, Resource};
use crate::fetch::parser::{parse_registry_dump, parse_single_user_feed};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Outcome of folding a remote registry into the index.
#[derive(Debug, Default)]
pub struct CrawlSummary {
    /// Users that were not known before.
    pub added: usize,
    /// Users already present and left untouched.
    pub skipped: usize,
    /// Dump lines that could not be used.
    pub issues: Vec<LineIssue>,
}

/// Checks that `url` is non-empty and http(s).
pub fn validate_url(url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(RegistryError::invalid_argument("url must be specified"));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(RegistryError::invalid_argument(format!("invalid URL: {}", url)));
    }
    Ok(())
}

/// An independent registry of users and their statuses.
pub struct Index {
    pub(super) users: RwLock<HashMap<String, Arc<UserRecord>>>,
    fetcher: Arc<dyn Fetcher>,
}

impl Index {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            fetcher,
        }
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Every registered URL, in no particular order.
    pub async fn urls(&self) -> Vec<String> {
        self.users.read().await.keys().cloned().collect()
    }

    /// Registers a new user. Fails with `DuplicateUser` if the URL is taken.
    pub async fn add_user(
        &self,
        nick: &str,
        url: &str,
        ip: Option<IpAddr>,
        statuses: TimeMap,
    ) -> Result<()> {
        if nick.is_empty() {
            return Err(RegistryError::invalid_argument(
                "both URL and nick must be specified",
            ));
        }
        validate_url(url)?;

        self.insert_new(UserRecord::new(nick, url, ip, statuses)).await
    }

    async fn insert_new(&self, record: UserRecord) -> Result<()> {
        let mut users = self.users.write().await;
        match users.entry(record.url().to_string()) {
            Entry::Occupied(slot) => {
                tracing::info!("User {} can't be added - already exists", slot.key());
                Err(RegistryError::DuplicateUser {
                    url: slot.key().clone(),
                })
            }
            Entry::Vacant(slot) => {
                tracing::info!("Added user {} ({})", record.nick(), record.url());
                slot.insert(Arc::new(record));
                Ok(())
            }
        }
    }

    /// Fetches a new user's feed and registers them with its statuses.
    ///
    /// Returns the number of statuses indexed.
    pub async fn register_user(&self, nick: &str, url: &str, ip: Option<IpAddr>) -> Result<usize> {
        if nick.is_empty() {
            return Err(RegistryError::invalid_argument(
                "both URL and nick must be specified",
            ));
        }
        validate_url(url)?;
        if self.users.read().await.contains_key(url) {
            return Err(RegistryError::DuplicateUser {
                url: url.to_string(),
            });
        }

        // Probed before the body, so a change during the fetch shows up on the next refresh.
        let signature = match self.fetcher.probe_content_length(url).await {
            Ok(signature) => (!signature.is_empty()).then_some(signature),
            Err(e) => {
                tracing::debug!("No length signature for {}: {}", url, e);
                None
            }
        };

        let body = match self.fetcher.fetch(url).await? {
            Resource::SingleUserFeed(body) => body,
            Resource::RegistryDump(_) => {
                return Err(RegistryError::wrong_kind(format!(
                    "{} is a registry dump, not a user feed",
                    url
                )));
            }
        };
        let parsed = parse_single_user_feed(&body, nick, url)?;
        for issue in &parsed.issues {
            tracing::warn!("Feed {}: {}", url, issue);
        }

        let count = parsed.statuses.len();
        let record = UserRecord::new(nick, url, ip, parsed.statuses).with_content_length(signature);
        self.insert_new(record).await?;
        Ok(count)
    }

    /// Removes a user and all their statuses.
    pub async fn del_user(&self, url: &str) -> Result<()> {
        self.pop_user(url).await.map(|_| ())
    }

    /// Removes a user and hands back the unlinked record.
    ///
    /// Lookup and removal happen under one write lock. The returned record is
    /// marked removed; its statuses can still be read but no longer updated.
    pub async fn pop_user(&self, url: &str) -> Result<Arc<UserRecord>> {
        validate_url(url)?;

        let mut users = self.users.write().await;
        let record = users.remove(url).ok_or_else(|| {
            RegistryError::not_found(format!("can't delete user {}, user doesn't exist", url))
        })?;
        record.mark_removed().await;
        drop(users);

        tracing::info!("Removed user {}", url);
        Ok(record)
    }

    /// Inserts or replaces a fully formed record under its own URL.
    pub async fn put(&self, record: UserRecord) -> Result<()> {
        if record.url().is_empty() {
            return Err(RegistryError::invalid_argument("record has an empty url"));
        }

        let url = record.url().to_string();
        let mut users = self.users.write().await;
        if let Some(previous) = users.insert(url.clone(), Arc::new(record)) {
            previous.mark_removed().await;
            tracing::debug!("Replaced record for {}", url);
        }
        Ok(())
    }

    /// Looks up a record without removing it.
    pub async fn get(&self, url: &str) -> Result<Arc<UserRecord>> {
        validate_url(url)?;
        self.users
            .read()
            .await
            .get(url)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(format!("user {} doesn't exist", url)))
    }

    /// Re-fetches a user's feed and merges any new statuses.
    ///
    /// Returns the number of statuses added. Fails with `NoNewData` when the
    /// remote length signature matches the cached one.
    pub async fn update_user(&self, url: &str) -> Result<usize> {
        let record = self.get(url).await?;

        let signature = self.fetcher.probe_content_length(url).await?;
        if !signature.is_empty()
            && record.content_length().await.as_deref() == Some(signature.as_str())
        {
            return Err(RegistryError::NoNewData {
                url: url.to_string(),
            });
        }

        let body = match self.fetcher.fetch(url).await? {
            Resource::SingleUserFeed(body) => body,
            Resource::RegistryDump(_) => {
                return Err(RegistryError::wrong_kind(format!(
                    "{} is a registry dump, not a user feed",
                    url
                )));
            }
        };

        let parsed = parse_single_user_feed(&body, record.nick(), url)?;
        for issue in &parsed.issues {
            tracing::warn!("Feed {}: {}", url, issue);
        }

        let signature = (!signature.is_empty()).then_some(signature);
        let added = record.merge_statuses(parsed.statuses, signature).await?;
        tracing::debug!("Updated {}: {} new statuses", url, added);
        Ok(added)
    }

    /// Fetches another registry's dump and adds the users it does not know yet.
    ///
    /// Users already in the index are left completely untouched.
    pub async fn crawl_remote_registry(&self, url: &str) -> Result<CrawlSummary> {
        validate_url(url)?;

        let body = match self.fetcher.fetch(url).await? {
            Resource::RegistryDump(body) => body,
            Resource::SingleUserFeed(_) => {
                return Err(RegistryError::wrong_kind(format!(
                    "{} is a user feed, not a registry dump",
                    url
                )));
            }
        };

        let parsed = parse_registry_dump(&body)?;
        let mut summary = CrawlSummary {
            issues: parsed.issues,
            ..CrawlSummary::default()
        };

        let mut users = self.users.write().await;
        for record in parsed.users {
            match users.entry(record.url().to_string()) {
                Entry::Occupied(_) => summary.skipped += 1,
                Entry::Vacant(slot) => {
                    slot.insert(Arc::new(record));
                    summary.added += 1;
                }
            }
        }
        drop(users);

        tracing::info!(
            "Crawled {}: {} added, {} already known, {} bad lines",
            url,
            summary.added,
            summary.skipped,
            summary.issues.len()
        );
        Ok(summary)
    }

    /// Snapshot of one user's statuses.
    pub async fn get_user_statuses(&self, url: &str) -> Result<TimeMap> {
        let record = self.get(url).await.map_err(|e| match e {
            RegistryError::NotFound { .. } => RegistryError::not_found(format!(
                "can't retrieve statuses of nonexistent user {}",
                url
            )),
            other => other,
        })?;
        Ok(record.statuses().await)
    }

    /// Union of every user's statuses.
    ///
    /// Statuses from different users sharing a timestamp collapse into one;
    /// which survives is unspecified.
    pub async fn get_statuses(&self) -> Result<TimeMap> {
        let mut statuses = TimeMap::new();

        let users = self.users.read().await;
        for record in users.values() {
            statuses.merge(record.statuses().await);
        }

        Ok(statuses)
    }
}
