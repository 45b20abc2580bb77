//! Shared fixtures for unit tests: a scripted fetcher and a seeded index.

use crate::fetch::client::{Fetcher, Resource};
use crate::registry::error::{RegistryError, Result};
use crate::registry::types::{TimeMap, Timestamp, render_status};
use crate::registry::{Index, UserRecord};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const FOO_URL: &str = "https://example.com/twtxt.txt";
pub const BARRINGTON_URL: &str = "https://example3.com/twtxt.txt";

/// Fetcher answering from an in-memory script instead of the network.
#[derive(Default)]
pub struct ScriptedFetcher {
    resources: Mutex<HashMap<String, Resource>>,
    signatures: Mutex<HashMap<String, String>>,
    pub fetches: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serve(&self, url: &str, resource: Resource) {
        self.resources
            .lock()
            .unwrap()
            .insert(url.to_string(), resource);
    }

    pub fn sign(&self, url: &str, signature: &str) {
        self.signatures
            .lock()
            .unwrap()
            .insert(url.to_string(), signature.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<Resource> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.resources
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| RegistryError::upstream(format!("couldn't get {}", url)))
    }

    async fn probe_content_length(&self, url: &str) -> Result<String> {
        Ok(self
            .signatures
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default())
    }
}

/// `now` minus roughly `n` months.
pub fn months_ago(now: Timestamp, n: i64) -> Timestamp {
    now - Duration::days(30 * n)
}

pub fn status(nick: &str, url: &str, ts: Timestamp, message: &str) -> (Timestamp, String) {
    (ts, render_status(nick, url, &ts.to_rfc3339(), message))
}

pub struct Seed {
    pub index: Index,
    pub fetcher: Arc<ScriptedFetcher>,
    /// Status times, newest first: T-1mo .. T-4mo.
    pub times: [Timestamp; 4],
}

/// Two users with two statuses each.
///
/// - `foo_barrington` joined T-2mo, posted at T-2mo and T-1mo.
/// - `foo` joined T-4mo, posted at T-4mo and T-3mo.
pub async fn seeded_index() -> Seed {
    let now = Utc::now();
    let times = [
        months_ago(now, 1),
        months_ago(now, 2),
        months_ago(now, 3),
        months_ago(now, 4),
    ];

    let barrington: TimeMap = [
        status(
            "foo_barrington",
            BARRINGTON_URL,
            times[1],
            "Just got started with #twtxt!",
        ),
        status(
            "foo_barrington",
            BARRINGTON_URL,
            times[0],
            "Hey <@foo https://example.com/twtxt.txt>, I love programming. Just FYI.",
        ),
    ]
    .into_iter()
    .collect();

    let foo: TimeMap = [
        status(
            "foo",
            FOO_URL,
            times[3],
            "This is so much better than #twitter",
        ),
        status(
            "foo",
            FOO_URL,
            times[2],
            "I can't wait to start on my next programming #project with <@foo_barrington https://example3.com/twtxt.txt>",
        ),
    ]
    .into_iter()
    .collect();

    let fetcher = ScriptedFetcher::new();
    let index = Index::new(fetcher.clone());
    index
        .put(UserRecord::with_joined_at(
            "foo_barrington",
            BARRINGTON_URL,
            None,
            times[1].to_rfc3339(),
            barrington,
        ))
        .await
        .unwrap();
    index
        .put(UserRecord::with_joined_at(
            "foo",
            FOO_URL,
            None,
            times[3].to_rfc3339(),
            foo,
        ))
        .await
        .unwrap();

    Seed {
        index,
        fetcher,
        times,
    }
}

/// Timestamp field of a rendered status or user line.
pub fn line_timestamp(line: &str, field: usize) -> Timestamp {
    let raw = line.split('\t').nth(field).expect("field present");
    crate::registry::types::parse_timestamp(raw).expect("valid timestamp")
}

pub fn assert_descending(lines: &[String], field: usize) {
    for pair in lines.windows(2) {
        assert!(
            line_timestamp(&pair[0], field) >= line_timestamp(&pair[1], field),
            "{:?} should not come before {:?}",
            pair[0],
            pair[1]
        );
    }
}
