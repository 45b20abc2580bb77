//! Periodic refresh: crawl seed registries, then re-check every known feed.

use crate::registry::Index;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Counters from one refresh pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    /// Seed registries crawled successfully.
    pub crawled: usize,
    /// Users whose feed was fetched and merged.
    pub updated: usize,
    /// Users whose feed signature had not changed.
    pub unchanged: usize,
    /// Crawls and updates that failed.
    pub failed: usize,
}

/// Runs one pass. A failing registry or user never stops the rest of the pass.
pub async fn refresh_once(index: &Index, seeds: &[String]) -> RefreshReport {
    let mut report = RefreshReport::default();

    for seed in seeds {
        match index.crawl_remote_registry(seed).await {
            Ok(_) => report.crawled += 1,
            Err(e) => {
                tracing::warn!("Failed to crawl registry {}: {}", seed, e);
                report.failed += 1;
            }
        }
    }

    for url in index.urls().await {
        match index.update_user(&url).await {
            Ok(_) => report.updated += 1,
            Err(e) if e.is_no_new_data() => report.unchanged += 1,
            Err(e) => {
                tracing::warn!("Failed to update {}: {}", url, e);
                report.failed += 1;
            }
        }
    }

    report
}

/// Spawns the refresh loop. The first pass runs immediately.
pub fn spawn_refresh_loop(
    index: Arc<Index>,
    seeds: Vec<String>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let report = refresh_once(&index, &seeds).await;
            tracing::info!(
                "Refresh: {} registries crawled, {} users updated, {} unchanged, {} failed ({} users known)",
                report.crawled,
                report.updated,
                report.unchanged,
                report.failed,
                index.len().await
            );
        }
    })
}
