//! twtxt Registry Library
//!
//! An in-process registry for twtxt microblogs. It keeps every registered
//! user's statuses in memory, answers substring queries over users and
//! statuses, and keeps itself current by re-fetching feeds and crawling other
//! registries. The binary (`main.rs`) wires these modules to an HTTP listener.
//!
//! ## Architecture Modules
//! - **`registry`**: The shared index. Users, their time-keyed statuses, the
//!   two-level locking scheme and every query operation.
//! - **`fetch`**: Remote retrieval behind the `Fetcher` trait, plus the line
//!   parsers for user feeds and registry dumps.
//! - **`api`**: Plain-text axum endpoints over the index.
//! - **`refresh`**: The periodic crawl-and-update pass.
//! - **`config`**: Command line and environment configuration.

pub mod api;
pub mod config;
pub mod fetch;
pub mod refresh;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use fetch::client::{Fetcher, HttpFetcher, Resource};
pub use registry::{Index, RegistryError, UserRecord};
