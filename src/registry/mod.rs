//! Registry Module
//!
//! The in-process store behind a twtxt registry: who is registered, what they
//! have posted, and how to search it.
//!
//! ## Core Concepts
//! - **TimeMap**: Statuses keyed by their own timestamp, one line per instant.
//! - **UserRecord**: A publisher's identity plus their statuses behind a per-user lock.
//! - **Index**: URL -> record map behind a coarse lock. Owns insertion, removal,
//!   crawling of remote registries and per-user refreshes.
//! - **Queries**: Substring search over users and statuses, sorted newest first,
//!   plus fixed-size pagination.
//!
//! ## Submodules
//! - **`error`**: Error kinds and per-line parse issues.
//! - **`types`**: `TimeMap`, ordering primitives and line rendering.
//! - **`user`**: `UserRecord`.
//! - **`index`**: `Index` and its mutation operations.
//! - **`query`**: Read-only query operations and `reduce_to_page`.

pub mod error;
pub mod index;
pub mod query;
pub mod types;
pub mod user;

pub use error::{LineIssue, RegistryError, Result};
pub use index::{CrawlSummary, Index};
pub use query::{PAGE_SIZE, reduce_to_page};
pub use types::{TimeMap, TimeMapSlice, TimeSlice, Timestamp};
pub use user::UserRecord;
