//! Fetch Module
//!
//! Everything the registry needs from the outside world: downloading remote
//! twtxt files and registry dumps, and turning their bodies into statuses.
//!
//! ## Submodules
//! - **`client`**: The `Fetcher` seam and its reqwest-backed implementation.
//!   Requests are bounded by a timeout and must answer `200` with `text/plain`.
//! - **`parser`**: Line parsers for single-user feeds and registry dumps.

pub mod client;
pub mod parser;
