//! Plain-text HTTP API
//!
//! A thin axum surface over the [`Index`](crate::registry::Index). Every
//! listing answers with newline-separated, tab-delimited lines, paginated
//! with `reduce_to_page`.
//!
//! ## Submodules
//! - **`handlers`**: Axum request handlers and the error -> status mapping.
//! - **`types`**: Query string and form parameters.

pub mod handlers;
pub mod types;

use crate::registry::Index;
use axum::routing::get;
use axum::{Extension, Router};
use handlers::*;
use std::sync::Arc;

pub const ENDPOINT_USERS: &str = "/api/plain/users";
pub const ENDPOINT_TWEETS: &str = "/api/plain/tweets";
pub const ENDPOINT_TAGS: &str = "/api/plain/tags/:tag";
pub const ENDPOINT_VERSION: &str = "/api/plain/version";

/// Builds the router. Serve it with `into_make_service_with_connect_info::<SocketAddr>()`,
/// registration needs the client address.
pub fn router(index: Arc<Index>) -> Router {
    Router::new()
        .route(
            ENDPOINT_USERS,
            get(handle_query_users)
                .post(handle_register_user)
                .delete(handle_delete_user),
        )
        .route(ENDPOINT_TWEETS, get(handle_query_tweets))
        .route(ENDPOINT_TAGS, get(handle_query_tag))
        .route(ENDPOINT_VERSION, get(handle_version))
        .layer(Extension(index))
}
