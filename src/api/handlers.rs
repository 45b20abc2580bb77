use super::types::{DeleteQuery, PlainQuery, RegisterForm};
use crate::registry::{Index, RegistryError, reduce_to_page};
use axum::Form;
use axum::extract::{ConnectInfo, Extension, Path, Query};
use axum::http::StatusCode;
use std::net::SocketAddr;
use std::sync::Arc;

/// HTTP status for each registry error kind.
pub fn status_for(err: &RegistryError) -> StatusCode {
    match err {
        RegistryError::InvalidArgument { .. } | RegistryError::MalformedData { .. } => {
            StatusCode::BAD_REQUEST
        }
        RegistryError::DuplicateUser { .. } => StatusCode::CONFLICT,
        RegistryError::NotFound { .. } => StatusCode::NOT_FOUND,
        RegistryError::WrongKind { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        RegistryError::NoNewData { .. } => StatusCode::NOT_MODIFIED,
        RegistryError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
    }
}

fn error_response(err: RegistryError) -> (StatusCode, String) {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::debug!("Request rejected: {}", err);
    }
    (status, format!("{} {}\n", status.as_u16(), err))
}

fn page_response(page: Option<i64>, lines: Vec<String>) -> (StatusCode, String) {
    let page = reduce_to_page(page.unwrap_or(1), &lines);
    let mut body = page.join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    (StatusCode::OK, body)
}

pub async fn handle_query_users(
    Extension(index): Extension<Arc<Index>>,
    Query(params): Query<PlainQuery>,
) -> (StatusCode, String) {
    let term = params.q.as_deref().unwrap_or_default();
    match index.query_user(term).await {
        Ok(lines) => page_response(params.page, lines),
        Err(e) => error_response(e),
    }
}

pub async fn handle_query_tweets(
    Extension(index): Extension<Arc<Index>>,
    Query(params): Query<PlainQuery>,
) -> (StatusCode, String) {
    let result = match params.q.as_deref() {
        Some(term) if !term.is_empty() => index.query_in_status(term).await,
        _ => index.query_all_statuses().await,
    };
    match result {
        Ok(lines) => page_response(params.page, lines),
        Err(e) => error_response(e),
    }
}

pub async fn handle_query_tag(
    Extension(index): Extension<Arc<Index>>,
    Path(tag): Path<String>,
    Query(params): Query<PlainQuery>,
) -> (StatusCode, String) {
    let tag = format!("#{}", tag.trim_start_matches('#'));
    match index.query_in_status(&tag).await {
        Ok(lines) => page_response(params.page, lines),
        Err(e) => error_response(e),
    }
}

pub async fn handle_register_user(
    Extension(index): Extension<Arc<Index>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    Form(form): Form<RegisterForm>,
) -> (StatusCode, String) {
    match index
        .register_user(&form.nickname, &form.url, Some(remote.ip()))
        .await
    {
        Ok(count) => {
            tracing::info!(
                "Registered {} ({}) from {} with {} statuses",
                form.nickname,
                form.url,
                remote.ip(),
                count
            );
            (StatusCode::OK, "200 OK\n".to_string())
        }
        Err(e) => error_response(e),
    }
}

pub async fn handle_delete_user(
    Extension(index): Extension<Arc<Index>>,
    Query(params): Query<DeleteQuery>,
) -> (StatusCode, String) {
    match index.del_user(&params.url).await {
        Ok(()) => (StatusCode::OK, "200 OK\n".to_string()),
        Err(e) => error_response(e),
    }
}

pub async fn handle_version() -> (StatusCode, String) {
    (
        StatusCode::OK,
        format!("{} {}\n", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    )
}
