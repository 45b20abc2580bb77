//! Request parameters accepted by the plain-text API.

use serde::Deserialize;

/// Query string shared by the listing endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PlainQuery {
    /// Search term. Absent means "everything".
    pub q: Option<String>,
    /// 1-indexed page. Absent means the first page.
    pub page: Option<i64>,
}

/// Form body for registering a new user.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub nickname: String,
    pub url: String,
}

/// Query string for removing a user.
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub url: String,
}
