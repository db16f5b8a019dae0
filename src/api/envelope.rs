//! JSON envelope for the `/api/v1` dashboard endpoints.
//!
//! Successful answers are `{ "data": ..., "meta": { ... } }` where `meta`
//! names the table snapshot the answer was computed from, so a client can tell
//! when a re-ingest has changed the data under an open dashboard. Failures are
//! `{ "error": { "code", "message" }, "meta": { ... } }` and carry no snapshot.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;

use crate::table::TimelineTable;
use crate::types::dates::format_table_date;

const API_VERSION: &str = "1";

/// Metadata included in every response.
#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub timestamp: String,
    pub version: &'static str,
    /// `Last Updated Date` of the served table (`DD-Mon-YY`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
    /// Rows in the served table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
}

impl ResponseMeta {
    fn bare() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            version: API_VERSION,
            snapshot: None,
            records: None,
        }
    }

    pub fn for_table(table: &TimelineTable) -> Self {
        Self {
            snapshot: table.last_updated().map(format_table_date),
            records: Some(table.len()),
            ..Self::bare()
        }
    }
}

/// Successful response body.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with `data`, stamped with the table it was computed from.
    pub fn ok(data: T, table: &TimelineTable) -> Response {
        let body = Self {
            data,
            meta: ResponseMeta::for_table(table),
        };
        (StatusCode::OK, axum::Json(body)).into_response()
    }

    /// Like [`ok`](Self::ok), but `None` answers 204 with no body: the client
    /// keeps whatever list it is already showing.
    pub fn ok_or_keep(data: Option<T>, table: &TimelineTable) -> Response {
        match data {
            Some(data) => Self::ok(data, table),
            None => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ErrorDetail,
    pub meta: ResponseMeta,
}

/// Request failures the dashboard API reports.
#[derive(Debug)]
pub enum ApiError {
    /// Body is not JSON, or not the selection/request shape
    MalformedBody(String),
    UnknownEndpoint(String),
}

impl ApiError {
    const fn status(&self) -> (StatusCode, &'static str) {
        match self {
            Self::MalformedBody(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::UnknownEndpoint(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        Self::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        let message = match self {
            Self::MalformedBody(m) => m,
            Self::UnknownEndpoint(path) => format!("no such endpoint: {path}"),
        };
        let body = ApiErrorResponse {
            error: ErrorDetail { code, message },
            meta: ResponseMeta::bare(),
        };
        (status, axum::Json(body)).into_response()
    }
}
