// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

//! HTTP error mapping.
//!
//! | Kind | Status |
//! |------|--------|
//! | `NotFound` | 404 |
//! | `Conflict` | 409 |
//! | `InvalidArgument` | 400 |
//! | `Unauthorized` | 401 + `WWW-Authenticate: ApiKey` |
//! | `Internal`, `Misconfigured` | 500 |
//!
//! Bodies are `{"detail": "..."}`. Internal detail goes to the log only.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::application::error::ServiceError;

pub const INTERNAL_ERROR_DETAIL: &str = "An internal error occurred";

#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    /// Write endpoint hit while no API key is configured
    Misconfigured,
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Service(ServiceError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg),
            ApiError::Service(ServiceError::Conflict(msg)) => (StatusCode::CONFLICT, msg),
            ApiError::Service(ServiceError::InvalidArgument(msg)) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Service(ServiceError::Unauthorized) => {
                let mut response = (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "detail": ServiceError::Unauthorized.to_string() })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("ApiKey"));
                return response;
            }
            ApiError::Service(ServiceError::Internal(detail)) => {
                error!("Internal error while handling request: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_DETAIL.to_string())
            }
            ApiError::Misconfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Service not configured for authenticated requests".to_string(),
            ),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
