// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Shared-secret guard for write endpoints.
//!
//! Handlers that mutate state take a [`RequireApiKey`] argument. The
//! submitted `X-API-Key` header is compared with the configured key in
//! constant time. With no key configured every write is refused with a 500,
//! never let through.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{error, warn};

use crate::application::error::ServiceError;
use crate::presentation::api::AppState;
use crate::presentation::error::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Proof that the request carried a valid API key.
#[derive(Debug, Clone, Copy)]
pub struct RequireApiKey;

impl FromRequestParts<Arc<AppState>> for RequireApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.api_key.as_deref() else {
            error!("API key is not configured, rejecting write request");
            return Err(ApiError::Misconfigured);
        };

        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());

        match provided {
            Some(key) if keys_match(key, expected) => Ok(RequireApiKey),
            _ => {
                // The submitted key is never logged.
                warn!(
                    "Rejected {} {} with invalid or missing API key",
                    parts.method,
                    parts.uri.path()
                );
                Err(ApiError::Service(ServiceError::Unauthorized))
            }
        }
    }
}

/// Constant-time comparison of the submitted and expected keys.
pub fn keys_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
