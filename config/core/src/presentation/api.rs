// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

//! REST surface of the configuration store.
//!
//! All resource routes live under `/api/config`. Reads are open; writes
//! require a valid `X-API-Key` (see [`RequireApiKey`]). `/health` and `/`
//! report liveness without touching storage.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::application::{
    LayoutService, ModuleRegistryService, Repositories, ServiceError, SettingsService,
};
use crate::domain::layout::{
    ConfigMap, GridItem, LayoutDocument, LayoutProfile, ModuleInstanceConfig, DEFAULT_PROFILE,
};
use crate::domain::module::RegisteredModule;
use crate::domain::settings::{GlobalSettings, Theme};
use crate::presentation::auth::{RequireApiKey, API_KEY_HEADER};
use crate::presentation::error::{ApiError, INTERNAL_ERROR_DETAIL};

pub const SERVICE_NAME: &str = "OzMirror Configuration Service";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
    pub layout: LayoutService,
    pub modules: ModuleRegistryService,
    pub settings: SettingsService,
    /// Expected `X-API-Key`; `None` refuses every write
    pub api_key: Option<String>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(repositories: &Repositories, api_key: Option<String>) -> Self {
        Self {
            layout: LayoutService::new(
                repositories.layouts.clone(),
                repositories.modules.clone(),
            ),
            modules: ModuleRegistryService::new(repositories.modules.clone()),
            settings: SettingsService::new(
                repositories.settings.clone(),
                repositories.themes.clone(),
            ),
            api_key,
            start_time: Instant::now(),
        }
    }
}

pub fn app(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/config/layout", get(get_layout).put(update_layout))
        .route("/api/config/layout/active", put(set_active_profile))
        .route(
            "/api/config/layout/profiles",
            get(list_profiles).post(create_profile),
        )
        .route(
            "/api/config/layout/profiles/{name}",
            axum::routing::delete(delete_profile),
        )
        .route("/api/config/modules", get(list_modules))
        .route("/api/config/modules/register", post(register_module))
        .route("/api/config/modules/{module_id}", get(get_module))
        .route(
            "/api/config/modules/{module_id}/config/{instance_id}",
            get(get_instance_config).put(update_instance_config),
        )
        .route("/api/config/settings", get(get_settings).put(update_settings))
        .route("/api/config/themes", get(list_themes).post(upsert_theme))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::HeaderName::from_static(API_KEY_HEADER),
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .allow_credentials(false)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!("Unhandled panic while serving request: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": INTERNAL_ERROR_DETAIL })),
    )
        .into_response()
}

// ============================================================================
// Request / Response bodies
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Seconds since the process started
    pub uptime: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateLayoutRequest {
    #[serde(rename = "profileName")]
    pub profile_name: String,
    pub grid: Vec<GridItem>,
    #[serde(rename = "moduleConfigs")]
    pub module_configs: BTreeMap<String, ModuleInstanceConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProfileRequest {
    pub name: String,
    #[serde(rename = "copyFrom", default = "default_copy_from")]
    pub copy_from: String,
}

fn default_copy_from() -> String {
    DEFAULT_PROFILE.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetActiveProfileRequest {
    pub name: String,
}

// ============================================================================
// Infrastructure
// ============================================================================

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let uptime = (state.start_time.elapsed().as_secs_f64() * 100.0).round() / 100.0;
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
        uptime,
    })
}

async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": VERSION,
        "status": "running",
    }))
}

// ============================================================================
// Layout
// ============================================================================

async fn get_layout(State(state): State<Arc<AppState>>) -> Result<Json<LayoutDocument>, ApiError> {
    Ok(Json(state.layout.load().await?))
}

async fn update_layout(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateLayoutRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let profile = LayoutProfile::new(body.grid, body.module_configs);
    state
        .layout
        .upsert_profile_content(&body.profile_name, profile)
        .await?;
    Ok(SuccessResponse::ok())
}

async fn set_active_profile(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetActiveProfileRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.layout.set_active_profile(&body.name).await?;
    Ok(SuccessResponse::ok())
}

async fn list_profiles(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.layout.list_profile_names().await?))
}

async fn create_profile(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<SuccessResponse>), ApiError> {
    state.layout.create_profile(&body.name, &body.copy_from).await?;
    Ok((StatusCode::CREATED, SuccessResponse::ok()))
}

async fn delete_profile(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.layout.delete_profile(&name).await?;
    Ok(SuccessResponse::ok())
}

// ============================================================================
// Modules
// ============================================================================

async fn list_modules(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RegisteredModule>>, ApiError> {
    Ok(Json(state.modules.list().await?))
}

async fn get_module(
    State(state): State<Arc<AppState>>,
    Path(module_id): Path<String>,
) -> Result<Json<RegisteredModule>, ApiError> {
    Ok(Json(state.modules.get(&module_id).await?))
}

async fn register_module(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    Json(module): Json<RegisteredModule>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.modules.register(module).await?;
    Ok(SuccessResponse::ok())
}

async fn get_instance_config(
    State(state): State<Arc<AppState>>,
    Path((module_id, instance_id)): Path<(String, String)>,
) -> Result<Json<ConfigMap>, ApiError> {
    Ok(Json(
        state
            .layout
            .resolve_instance_config(&module_id, &instance_id)
            .await?,
    ))
}

/// The body is the complete replacement config, not a patch.
async fn update_instance_config(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    Path((_module_id, instance_id)): Path<(String, String)>,
    Json(config): Json<ConfigMap>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !state.layout.set_instance_config(&instance_id, config).await? {
        return Err(ServiceError::NotFound(format!(
            "Instance '{}' not found in active layout profile",
            instance_id
        ))
        .into());
    }
    Ok(SuccessResponse::ok())
}

// ============================================================================
// Settings & Themes
// ============================================================================

async fn get_settings(State(state): State<Arc<AppState>>) -> Result<Json<GlobalSettings>, ApiError> {
    Ok(Json(state.settings.get_settings().await?))
}

async fn update_settings(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    Json(settings): Json<GlobalSettings>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.settings.save_settings(&settings).await?;
    Ok(SuccessResponse::ok())
}

async fn list_themes(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Theme>>, ApiError> {
    Ok(Json(state.settings.list_themes().await?))
}

async fn upsert_theme(
    _auth: RequireApiKey,
    State(state): State<Arc<AppState>>,
    Json(theme): Json<Theme>,
) -> Result<(StatusCode, Json<SuccessResponse>), ApiError> {
    state.settings.upsert_theme(&theme).await?;
    Ok((StatusCode::CREATED, SuccessResponse::ok()))
}
