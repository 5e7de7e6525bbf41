// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Router-level tests driving the HTTP API with `oneshot` requests.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use ozmirror_config_core::application::{Bootstrapper, Repositories};
use ozmirror_config_core::domain::layout::LayoutDocument;
use ozmirror_config_core::domain::repository::{
    LayoutMutation, LayoutRepository, RepositoryError,
};
use ozmirror_config_core::presentation::{app, AppState};

const KEY: &str = "test-key";
const DB_FAILURE: &str = "SELECT secret FROM layout_data failed";

/// Layout store whose every call fails with a database error.
struct FailingLayoutRepository;

#[async_trait]
impl LayoutRepository for FailingLayoutRepository {
    async fn load(&self) -> Result<LayoutDocument, RepositoryError> {
        Err(RepositoryError::Database(DB_FAILURE.to_string()))
    }

    async fn save(&self, _document: &LayoutDocument) -> Result<(), RepositoryError> {
        Err(RepositoryError::Database(DB_FAILURE.to_string()))
    }

    async fn update(&self, _mutation: LayoutMutation) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Database(DB_FAILURE.to_string()))
    }

    async fn insert_if_empty(&self, _document: &LayoutDocument) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Database(DB_FAILURE.to_string()))
    }
}

/// Layout store that panics while serving a read.
struct PanickingLayoutRepository;

#[async_trait]
impl LayoutRepository for PanickingLayoutRepository {
    async fn load(&self) -> Result<LayoutDocument, RepositoryError> {
        panic!("layout row decoded with secret=hunter2");
    }

    async fn save(&self, _document: &LayoutDocument) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn update(&self, _mutation: LayoutMutation) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    async fn insert_if_empty(&self, _document: &LayoutDocument) -> Result<bool, RepositoryError> {
        Ok(false)
    }
}

fn app_with_layouts(layouts: Arc<dyn LayoutRepository>) -> Router {
    let repos = Repositories {
        layouts,
        ..Repositories::in_memory()
    };
    let state = Arc::new(AppState::new(&repos, Some(KEY.to_string())));
    app(state, &["http://localhost".to_string()])
}

async fn test_app(api_key: Option<&str>) -> Router {
    let repos = Repositories::in_memory();
    Bootstrapper::new(
        repos.settings.clone(),
        repos.layouts.clone(),
        repos.themes.clone(),
    )
    .seed_defaults()
    .await
    .unwrap();

    let state = Arc::new(AppState::new(&repos, api_key.map(str::to_string)));
    app(state, &["http://localhost".to_string()])
}

fn request(method: Method, uri: &str, key: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header("X-API-Key", key);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn clock_registration(version: &str) -> Value {
    json!({
        "id": "clock",
        "name": "Clock",
        "serviceUrl": "http://clock:3001",
        "manifest": {
            "id": "clock",
            "name": "Clock",
            "version": version,
            "defaultConfig": {"format": "HH:mm"}
        }
    })
}

#[tokio::test]
async fn test_health_and_root() {
    let app = test_app(Some(KEY)).await;

    let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptime"].is_number());

    let (status, body) = send(&app, request(Method::GET, "/", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
}

#[tokio::test]
async fn test_reads_need_no_key() {
    let app = test_app(Some(KEY)).await;

    let (status, body) = send(&app, request(Method::GET, "/api/config/layout", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["activeProfile"], "default");
    assert_eq!(body["layouts"]["default"]["grid"][0]["i"], "clock_01");

    let (status, body) =
        send(&app, request(Method::GET, "/api/config/settings", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cursorTimeout"], 3000);

    let (status, body) = send(&app, request(Method::GET, "/api/config/themes", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_write_without_valid_key_is_challenged() {
    let app = test_app(Some(KEY)).await;
    let body = json!({"name": "night"});

    for key in [None, Some("wrong-key")] {
        let resp = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/config/layout/profiles",
                key,
                Some(body.clone()),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers()[header::WWW_AUTHENTICATE], "ApiKey");
    }

    let (_, profiles) = send(
        &app,
        request(Method::GET, "/api/config/layout/profiles", None, None),
    )
    .await;
    assert_eq!(profiles, json!(["default"]));
}

#[tokio::test]
async fn test_write_without_configured_key_is_server_error() {
    let app = test_app(None).await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/config/modules/register",
            Some("anything"),
            Some(clock_registration("1.0.0")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "Service not configured for authenticated requests");
}

#[tokio::test]
async fn test_profile_lifecycle() {
    let app = test_app(Some(KEY)).await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/config/layout/profiles",
            Some(KEY),
            Some(json!({"name": "night"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"success": true}));

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/config/layout/profiles",
            Some(KEY),
            Some(json!({"name": "night", "copyFrom": "default"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            "/api/config/layout/active",
            Some(KEY),
            Some(json!({"name": "night"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        request(Method::DELETE, "/api/config/layout/profiles/night", Some(KEY), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, layout) = send(&app, request(Method::GET, "/api/config/layout", None, None)).await;
    assert_eq!(layout["activeProfile"], "default");

    let (status, body) = send(
        &app,
        request(Method::DELETE, "/api/config/layout/profiles/default", Some(KEY), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, _) = send(
        &app,
        request(Method::DELETE, "/api/config/layout/profiles/ghost", Some(KEY), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_layout_upserts_profile() {
    let app = test_app(Some(KEY)).await;

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            "/api/config/layout",
            Some(KEY),
            Some(json!({
                "profileName": "kitchen",
                "grid": [{"i": "news_01", "x": 0, "y": 0, "w": 6, "h": 2, "minW": 3}],
                "moduleConfigs": {
                    "news_01": {"moduleId": "news", "config": {"feed": "bbc"}}
                }
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, layout) = send(&app, request(Method::GET, "/api/config/layout", None, None)).await;
    assert_eq!(layout["layouts"]["kitchen"]["grid"][0]["minW"], 3);
    assert_eq!(
        layout["layouts"]["kitchen"]["moduleConfigs"]["news_01"]["config"]["feed"],
        "bbc"
    );
}

#[tokio::test]
async fn test_instance_config_endpoints() {
    let app = test_app(Some(KEY)).await;

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/config/modules/register",
            Some(KEY),
            Some(clock_registration("1.0.0")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/config/modules/clock/config/clock_01", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timezone"], "UTC");

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/config/modules/clock/config/clock_99", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"format": "HH:mm"}));

    let (status, _) = send(
        &app,
        request(Method::GET, "/api/config/modules/weather/config/weather_01", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            "/api/config/modules/clock/config/clock_01",
            Some(KEY),
            Some(json!({"format": "hh:mm a"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        request(Method::GET, "/api/config/modules/clock/config/clock_01", None, None),
    )
    .await;
    assert_eq!(body, json!({"format": "hh:mm a"}));

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            "/api/config/modules/clock/config/clock_99",
            Some(KEY),
            Some(json!({"format": "hh:mm a"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_module_registry_endpoints() {
    let app = test_app(Some(KEY)).await;

    let (status, _) = send(&app, request(Method::GET, "/api/config/modules/clock", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for version in ["1.0.0", "2.0.0"] {
        send(
            &app,
            request(
                Method::POST,
                "/api/config/modules/register",
                Some(KEY),
                Some(clock_registration(version)),
            ),
        )
        .await;
    }

    let (status, body) = send(&app, request(Method::GET, "/api/config/modules/clock", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["manifest"]["version"], "2.0.0");
    assert_eq!(body["status"], "online");

    let (_, list) = send(&app, request(Method::GET, "/api/config/modules", None, None)).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_settings_and_themes_writes() {
    let app = test_app(Some(KEY)).await;

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            "/api/config/settings",
            Some(KEY),
            Some(json!({
                "theme": "light",
                "kiosk": true,
                "cursorTimeout": 5000,
                "fontScale": 1.25,
                "autoStart": true
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, settings) = send(&app, request(Method::GET, "/api/config/settings", None, None)).await;
    assert_eq!(settings["theme"], "light");
    assert_eq!(settings["fontScale"], 1.25);

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/config/themes",
            Some(KEY),
            Some(json!({
                "id": "dark",
                "name": "Midnight",
                "variables": {"--bg-color": "#000010"}
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"success": true}));

    let (_, themes) = send(&app, request(Method::GET, "/api/config/themes", None, None)).await;
    let dark = themes
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == "dark")
        .unwrap();
    assert_eq!(dark["name"], "Midnight");
    assert_eq!(dark["variables"], json!({"--bg-color": "#000010"}));
}

#[tokio::test]
async fn test_partial_settings_body_is_rejected() {
    let app = test_app(Some(KEY)).await;

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            "/api/config/settings",
            Some(KEY),
            Some(json!({"theme": "light"})),
        ),
    )
    .await;
    assert!(status.is_client_error());

    let (_, settings) = send(&app, request(Method::GET, "/api/config/settings", None, None)).await;
    assert_eq!(settings["theme"], "dark");
}

#[tokio::test]
async fn test_storage_failures_do_not_leak_detail() {
    let app = app_with_layouts(Arc::new(FailingLayoutRepository));

    let requests = [
        request(Method::GET, "/api/config/layout", None, None),
        request(Method::GET, "/api/config/layout/profiles", None, None),
        request(
            Method::POST,
            "/api/config/layout/profiles",
            Some(KEY),
            Some(json!({"name": "night"})),
        ),
    ];

    for req in requests {
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"detail": "An internal error occurred"}));
        assert!(!body.to_string().contains("secret"));
    }
}

#[tokio::test]
async fn test_handler_panic_returns_generic_error() {
    let app = app_with_layouts(Arc::new(PanickingLayoutRepository));

    let (status, body) = send(&app, request(Method::GET, "/api/config/layout", None, None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": "An internal error occurred"}));
    assert!(!body.to_string().contains("hunter2"));

    // The service keeps answering after the panic.
    let (status, _) = send(&app, request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
}
