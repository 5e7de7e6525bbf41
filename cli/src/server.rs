// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

//! HTTP server lifecycle: load config, open storage, seed, serve.
//!
//! Seeding runs to completion before the listener is bound, so no request
//! ever observes an unseeded store.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use ozmirror_config_core::application::{create_repositories, Bootstrapper};
use ozmirror_config_core::domain::service_config::ServiceConfig;
use ozmirror_config_core::presentation::{app, AppState};

/// Bind address overrides taken from the command line
#[derive(Debug, Clone, Default)]
pub struct ServeOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ServeOverrides {
    pub fn apply(self, config: &mut ServiceConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

pub async fn start_server(config_path: Option<PathBuf>, overrides: ServeOverrides) -> Result<()> {
    let mut config =
        ServiceConfig::load_or_default(config_path).context("Failed to load configuration")?;
    overrides.apply(&mut config);
    config.validate().context("Configuration validation failed")?;

    let api_key = config.auth.resolved_api_key();
    if api_key.is_none() {
        warn!("No API key configured; all write endpoints will return 500");
    }

    let repositories = create_repositories(&config.storage_backend())
        .await
        .context("Failed to initialize storage")?;

    let report = Bootstrapper::new(
        repositories.settings.clone(),
        repositories.layouts.clone(),
        repositories.themes.clone(),
    )
    .seed_defaults()
    .await
    .context("Failed to seed default data")?;
    if !report.seeded_anything() {
        info!("Existing data found, skipping seeding");
    }

    let state = Arc::new(AppState::new(&repositories, api_key));
    let router = app(state, &config.server.allowed_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Configuration service listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Configuration service shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let mut config = ServiceConfig::default();
        ServeOverrides {
            host: None,
            port: Some(9100),
        }
        .apply(&mut config);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9100);
    }
}
