// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

// Service Configuration Types
//
// Defines the runtime configuration of the configuration store:
// - HTTP bind address and CORS origins
// - Storage backend selection (in-memory or PostgreSQL)
// - Shared-secret API key for write endpoints

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::repository::{PostgresConfig, StorageBackend};

pub const CONFIG_PATH_ENV: &str = "OZMIRROR_CONFIG_PATH";

/// Top-level configuration file (`ozmirror-config.yaml`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    #[default]
    InMemory,
    Postgres,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageKind,

    /// PostgreSQL connection string (required for the postgres backend)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub database_url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageKind::InMemory,
            database_url: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Shared secret for write endpoints (supports "env:VAR_NAME")
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub api_key: Option<String>,
}

impl AuthConfig {
    /// The effective API key, with `env:` indirection resolved.
    ///
    /// Returns `None` when no key is configured or it resolves to an empty
    /// string; write endpoints then refuse every request.
    pub fn resolved_api_key(&self) -> Option<String> {
        let raw = self.api_key.as_deref()?;
        let value = match raw.strip_prefix("env:") {
            Some(var) => std::env::var(var).ok()?,
            None => raw.to_string(),
        };
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

impl ServiceConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Discover configuration file using precedence order
    /// 1. OZMIRROR_CONFIG_PATH environment variable
    /// 2. ./ozmirror-config.yaml (working directory)
    /// 3. ~/.ozmirror/config.yaml (user home)
    /// 4. /etc/ozmirror/config.yaml (system)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./ozmirror-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".ozmirror").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/ozmirror/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // An explicit path must exist and parse.
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        let mut config = if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            Self::from_yaml_file(config_path)?
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("OZMIRROR_DATABASE_URL").filter(|v| !v.is_empty()) {
            tracing::info!("Environment override: OZMIRROR_DATABASE_URL (postgres backend)");
            self.storage.backend = StorageKind::Postgres;
            self.storage.database_url = Some(url);
        }

        if let Some(key) = lookup("OZMIRROR_API_KEY") {
            tracing::info!("Environment override: OZMIRROR_API_KEY");
            self.auth.api_key = Some(key);
        }

        if let Some(raw) = lookup("OZMIRROR_ALLOWED_ORIGINS") {
            let origins: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
            tracing::info!("Environment override: OZMIRROR_ALLOWED_ORIGINS={:?}", origins);
            self.server.allowed_origins = origins;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("server.host cannot be empty");
        }

        for origin in &self.server.allowed_origins {
            if origin.parse::<axum::http::HeaderValue>().is_err() {
                anyhow::bail!("Invalid CORS origin: '{}'", origin);
            }
        }

        if self.storage.backend == StorageKind::Postgres {
            match self.storage.database_url.as_deref() {
                None | Some("") => {
                    anyhow::bail!("storage.database_url is required for the postgres backend")
                }
                Some(_) => {}
            }
            if self.storage.max_connections == 0 {
                anyhow::bail!("storage.max_connections must be at least 1");
            }
        }

        Ok(())
    }

    pub fn storage_backend(&self) -> StorageBackend {
        match self.storage.backend {
            StorageKind::InMemory => StorageBackend::InMemory,
            StorageKind::Postgres => StorageBackend::PostgreSQL(PostgresConfig {
                connection_string: self.storage.database_url.clone().unwrap_or_default(),
                max_connections: self.storage.max_connections,
            }),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost".to_string()]
}

fn default_max_connections() -> u32 {
    5
}
