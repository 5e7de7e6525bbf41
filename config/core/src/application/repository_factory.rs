// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory - Application Layer
//!
//! Creates concrete repository implementations based on storage backend
//! configuration, keeping the domain layer free of infrastructure types.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Select in-memory or PostgreSQL repositories at startup

use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use crate::domain::repository::{
    LayoutRepository, ModuleRepository, SettingsRepository, StorageBackend, ThemeRepository,
};
use crate::infrastructure::db::Database;
use crate::infrastructure::repositories::postgres_layout::PostgresLayoutRepository;
use crate::infrastructure::repositories::postgres_module::PostgresModuleRepository;
use crate::infrastructure::repositories::postgres_settings::{
    PostgresSettingsRepository, PostgresThemeRepository,
};
use crate::infrastructure::repositories::{
    InMemoryLayoutRepository, InMemoryModuleRepository, InMemorySettingsRepository,
    InMemoryThemeRepository,
};

/// One handle per stored record kind
#[derive(Clone)]
pub struct Repositories {
    pub layouts: Arc<dyn LayoutRepository>,
    pub modules: Arc<dyn ModuleRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub themes: Arc<dyn ThemeRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            layouts: Arc::new(InMemoryLayoutRepository::new()),
            modules: Arc::new(InMemoryModuleRepository::new()),
            settings: Arc::new(InMemorySettingsRepository::new()),
            themes: Arc::new(InMemoryThemeRepository::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            layouts: Arc::new(PostgresLayoutRepository::new(pool.clone())),
            modules: Arc::new(PostgresModuleRepository::new(pool.clone())),
            settings: Arc::new(PostgresSettingsRepository::new(pool.clone())),
            themes: Arc::new(PostgresThemeRepository::new(pool)),
        }
    }
}

/// Creates the repositories for the configured backend.
///
/// For PostgreSQL this connects the pool and applies pending migrations
/// before returning, so the schema always exists ahead of seeding.
pub async fn create_repositories(backend: &StorageBackend) -> Result<Repositories> {
    match backend {
        StorageBackend::InMemory => {
            info!("Using in-memory storage backend");
            Ok(Repositories::in_memory())
        }
        StorageBackend::PostgreSQL(config) => {
            let database = Database::new(&config.connection_string, config.max_connections)
                .await
                .context("Failed to connect to PostgreSQL")?;
            database
                .migrate()
                .await
                .context("Failed to apply database migrations")?;
            info!("Using PostgreSQL storage backend");
            Ok(Repositories::postgres(database.get_pool().clone()))
        }
    }
}
