// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for each record kept by the configuration store:
//! one repository per aggregate, interface defined in the domain layer,
//! implemented in `crate::infrastructure::repositories`.
//!
//! | Trait | Record | Implementations |
//! |-------|--------|----------------|
//! | `LayoutRepository` | `LayoutDocument` (singleton) | `InMemoryLayoutRepository`, `PostgresLayoutRepository` |
//! | `ModuleRepository` | `RegisteredModule` (by id) | `InMemoryModuleRepository`, `PostgresModuleRepository` |
//! | `SettingsRepository` | `GlobalSettings` (singleton) | `InMemorySettingsRepository`, `PostgresSettingsRepository` |
//! | `ThemeRepository` | `Theme` (by id) | `InMemoryThemeRepository`, `PostgresThemeRepository` |
//!
//! ## Persistence Model
//!
//! Records are always read and written whole. There is no field-level update
//! and no version check: a later write replaces an earlier one
//! (last-writer-wins at record granularity).
//!
//! ## Storage Backend Abstraction
//!
//! Concrete implementations are selected at startup from `StorageBackend`.
//! In-memory implementations are used for development and testing;
//! PostgreSQL implementations for production.

use async_trait::async_trait;

use crate::domain::layout::{LayoutDocument, LayoutError};
use crate::domain::module::RegisteredModule;
use crate::domain::settings::{GlobalSettings, Theme};

/// Storage backend enum for pluggable persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL(PostgresConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub connection_string: String,
    pub max_connections: u32,
}

/// In-memory edit applied to the layout document inside one unit of work.
///
/// Returns `Ok(true)` when the edited document must be written back,
/// `Ok(false)` to leave the stored document untouched, and `Err` to abort.
pub type LayoutMutation = Box<dyn FnOnce(&mut LayoutDocument) -> Result<bool, LayoutError> + Send>;

/// Repository for the singleton layout document
#[async_trait]
pub trait LayoutRepository: Send + Sync {
    /// Load the whole document. `NotFound` when it was never seeded.
    async fn load(&self) -> Result<LayoutDocument, RepositoryError>;

    /// Replace the whole document.
    async fn save(&self, document: &LayoutDocument) -> Result<(), RepositoryError>;

    /// Load, apply `mutation`, and write back within a single transaction.
    ///
    /// Nothing is written when the mutation fails or returns `false`.
    async fn update(&self, mutation: LayoutMutation) -> Result<bool, RepositoryError>;

    /// Store `document` only if no layout document exists yet.
    async fn insert_if_empty(&self, document: &LayoutDocument) -> Result<bool, RepositoryError>;
}

/// Repository for registered modules
#[async_trait]
pub trait ModuleRepository: Send + Sync {
    /// List every registered module (no ordering guarantee)
    async fn list_all(&self) -> Result<Vec<RegisteredModule>, RepositoryError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<RegisteredModule>, RepositoryError>;

    /// Insert or fully replace the module with the same id
    async fn save(&self, module: &RegisteredModule) -> Result<(), RepositoryError>;
}

/// Repository for the singleton settings record
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn load(&self) -> Result<GlobalSettings, RepositoryError>;

    async fn save(&self, settings: &GlobalSettings) -> Result<(), RepositoryError>;

    async fn insert_if_empty(&self, settings: &GlobalSettings) -> Result<bool, RepositoryError>;
}

/// Repository for themes
#[async_trait]
pub trait ThemeRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Theme>, RepositoryError>;

    /// Insert or fully replace the theme with the same id
    async fn save(&self, theme: &Theme) -> Result<(), RepositoryError>;

    /// Store `themes` only if the theme collection is empty.
    async fn insert_if_empty(&self, themes: &[Theme]) -> Result<bool, RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A layout mutation refused to apply; nothing was written.
    #[error(transparent)]
    Rejected(#[from] LayoutError),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
