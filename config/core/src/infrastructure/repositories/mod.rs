// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the repository traits defined in
//! `crate::domain::repository`.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve the store's records
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! ## PostgreSQL Repositories
//!
//! - **PostgresLayoutRepository** - Layout document as a JSONB column
//! - **PostgresModuleRepository** - Module registry rows
//! - **PostgresSettingsRepository** / **PostgresThemeRepository** - Settings and themes
//!
//! ## In-Memory Repositories
//!
//! Lightweight implementations for testing and development, defined below.
//! Mutations are applied to a copy and swapped in only on success, so a
//! rejected mutation leaves the stored state untouched.

pub mod postgres_layout;
pub mod postgres_module;
pub mod postgres_settings;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::layout::LayoutDocument;
use crate::domain::module::RegisteredModule;
use crate::domain::repository::{
    LayoutMutation, LayoutRepository, ModuleRepository, RepositoryError, SettingsRepository,
    ThemeRepository,
};
use crate::domain::settings::{GlobalSettings, Theme};

#[derive(Clone, Default)]
pub struct InMemoryLayoutRepository {
    document: Arc<RwLock<Option<LayoutDocument>>>,
}

impl InMemoryLayoutRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn layout_missing() -> RepositoryError {
    RepositoryError::NotFound("layout document".to_string())
}

#[async_trait]
impl LayoutRepository for InMemoryLayoutRepository {
    async fn load(&self) -> Result<LayoutDocument, RepositoryError> {
        self.document.read().clone().ok_or_else(layout_missing)
    }

    async fn save(&self, document: &LayoutDocument) -> Result<(), RepositoryError> {
        let mut slot = self.document.write();
        match slot.as_mut() {
            Some(current) => {
                *current = document.clone();
                Ok(())
            }
            None => Err(layout_missing()),
        }
    }

    async fn update(&self, mutation: LayoutMutation) -> Result<bool, RepositoryError> {
        let mut slot = self.document.write();
        let current = slot.as_mut().ok_or_else(layout_missing)?;

        let mut working = current.clone();
        let changed = mutation(&mut working)?;
        if changed {
            *current = working;
        }
        Ok(changed)
    }

    async fn insert_if_empty(&self, document: &LayoutDocument) -> Result<bool, RepositoryError> {
        let mut slot = self.document.write();
        if slot.is_some() {
            return Ok(false);
        }
        *slot = Some(document.clone());
        Ok(true)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryModuleRepository {
    modules: Arc<RwLock<HashMap<String, RegisteredModule>>>,
}

impl InMemoryModuleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModuleRepository for InMemoryModuleRepository {
    async fn list_all(&self) -> Result<Vec<RegisteredModule>, RepositoryError> {
        Ok(self.modules.read().values().cloned().collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<RegisteredModule>, RepositoryError> {
        Ok(self.modules.read().get(id).cloned())
    }

    async fn save(&self, module: &RegisteredModule) -> Result<(), RepositoryError> {
        self.modules.write().insert(module.id.clone(), module.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemorySettingsRepository {
    settings: Arc<RwLock<Option<GlobalSettings>>>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn load(&self) -> Result<GlobalSettings, RepositoryError> {
        self.settings
            .read()
            .clone()
            .ok_or_else(|| RepositoryError::NotFound("settings".to_string()))
    }

    async fn save(&self, settings: &GlobalSettings) -> Result<(), RepositoryError> {
        let mut slot = self.settings.write();
        match slot.as_mut() {
            Some(current) => {
                *current = settings.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound("settings".to_string())),
        }
    }

    async fn insert_if_empty(&self, settings: &GlobalSettings) -> Result<bool, RepositoryError> {
        let mut slot = self.settings.write();
        if slot.is_some() {
            return Ok(false);
        }
        *slot = Some(settings.clone());
        Ok(true)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryThemeRepository {
    themes: Arc<RwLock<HashMap<String, Theme>>>,
}

impl InMemoryThemeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThemeRepository for InMemoryThemeRepository {
    async fn list_all(&self) -> Result<Vec<Theme>, RepositoryError> {
        let mut themes: Vec<Theme> = self.themes.read().values().cloned().collect();
        themes.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(themes)
    }

    async fn save(&self, theme: &Theme) -> Result<(), RepositoryError> {
        self.themes.write().insert(theme.id.clone(), theme.clone());
        Ok(())
    }

    async fn insert_if_empty(&self, themes: &[Theme]) -> Result<bool, RepositoryError> {
        let mut stored = self.themes.write();
        if !stored.is_empty() {
            return Ok(false);
        }
        for theme in themes {
            stored.insert(theme.id.clone(), theme.clone());
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::bootstrap::default_layout;
    use crate::domain::layout::LayoutError;

    #[tokio::test]
    async fn test_layout_load_before_seed_is_not_found() {
        let repo = InMemoryLayoutRepository::new();
        assert!(matches!(repo.load().await, Err(RepositoryError::NotFound(_))));
        assert!(matches!(
            repo.save(&default_layout()).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_document_intact() {
        let repo = InMemoryLayoutRepository::new();
        repo.insert_if_empty(&default_layout()).await.unwrap();

        let result = repo
            .update(Box::new(|doc| {
                doc.layouts.clear();
                Err(LayoutError::DefaultProfileProtected)
            }))
            .await;
        assert!(matches!(result, Err(RepositoryError::Rejected(_))));
        assert_eq!(repo.load().await.unwrap(), default_layout());

        let changed = repo
            .update(Box::new(|doc| {
                doc.active_profile = "elsewhere".to_string();
                Ok(false)
            }))
            .await
            .unwrap();
        assert!(!changed);
        assert_eq!(repo.load().await.unwrap(), default_layout());
    }
}
