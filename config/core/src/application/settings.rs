// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Global settings and theme use cases.

use std::sync::Arc;
use tracing::info;

use crate::application::error::ServiceResult;
use crate::domain::repository::{SettingsRepository, ThemeRepository};
use crate::domain::settings::{GlobalSettings, Theme};

pub struct SettingsService {
    settings: Arc<dyn SettingsRepository>,
    themes: Arc<dyn ThemeRepository>,
}

impl SettingsService {
    pub fn new(settings: Arc<dyn SettingsRepository>, themes: Arc<dyn ThemeRepository>) -> Self {
        Self { settings, themes }
    }

    pub async fn get_settings(&self) -> ServiceResult<GlobalSettings> {
        Ok(self.settings.load().await?)
    }

    pub async fn save_settings(&self, settings: &GlobalSettings) -> ServiceResult<()> {
        self.settings.save(settings).await?;
        info!(
            "Global settings updated: theme='{}' kiosk={}",
            settings.theme, settings.kiosk
        );
        Ok(())
    }

    pub async fn list_themes(&self) -> ServiceResult<Vec<Theme>> {
        Ok(self.themes.list_all().await?)
    }

    /// Add a theme or fully replace the one with the same id. Built-in
    /// themes are not protected.
    pub async fn upsert_theme(&self, theme: &Theme) -> ServiceResult<()> {
        self.themes.save(theme).await?;
        info!("Theme upserted: id='{}'", theme.id);
        Ok(())
    }
}
