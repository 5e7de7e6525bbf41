// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Startup Seeding
//!
//! Ensures the settings record, the layout document and the theme collection
//! exist before the service accepts requests.
//!
//! # Idempotency
//!
//! Each record is seeded independently and only when its store is empty
//! (count check followed by insert inside the repository). Running the
//! procedure on every start, or from several processes at once, never
//! produces duplicates or overwrites user data.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::application::error::ServiceResult;
use crate::domain::layout::{
    ConfigMap, GridItem, LayoutDocument, LayoutProfile, ModuleInstanceConfig,
};
use crate::domain::repository::{LayoutRepository, SettingsRepository, ThemeRepository};
use crate::domain::settings::{GlobalSettings, Theme};

/// What a single seeding run inserted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub settings: bool,
    pub layout: bool,
    pub themes: bool,
}

impl SeedReport {
    pub fn seeded_anything(&self) -> bool {
        self.settings || self.layout || self.themes
    }
}

pub struct Bootstrapper {
    settings: Arc<dyn SettingsRepository>,
    layouts: Arc<dyn LayoutRepository>,
    themes: Arc<dyn ThemeRepository>,
}

impl Bootstrapper {
    pub fn new(
        settings: Arc<dyn SettingsRepository>,
        layouts: Arc<dyn LayoutRepository>,
        themes: Arc<dyn ThemeRepository>,
    ) -> Self {
        Self {
            settings,
            layouts,
            themes,
        }
    }

    /// Insert default records into empty stores.
    pub async fn seed_defaults(&self) -> ServiceResult<SeedReport> {
        let mut report = SeedReport::default();

        if self.settings.insert_if_empty(&GlobalSettings::default()).await? {
            info!("Seeded default settings row");
            report.settings = true;
        }

        if self.layouts.insert_if_empty(&default_layout()).await? {
            info!("Seeded default layout document");
            report.layout = true;
        }

        if self.themes.insert_if_empty(&builtin_themes()).await? {
            info!("Seeded built-in themes");
            report.themes = true;
        }

        Ok(report)
    }
}

/// Layout document written on first start: one `default` profile holding a
/// clock instance.
pub fn default_layout() -> LayoutDocument {
    let clock_config: ConfigMap = match json!({
        "format": "HH:mm:ss",
        "timezone": "UTC",
        "showDate": true,
    }) {
        serde_json::Value::Object(map) => map,
        _ => ConfigMap::new(),
    };

    let mut module_configs = BTreeMap::new();
    module_configs.insert(
        "clock_01".to_string(),
        ModuleInstanceConfig::new("clock", clock_config),
    );

    LayoutDocument::with_default_profile(LayoutProfile::new(
        vec![GridItem::new("clock_01", 0, 0, 4, 3)],
        module_configs,
    ))
}

pub fn builtin_themes() -> Vec<Theme> {
    vec![
        Theme::new(
            "dark",
            "Dark",
            [
                ("--color-bg", "#0d0d0d"),
                ("--color-surface", "#1a1a1a"),
                ("--color-accent", "#4fc3f7"),
                ("--color-text", "#e0e0e0"),
                ("--color-text-secondary", "#9e9e9e"),
                ("--color-border", "#2a2a2a"),
                ("--font-base", "'Inter', sans-serif"),
            ],
        ),
        Theme::new(
            "light",
            "Light",
            [
                ("--color-bg", "#f5f5f5"),
                ("--color-surface", "#ffffff"),
                ("--color-accent", "#0288d1"),
                ("--color-text", "#212121"),
                ("--color-text-secondary", "#616161"),
                ("--color-border", "#e0e0e0"),
                ("--font-base", "'Inter', sans-serif"),
            ],
        ),
        Theme::new(
            "amoled",
            "AMOLED",
            [
                ("--color-bg", "#000000"),
                ("--color-surface", "#0a0a0a"),
                ("--color-accent", "#00e5ff"),
                ("--color-text", "#e0e8f0"),
                ("--color-text-secondary", "#78909c"),
                ("--color-border", "#111111"),
                ("--font-base", "'Space Mono', monospace"),
            ],
        ),
    ]
}
