// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Settings & Theme Repositories
//!
//! `settings` is a single-row table (id = 1) with one column per field.
//! `themes` holds one row per theme with its variables as JSONB.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;
use std::collections::BTreeMap;

use crate::domain::repository::{RepositoryError, SettingsRepository, ThemeRepository};
use crate::domain::settings::{GlobalSettings, Theme};

const SETTINGS_ROW_ID: i32 = 1;

pub struct PostgresSettingsRepository {
    pool: PgPool,
}

impl PostgresSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for PostgresSettingsRepository {
    async fn load(&self) -> Result<GlobalSettings, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT theme, kiosk, cursor_timeout, font_scale, auto_start
            FROM settings
            WHERE id = $1
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or_else(|| RepositoryError::NotFound("settings".to_string()))?;

        Ok(GlobalSettings {
            theme: row.try_get("theme")?,
            kiosk: row.try_get("kiosk")?,
            cursor_timeout: row.try_get("cursor_timeout")?,
            font_scale: row.try_get("font_scale")?,
            auto_start: row.try_get("auto_start")?,
        })
    }

    async fn save(&self, settings: &GlobalSettings) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE settings
            SET theme = $2, kiosk = $3, cursor_timeout = $4, font_scale = $5, auto_start = $6
            WHERE id = $1
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(&settings.theme)
        .bind(settings.kiosk)
        .bind(settings.cursor_timeout)
        .bind(settings.font_scale)
        .bind(settings.auto_start)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to save settings: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("settings".to_string()));
        }
        Ok(())
    }

    async fn insert_if_empty(&self, settings: &GlobalSettings) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM settings")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO settings (id, theme, kiosk, cursor_timeout, font_scale, auto_start)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(&settings.theme)
        .bind(settings.kiosk)
        .bind(settings.cursor_timeout)
        .bind(settings.font_scale)
        .bind(settings.auto_start)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to seed settings: {}", e)))?;

        tx.commit().await?;
        Ok(result.rows_affected() == 1)
    }
}

pub struct PostgresThemeRepository {
    pool: PgPool,
}

impl PostgresThemeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThemeRepository for PostgresThemeRepository {
    async fn list_all(&self) -> Result<Vec<Theme>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name, variables FROM themes ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let mut themes = Vec::with_capacity(rows.len());
        for row in rows {
            let variables_val: serde_json::Value = row.try_get("variables")?;
            let variables: BTreeMap<String, String> = serde_json::from_value(variables_val)?;
            themes.push(Theme {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                variables,
            });
        }
        Ok(themes)
    }

    async fn save(&self, theme: &Theme) -> Result<(), RepositoryError> {
        let variables = serde_json::to_value(&theme.variables)?;

        sqlx::query(
            r#"
            INSERT INTO themes (id, name, variables)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                variables = EXCLUDED.variables
            "#,
        )
        .bind(&theme.id)
        .bind(&theme.name)
        .bind(variables)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to save theme: {}", e)))?;

        Ok(())
    }

    async fn insert_if_empty(&self, themes: &[Theme]) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM themes")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        for theme in themes {
            let variables = serde_json::to_value(&theme.variables)?;
            sqlx::query(
                r#"
                INSERT INTO themes (id, name, variables)
                VALUES ($1, $2, $3)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(&theme.id)
            .bind(&theme.name)
            .bind(variables)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to seed theme: {}", e)))?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
