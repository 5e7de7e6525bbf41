// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Module Repository
//!
//! `ModuleRepository` backed by the `modules` table. The manifest is stored
//! as JSONB; registration is an upsert that overwrites every column.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::module::{ModuleManifest, RegisteredModule};
use crate::domain::repository::{ModuleRepository, RepositoryError};

pub struct PostgresModuleRepository {
    pool: PgPool,
}

impl PostgresModuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn module_from_row(row: &PgRow) -> Result<RegisteredModule, RepositoryError> {
        let manifest_val: serde_json::Value = row.try_get("manifest")?;
        let manifest: ModuleManifest = serde_json::from_value(manifest_val).map_err(|e| {
            RepositoryError::Serialization(format!("Failed to deserialize manifest: {}", e))
        })?;

        Ok(RegisteredModule {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            service_url: row.try_get("service_url")?,
            manifest,
            status: row.try_get("status")?,
        })
    }
}

#[async_trait]
impl ModuleRepository for PostgresModuleRepository {
    async fn list_all(&self) -> Result<Vec<RegisteredModule>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, service_url, manifest, status
            FROM modules
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(Self::module_from_row).collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<RegisteredModule>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, service_url, manifest, status
            FROM modules
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row.as_ref().map(Self::module_from_row).transpose()
    }

    async fn save(&self, module: &RegisteredModule) -> Result<(), RepositoryError> {
        let manifest_json = serde_json::to_value(&module.manifest)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO modules (id, name, service_url, manifest, status)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                service_url = EXCLUDED.service_url,
                manifest = EXCLUDED.manifest,
                status = EXCLUDED.status
            "#,
        )
        .bind(&module.id)
        .bind(&module.name)
        .bind(&module.service_url)
        .bind(manifest_json)
        .bind(&module.status)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to save module: {}", e)))?;

        Ok(())
    }
}
