// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Layout Repository
//!
//! `LayoutRepository` backed by the single-row `layout_data` table (id = 1).
//! The active profile name lives in its own column and every profile is
//! stored together in the `profiles` JSONB column.
//!
//! Updates read the row and write it back inside one transaction without
//! row locking, so two concurrent edits resolve as last-writer-wins. A
//! transaction dropped before commit rolls back.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, Row, Transaction};
use std::collections::BTreeMap;

use crate::domain::layout::{LayoutDocument, LayoutProfile};
use crate::domain::repository::{LayoutMutation, LayoutRepository, RepositoryError};

const LAYOUT_ROW_ID: i32 = 1;

pub struct PostgresLayoutRepository {
    pool: PgPool,
}

impl PostgresLayoutRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn document_from_row(row: &PgRow) -> Result<LayoutDocument, RepositoryError> {
        let active_profile: String = row.try_get("active_profile")?;
        let profiles: serde_json::Value = row.try_get("profiles")?;
        let layouts: BTreeMap<String, LayoutProfile> = serde_json::from_value(profiles)
            .map_err(|e| {
                RepositoryError::Serialization(format!("Failed to deserialize profiles: {}", e))
            })?;
        Ok(LayoutDocument {
            active_profile,
            layouts,
        })
    }

    async fn write_document(
        tx: &mut Transaction<'_, Postgres>,
        document: &LayoutDocument,
    ) -> Result<(), RepositoryError> {
        let profiles = serde_json::to_value(&document.layouts)?;
        let result = sqlx::query(
            r#"
            UPDATE layout_data
            SET active_profile = $2, profiles = $3
            WHERE id = $1
            "#,
        )
        .bind(LAYOUT_ROW_ID)
        .bind(&document.active_profile)
        .bind(profiles)
        .execute(&mut **tx)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to save layout: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("layout document".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LayoutRepository for PostgresLayoutRepository {
    async fn load(&self) -> Result<LayoutDocument, RepositoryError> {
        let row = sqlx::query("SELECT active_profile, profiles FROM layout_data WHERE id = $1")
            .bind(LAYOUT_ROW_ID)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or_else(|| RepositoryError::NotFound("layout document".to_string()))?;

        Self::document_from_row(&row)
    }

    async fn save(&self, document: &LayoutDocument) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        Self::write_document(&mut tx, document).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, mutation: LayoutMutation) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT active_profile, profiles FROM layout_data WHERE id = $1")
            .bind(LAYOUT_ROW_ID)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or_else(|| RepositoryError::NotFound("layout document".to_string()))?;

        let mut document = Self::document_from_row(&row)?;
        if !mutation(&mut document)? {
            tx.rollback().await?;
            return Ok(false);
        }

        Self::write_document(&mut tx, &document).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn insert_if_empty(&self, document: &LayoutDocument) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM layout_data")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let profiles = serde_json::to_value(&document.layouts)?;
        let result = sqlx::query(
            r#"
            INSERT INTO layout_data (id, active_profile, profiles)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(LAYOUT_ROW_ID)
        .bind(&document.active_profile)
        .bind(profiles)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to seed layout: {}", e)))?;

        tx.commit().await?;
        Ok(result.rows_affected() == 1)
    }
}
