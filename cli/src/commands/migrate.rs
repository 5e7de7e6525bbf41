// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Database Migration Command
//!
//! Implements `ozmirror-config migrate`, which applies the embedded schema
//! migrations to the configured PostgreSQL database.
//!
//! # Usage
//!
//! ```bash
//! # Apply all pending migrations
//! ozmirror-config migrate
//!
//! # Preview migrations without applying
//! ozmirror-config migrate --dry-run
//! ```
//!
//! # Environment
//!
//! The database URL comes from `storage.database_url` in the configuration
//! file or from `OZMIRROR_DATABASE_URL`.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::collections::HashSet;
use std::path::PathBuf;

use ozmirror_config_core::domain::service_config::ServiceConfig;
use ozmirror_config_core::infrastructure::db::{Database, MIGRATOR};

#[derive(Args)]
pub struct MigrateCommand {
    /// List pending migrations without applying them
    #[arg(long)]
    dry_run: bool,
}

pub async fn execute(cmd: MigrateCommand, config_path: Option<PathBuf>) -> Result<()> {
    println!("{}", "OzMirror Migrate".bold().green());

    let config =
        ServiceConfig::load_or_default(config_path).context("Failed to load configuration")?;
    let database_url = config
        .storage
        .database_url
        .filter(|url| !url.is_empty())
        .context("No database URL configured. Set storage.database_url or OZMIRROR_DATABASE_URL.")?;

    println!("Connecting to database...");
    let database = Database::new(&database_url, 1)
        .await
        .context("Failed to connect to database")?;

    let applied: HashSet<i64> =
        match sqlx::query_scalar::<_, i64>("SELECT version FROM _sqlx_migrations")
            .fetch_all(database.get_pool())
            .await
        {
            Ok(versions) => versions.into_iter().collect(),
            // The bookkeeping table does not exist before the first run.
            Err(e) if is_undefined_table(&e) => HashSet::new(),
            Err(e) => return Err(e).context("Failed to read applied migrations"),
        };

    let pending: Vec<_> = MIGRATOR
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .collect();

    println!(
        "Migration status: {} applied, {} total available.",
        MIGRATOR.iter().count() - pending.len(),
        MIGRATOR.iter().count()
    );

    if pending.is_empty() {
        println!("{}", "✓ Database is up to date.".green());
        return Ok(());
    }

    if cmd.dry_run {
        println!("Pending migrations (dry run):");
        for migration in &pending {
            println!(" - {} {}", migration.version, migration.description);
        }
        println!("{}", "Skipping application due to --dry-run".yellow());
        return Ok(());
    }

    println!("Applying pending migrations...");
    database
        .migrate()
        .await
        .context("Failed to apply migrations")?;
    println!("{}", "✓ Database updated successfully.".green());

    Ok(())
}

/// PostgreSQL `undefined_table` (SQLSTATE 42P01).
fn is_undefined_table(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNDEFINED_TABLE))
}

const UNDEFINED_TABLE: &str = "42P01";
