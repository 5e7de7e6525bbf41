// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the OzMirror configuration service CLI

pub mod config;
pub mod migrate;

pub use self::config::ConfigCommand;
pub use self::migrate::MigrateCommand;
