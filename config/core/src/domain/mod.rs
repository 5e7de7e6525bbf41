// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Domain Layer
//!
//! Aggregates, value objects and persistence contracts of the configuration
//! store. Nothing in here performs I/O.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Layout document, module registry, settings and theme models

pub mod layout;
pub mod module;
pub mod repository;
pub mod service_config;
pub mod settings;
