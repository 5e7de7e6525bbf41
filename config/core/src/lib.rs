// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0
//! OzMirror Configuration Store
//!
//! Persists the dashboard layout document, the module registry, global
//! settings and themes, and serves them over a small REST API.
//!
//! # Architecture
//!
//! - **domain:** value types, invariants and repository traits
//! - **application:** use-case services, seeding, repository selection
//! - **infrastructure:** in-memory and PostgreSQL repositories
//! - **presentation:** axum router, API-key guard, error mapping

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
