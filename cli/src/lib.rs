// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0
//! OzMirror configuration service CLI library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Subcommand handlers and the HTTP server lifecycle

pub mod commands;
pub mod logging;
pub mod server;
