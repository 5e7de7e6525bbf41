// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod bootstrap;
pub mod error;
pub mod layout;
pub mod modules;
pub mod repository_factory;
pub mod settings;

// Re-export services for convenience
pub use bootstrap::{Bootstrapper, SeedReport};
pub use error::{ServiceError, ServiceResult};
pub use layout::LayoutService;
pub use modules::ModuleRegistryService;
pub use repository_factory::{create_repositories, Repositories};
pub use settings::SettingsService;
