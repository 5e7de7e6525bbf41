// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Module registry use cases.
//!
//! Modules re-announce themselves on every restart; registration is a full
//! replace by id, never a merge. There is no unregister operation.

use std::sync::Arc;
use tracing::info;

use crate::application::error::{ServiceError, ServiceResult};
use crate::domain::module::RegisteredModule;
use crate::domain::repository::ModuleRepository;

pub struct ModuleRegistryService {
    repository: Arc<dyn ModuleRepository>,
}

impl ModuleRegistryService {
    pub fn new(repository: Arc<dyn ModuleRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> ServiceResult<Vec<RegisteredModule>> {
        Ok(self.repository.list_all().await?)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<RegisteredModule> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Module '{}' not found", id)))
    }

    pub async fn register(&self, module: RegisteredModule) -> ServiceResult<()> {
        self.repository.save(&module).await?;
        info!(
            "Module '{}' registered from {} (version {})",
            module.id, module.service_url, module.manifest.version
        );
        Ok(())
    }
}
