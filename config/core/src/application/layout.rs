// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Layout Use Cases
//!
//! Application service over the layout document: profile management, content
//! updates, and instance-config resolution.
//!
//! # Flow
//!
//! Every mutation is a read-modify-write of the whole document run through
//! [`LayoutRepository::update`]. Domain rules live on
//! [`LayoutDocument`]; this service only wires them to storage and to the
//! module registry.
//!
//! # Instance Config Resolution
//!
//! 1. Active profile missing → `NotFound`
//! 2. Instance has a saved config → that config, verbatim
//! 3. Caller-supplied module id is registered → its manifest `defaultConfig`
//! 4. Otherwise → `NotFound`
//!
//! Step 3 trusts the `module_id` argument, not the `moduleId` stored on the
//! instance.

use std::sync::Arc;
use tracing::{debug, info};

use crate::application::error::{ServiceError, ServiceResult};
use crate::domain::layout::{ConfigMap, LayoutDocument, LayoutError, LayoutProfile};
use crate::domain::repository::{LayoutRepository, ModuleRepository};

pub struct LayoutService {
    layouts: Arc<dyn LayoutRepository>,
    modules: Arc<dyn ModuleRepository>,
}

impl LayoutService {
    pub fn new(layouts: Arc<dyn LayoutRepository>, modules: Arc<dyn ModuleRepository>) -> Self {
        Self { layouts, modules }
    }

    pub async fn load(&self) -> ServiceResult<LayoutDocument> {
        Ok(self.layouts.load().await?)
    }

    /// Replace the stored document (last writer wins).
    pub async fn save(&self, document: &LayoutDocument) -> ServiceResult<()> {
        self.layouts.save(document).await?;
        Ok(())
    }

    pub async fn list_profile_names(&self) -> ServiceResult<Vec<String>> {
        Ok(self.load().await?.profile_names())
    }

    pub async fn create_profile(&self, name: &str, copy_from: &str) -> ServiceResult<()> {
        let (new_name, source) = (name.to_string(), copy_from.to_string());
        self.layouts
            .update(Box::new(move |doc| {
                doc.create_profile(&new_name, &source)?;
                Ok(true)
            }))
            .await?;
        info!("Created layout profile '{}' (copied from '{}')", name, copy_from);
        Ok(())
    }

    pub async fn delete_profile(&self, name: &str) -> ServiceResult<()> {
        // Rejected before touching storage, whatever the document holds.
        if name == crate::domain::layout::DEFAULT_PROFILE {
            return Err(LayoutError::DefaultProfileProtected.into());
        }
        let target = name.to_string();
        self.layouts
            .update(Box::new(move |doc| {
                doc.delete_profile(&target)?;
                Ok(true)
            }))
            .await?;
        info!("Deleted layout profile '{}'", name);
        Ok(())
    }

    pub async fn upsert_profile_content(
        &self,
        name: &str,
        profile: LayoutProfile,
    ) -> ServiceResult<()> {
        let target = name.to_string();
        self.layouts
            .update(Box::new(move |doc| {
                doc.upsert_profile(&target, profile);
                Ok(true)
            }))
            .await?;
        info!("Layout profile '{}' updated", name);
        Ok(())
    }

    pub async fn set_active_profile(&self, name: &str) -> ServiceResult<()> {
        let target = name.to_string();
        self.layouts
            .update(Box::new(move |doc| {
                doc.set_active_profile(&target)?;
                Ok(true)
            }))
            .await?;
        info!("Active layout profile set to '{}'", name);
        Ok(())
    }

    pub async fn resolve_instance_config(
        &self,
        module_id: &str,
        instance_id: &str,
    ) -> ServiceResult<ConfigMap> {
        let document = self.load().await?;
        let profile = document
            .active_profile()
            .ok_or_else(|| LayoutError::ActiveProfileMissing(document.active_profile.clone()))?;

        if let Some(entry) = profile.module_configs.get(instance_id) {
            return Ok(entry.config.clone());
        }

        debug!(
            "No saved config for instance '{}', falling back to manifest of '{}'",
            instance_id, module_id
        );
        match self.modules.find_by_id(module_id).await? {
            Some(module) => Ok(module.manifest.default_config),
            None => Err(ServiceError::NotFound(format!(
                "No config found for instance '{}' of module '{}'",
                instance_id, module_id
            ))),
        }
    }

    /// Replace the config of an existing instance in the active profile.
    ///
    /// Returns `false` (and writes nothing) when the instance has no slot.
    pub async fn set_instance_config(
        &self,
        instance_id: &str,
        config: ConfigMap,
    ) -> ServiceResult<bool> {
        let target = instance_id.to_string();
        let saved = self
            .layouts
            .update(Box::new(move |doc| Ok(doc.set_instance_config(&target, config))))
            .await?;
        if saved {
            info!("Updated instance config: instance='{}'", instance_id);
        }
        Ok(saved)
    }
}
