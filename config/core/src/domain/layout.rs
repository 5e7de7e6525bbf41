// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

//! # Layout Aggregate
//!
//! The layout document is the singleton aggregate holding every named profile
//! and the pointer to the active one. Each profile is a grid of placed module
//! instances plus the per-instance configuration keyed by instance id.
//!
//! Grid items and instance configs are two independent collections. A profile
//! may carry grid items without configs and configs without grid items; every
//! operation here tolerates both.
//!
//! All operations in this module are pure. Persistence happens through
//! [`crate::domain::repository::LayoutRepository`], which always stores the
//! whole document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

/// Name of the profile that always exists and can never be deleted.
pub const DEFAULT_PROFILE: &str = "default";

const MAX_PROFILE_NAME_LEN: usize = 100;

static PROFILE_NAME_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[a-zA-Z0-9_-]+$").expect("profile name pattern is valid"));

/// Opaque per-instance configuration (string key → arbitrary JSON value).
pub type ConfigMap = serde_json::Map<String, Value>;

/// A single placed item in a profile's grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridItem {
    /// Instance id; expected to match a key in `moduleConfigs`.
    pub i: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    #[serde(rename = "minW", default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<i32>,
    #[serde(rename = "minH", default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<i32>,
    #[serde(rename = "maxW", default, skip_serializing_if = "Option::is_none")]
    pub max_w: Option<i32>,
    #[serde(rename = "maxH", default, skip_serializing_if = "Option::is_none")]
    pub max_h: Option<i32>,
}

impl GridItem {
    pub fn new(i: impl Into<String>, x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            i: i.into(),
            x,
            y,
            w,
            h,
            min_w: None,
            min_h: None,
            max_w: None,
            max_h: None,
        }
    }
}

/// Configuration stored for one module instance inside a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleInstanceConfig {
    /// Registry id of the module. Not checked against the registry.
    #[serde(rename = "moduleId")]
    pub module_id: String,
    #[serde(default)]
    pub config: ConfigMap,
}

impl ModuleInstanceConfig {
    pub fn new(module_id: impl Into<String>, config: ConfigMap) -> Self {
        Self {
            module_id: module_id.into(),
            config,
        }
    }
}

/// One named arrangement of grid items and instance configs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutProfile {
    pub grid: Vec<GridItem>,
    #[serde(rename = "moduleConfigs")]
    pub module_configs: BTreeMap<String, ModuleInstanceConfig>,
}

impl LayoutProfile {
    pub fn new(grid: Vec<GridItem>, module_configs: BTreeMap<String, ModuleInstanceConfig>) -> Self {
        Self {
            grid,
            module_configs,
        }
    }
}

/// Root layout document (singleton).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutDocument {
    #[serde(rename = "activeProfile", default = "default_profile_name")]
    pub active_profile: String,
    pub layouts: BTreeMap<String, LayoutProfile>,
}

fn default_profile_name() -> String {
    DEFAULT_PROFILE.to_string()
}

impl LayoutDocument {
    /// A document with only the given `default` profile, active.
    pub fn with_default_profile(profile: LayoutProfile) -> Self {
        let mut layouts = BTreeMap::new();
        layouts.insert(DEFAULT_PROFILE.to_string(), profile);
        Self {
            active_profile: DEFAULT_PROFILE.to_string(),
            layouts,
        }
    }

    pub fn profile_names(&self) -> Vec<String> {
        self.layouts.keys().cloned().collect()
    }

    pub fn has_profile(&self, name: &str) -> bool {
        self.layouts.contains_key(name)
    }

    pub fn profile(&self, name: &str) -> Option<&LayoutProfile> {
        self.layouts.get(name)
    }

    /// The profile named by `activeProfile`, if it is present.
    pub fn active_profile(&self) -> Option<&LayoutProfile> {
        self.layouts.get(&self.active_profile)
    }

    fn active_profile_mut(&mut self) -> Option<&mut LayoutProfile> {
        self.layouts.get_mut(&self.active_profile)
    }

    /// Clone `copy_from` under `name`. The active pointer is left untouched.
    pub fn create_profile(&mut self, name: &str, copy_from: &str) -> Result<(), LayoutError> {
        if self.has_profile(name) {
            return Err(LayoutError::ProfileExists(name.to_string()));
        }
        let source = self
            .layouts
            .get(copy_from)
            .cloned()
            .ok_or_else(|| LayoutError::ProfileNotFound(copy_from.to_string()))?;
        self.layouts.insert(name.to_string(), source);
        Ok(())
    }

    /// Remove a profile. Deleting the active profile re-activates `default`.
    pub fn delete_profile(&mut self, name: &str) -> Result<(), LayoutError> {
        if name == DEFAULT_PROFILE {
            return Err(LayoutError::DefaultProfileProtected);
        }
        if self.layouts.remove(name).is_none() {
            return Err(LayoutError::ProfileNotFound(name.to_string()));
        }
        if self.active_profile == name {
            self.active_profile = DEFAULT_PROFILE.to_string();
        }
        Ok(())
    }

    /// Replace (or create) a profile's grid and configs wholesale.
    ///
    /// No cross-checking between `grid` and `module_configs` happens here;
    /// orphaned entries on either side are stored as given.
    pub fn upsert_profile(&mut self, name: &str, profile: LayoutProfile) {
        self.layouts.insert(name.to_string(), profile);
    }

    pub fn set_active_profile(&mut self, name: &str) -> Result<(), LayoutError> {
        validate_profile_name(name)?;
        if !self.has_profile(name) {
            return Err(LayoutError::ProfileNotFound(name.to_string()));
        }
        self.active_profile = name.to_string();
        Ok(())
    }

    /// Explicitly saved config for an instance of the active profile.
    pub fn instance_config(&self, instance_id: &str) -> Option<&ConfigMap> {
        self.active_profile()
            .and_then(|profile| profile.module_configs.get(instance_id))
            .map(|entry| &entry.config)
    }

    /// Replace the `config` of an existing instance slot in the active profile.
    ///
    /// Returns `false` without touching the document when the active profile
    /// is missing or has no slot for `instance_id`. Slots are never created.
    pub fn set_instance_config(&mut self, instance_id: &str, config: ConfigMap) -> bool {
        match self
            .active_profile_mut()
            .and_then(|profile| profile.module_configs.get_mut(instance_id))
        {
            Some(entry) => {
                entry.config = config;
                true
            }
            None => false,
        }
    }
}

/// Validate a profile name used as the active pointer.
pub fn validate_profile_name(name: &str) -> Result<(), LayoutError> {
    if name.is_empty() || name.len() > MAX_PROFILE_NAME_LEN || !PROFILE_NAME_PATTERN.is_match(name) {
        return Err(LayoutError::InvalidProfileName(name.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("Profile '{0}' already exists")]
    ProfileExists(String),

    #[error("Profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("The 'default' profile cannot be deleted")]
    DefaultProfileProtected,

    #[error("Invalid profile name: '{0}'")]
    InvalidProfileName(String),

    #[error("Active profile '{0}' is missing from the layout document")]
    ActiveProfileMissing(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: serde_json::Value) -> ConfigMap {
        value.as_object().cloned().unwrap()
    }

    fn sample_document() -> LayoutDocument {
        let mut configs = BTreeMap::new();
        configs.insert(
            "clock_01".to_string(),
            ModuleInstanceConfig::new("clock", config(json!({"showDate": true}))),
        );
        LayoutDocument::with_default_profile(LayoutProfile::new(
            vec![GridItem::new("clock_01", 0, 0, 4, 3)],
            configs,
        ))
    }

    #[test]
    fn test_create_then_delete_restores_profile_set() {
        let mut doc = sample_document();
        let before = doc.profile_names();

        doc.create_profile("night", DEFAULT_PROFILE).unwrap();
        assert_eq!(doc.profile("night"), doc.profile(DEFAULT_PROFILE));
        assert_eq!(doc.active_profile, DEFAULT_PROFILE);

        doc.delete_profile("night").unwrap();
        assert_eq!(doc.profile_names(), before);
    }

    #[test]
    fn test_create_profile_is_a_deep_copy() {
        let mut doc = sample_document();
        doc.create_profile("night", DEFAULT_PROFILE).unwrap();

        doc.layouts.get_mut("night").unwrap().grid.clear();
        assert_eq!(doc.profile(DEFAULT_PROFILE).unwrap().grid.len(), 1);
    }

    #[test]
    fn test_create_profile_conflict_checked_before_source() {
        let mut doc = sample_document();
        assert_eq!(
            doc.create_profile(DEFAULT_PROFILE, "nope"),
            Err(LayoutError::ProfileExists(DEFAULT_PROFILE.to_string()))
        );
        assert_eq!(
            doc.create_profile("x", "nope"),
            Err(LayoutError::ProfileNotFound("nope".to_string()))
        );
        assert!(!doc.has_profile("x"));
    }

    #[test]
    fn test_delete_active_profile_resets_to_default() {
        let mut doc = sample_document();
        doc.create_profile("night", DEFAULT_PROFILE).unwrap();
        doc.set_active_profile("night").unwrap();

        doc.delete_profile("night").unwrap();
        assert_eq!(doc.active_profile, DEFAULT_PROFILE);
    }

    #[test]
    fn test_delete_default_always_rejected() {
        let mut doc = sample_document();
        assert_eq!(doc.delete_profile(DEFAULT_PROFILE), Err(LayoutError::DefaultProfileProtected));

        // Even when the document somehow lacks the default profile.
        doc.layouts.clear();
        assert_eq!(doc.delete_profile(DEFAULT_PROFILE), Err(LayoutError::DefaultProfileProtected));
    }

    #[test]
    fn test_delete_missing_profile() {
        let mut doc = sample_document();
        assert_eq!(
            doc.delete_profile("ghost"),
            Err(LayoutError::ProfileNotFound("ghost".to_string()))
        );
    }

    #[test]
    fn test_upsert_accepts_orphans() {
        let mut doc = sample_document();
        let mut configs = BTreeMap::new();
        configs.insert(
            "weather_01".to_string(),
            ModuleInstanceConfig::new("weather", ConfigMap::new()),
        );
        let profile = LayoutProfile::new(vec![GridItem::new("calendar_01", 4, 0, 2, 2)], configs);

        doc.upsert_profile("kitchen", profile.clone());
        assert_eq!(doc.profile("kitchen"), Some(&profile));
    }

    #[test]
    fn test_set_active_profile_validation() {
        let mut doc = sample_document();
        assert_eq!(
            doc.set_active_profile("bad name!"),
            Err(LayoutError::InvalidProfileName("bad name!".to_string()))
        );
        assert_eq!(
            doc.set_active_profile("missing"),
            Err(LayoutError::ProfileNotFound("missing".to_string()))
        );
        assert_eq!(doc.active_profile, DEFAULT_PROFILE);
    }

    #[test]
    fn test_set_instance_config_only_updates_existing_slots() {
        let mut doc = sample_document();
        let original = doc.clone();

        assert!(!doc.set_instance_config("missing_id", config(json!({"a": 1}))));
        assert_eq!(doc, original);

        assert!(doc.set_instance_config("clock_01", config(json!({"format": "HH:mm"}))));
        assert_eq!(
            doc.instance_config("clock_01"),
            Some(&config(json!({"format": "HH:mm"})))
        );
        assert_eq!(
            doc.profile(DEFAULT_PROFILE).unwrap().module_configs["clock_01"].module_id,
            "clock"
        );
    }

    #[test]
    fn test_json_shape() {
        let doc = sample_document();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["activeProfile"], "default");
        assert_eq!(value["layouts"]["default"]["grid"][0]["i"], "clock_01");
        assert!(value["layouts"]["default"]["grid"][0].get("minW").is_none());
        assert_eq!(
            value["layouts"]["default"]["moduleConfigs"]["clock_01"]["moduleId"],
            "clock"
        );

        let parsed: LayoutDocument = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<GridItem, _> =
            serde_json::from_value(json!({"i": "a", "x": 0, "y": 0, "w": 1, "h": 1, "z": 3}));
        assert!(result.is_err());
    }
}
