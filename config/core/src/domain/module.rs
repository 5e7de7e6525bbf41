// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Module registry types.
//!
//! A module service announces itself with a [`RegisteredModule`] on every
//! start. The embedded [`ModuleManifest`] supplies the `defaultConfig` used
//! when an instance has no saved configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::layout::ConfigMap;

fn default_status() -> String {
    "online".to_string()
}

/// Grid sizing hints published by a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConstraints {
    #[serde(rename = "minW", default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<i32>,
    #[serde(rename = "minH", default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<i32>,
    #[serde(rename = "maxW", default, skip_serializing_if = "Option::is_none")]
    pub max_w: Option<i32>,
    #[serde(rename = "maxH", default, skip_serializing_if = "Option::is_none")]
    pub max_h: Option<i32>,
    #[serde(rename = "defaultW", default, skip_serializing_if = "Option::is_none")]
    pub default_w: Option<i32>,
    #[serde(rename = "defaultH", default, skip_serializing_if = "Option::is_none")]
    pub default_h: Option<i32>,
}

/// Static module descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleManifest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub version: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Fallback configuration for instances without a saved config
    #[serde(rename = "defaultConfig", default)]
    pub default_config: ConfigMap,
    #[serde(rename = "configSchema", default, skip_serializing_if = "Option::is_none")]
    pub config_schema: Option<serde_json::Map<String, Value>>,
    #[serde(rename = "gridConstraints", default, skip_serializing_if = "Option::is_none")]
    pub grid_constraints: Option<GridConstraints>,
}

/// Registry entry, unique by `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisteredModule {
    pub id: String,
    pub name: String,
    /// Network location of the module's own service
    #[serde(rename = "serviceUrl")]
    pub service_url: String,
    pub manifest: ModuleManifest,
    /// Free-form status reported by the module, e.g. "online"
    #[serde(default = "default_status")]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_registration_gets_defaults() {
        let module: RegisteredModule = serde_json::from_value(json!({
            "id": "clock",
            "name": "Clock",
            "serviceUrl": "http://clock:3001",
            "manifest": {"id": "clock", "name": "Clock", "version": "1.0.0"}
        }))
        .unwrap();

        assert_eq!(module.status, "online");
        assert_eq!(module.manifest.description, "");
        assert!(module.manifest.default_config.is_empty());
        assert!(module.manifest.grid_constraints.is_none());
    }

    #[test]
    fn test_manifest_camel_case_fields() {
        let manifest: ModuleManifest = serde_json::from_value(json!({
            "id": "weather",
            "name": "Weather",
            "version": "2.1.0",
            "defaultConfig": {"units": "metric"},
            "configSchema": {"type": "object"},
            "gridConstraints": {"minW": 2, "defaultH": 3}
        }))
        .unwrap();

        assert_eq!(manifest.default_config["units"], "metric");
        let constraints = manifest.grid_constraints.unwrap();
        assert_eq!(constraints.min_w, Some(2));
        assert_eq!(constraints.default_h, Some(3));
        assert_eq!(constraints.max_w, None);
    }
}
