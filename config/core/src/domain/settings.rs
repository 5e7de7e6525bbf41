// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Global settings and visual themes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Application-wide settings (singleton). Every field is required on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalSettings {
    /// Id of the selected theme
    pub theme: String,
    pub kiosk: bool,
    /// Cursor idle timeout in milliseconds
    #[serde(rename = "cursorTimeout")]
    pub cursor_timeout: i32,
    #[serde(rename = "fontScale")]
    pub font_scale: f64,
    #[serde(rename = "autoStart")]
    pub auto_start: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            kiosk: false,
            cursor_timeout: 3000,
            font_scale: 1.0,
            auto_start: false,
        }
    }
}

/// A named set of style variables, unique by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Theme {
    pub id: String,
    pub name: String,
    /// Style-variable name → value, e.g. `--color-bg` → `#0d0d0d`
    pub variables: BTreeMap<String, String>,
}

impl Theme {
    pub fn new<I, K, V>(id: impl Into<String>, name: impl Into<String>, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            variables: variables
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
