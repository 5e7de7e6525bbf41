// Copyright (c) 2026 OzMirror Contributors
// SPDX-License-Identifier: AGPL-3.0

use std::io::Write;

use ozmirror_config_core::domain::service_config::{ServiceConfig, StorageKind};

#[test]
fn test_minimal_template_is_valid() {
    let config =
        ServiceConfig::from_yaml_str(include_str!("../templates/config-minimal.yaml")).unwrap();
    assert_eq!(config.storage.backend, StorageKind::InMemory);
    assert_eq!(config.auth.api_key.as_deref(), Some("env:OZMIRROR_API_KEY"));
    config.validate().unwrap();
}

#[test]
fn test_examples_template_is_valid() {
    let config =
        ServiceConfig::from_yaml_str(include_str!("../templates/config-with-examples.yaml"))
            .unwrap();
    assert_eq!(config.storage.backend, StorageKind::Postgres);
    assert_eq!(config.server.allowed_origins.len(), 2);
    config.validate().unwrap();
}

#[test]
fn test_template_loads_from_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(include_bytes!("../templates/config-minimal.yaml"))
        .unwrap();

    let config = ServiceConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.server.port, 8000);
}
