//! Typed records for the OBR repository JSON payload.
//!
//! The payload is the `status`/`repositories`/`resources` document served by
//! the bundle repository console endpoint. Mandatory fields are rejected at
//! deserialization time instead of surfacing later as missing values.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Deserialize)]
pub struct RepositoryPayload {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub repositories: Vec<Repository>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Deserialize)]
pub struct Repository {
    pub name: String,
    pub url: String,
    #[serde(rename = "lastModified", default)]
    pub last_modified: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "presentationname", default)]
    pub presentation_name: Option<String>,
    #[serde(rename = "symbolicname")]
    pub symbolic_name: String,
    pub version: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

impl Resource {
    /// Presentation name when the repository provides one, symbolic name
    /// otherwise.
    pub fn display_name(&self) -> &str {
        self.presentation_name
            .as_deref()
            .unwrap_or(&self.symbolic_name)
    }
}

#[derive(Debug, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub filter: String,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Deserialize)]
pub struct Capability {
    pub name: String,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl RepositoryPayload {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Payload: failed to read {:?}", path))?;
        let payload: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Payload: invalid repository JSON in {:?}", path))?;
        Ok(payload)
    }
}

/// Format a `lastModified` epoch-millisecond stamp as RFC 3339.
pub fn format_last_modified(millis: i64) -> Option<String> {
    let nanos = i128::from(millis) * 1_000_000;
    let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?;
    dt.format(&Rfc3339).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_payload() {
        let payload: RepositoryPayload = serde_json::from_str(
            r#"{
                "status": true,
                "repositories": [
                    {"name": "Releases", "url": "https://example.org/repo.xml", "lastModified": 1214830800000}
                ],
                "resources": [
                    {
                        "id": "org.foo/1.0.0",
                        "presentationname": "Foo Service",
                        "symbolicname": "org.foo",
                        "version": "1.0.0",
                        "requirements": [
                            {"name": "package", "filter": "(package=org.osgi.framework)", "optional": false}
                        ],
                        "capabilities": [
                            {"name": "package", "properties": {"package": "org.foo", "version": "1.0.0"}}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        assert!(payload.status);
        assert_eq!(payload.repositories.len(), 1);
        assert_eq!(payload.repositories[0].last_modified, Some(1214830800000));
        let resource = &payload.resources[0];
        assert_eq!(resource.display_name(), "Foo Service");
        assert_eq!(resource.requirements[0].name, "package");
        assert!(!resource.requirements[0].optional);
        assert_eq!(
            resource.capabilities[0].properties.get("version"),
            Some(&"1.0.0".to_string())
        );
    }

    #[test]
    fn test_display_name_falls_back_to_symbolic_name() {
        let resource: Resource = serde_json::from_str(
            r#"{"symbolicname": "org.foo", "version": "1.0.0"}"#,
        )
        .unwrap();
        assert_eq!(resource.display_name(), "org.foo");
    }

    #[test]
    fn test_missing_mandatory_field_is_rejected() {
        let result: Result<Resource, _> =
            serde_json::from_str(r#"{"presentationname": "Foo", "version": "1.0.0"}"#);
        assert!(result.is_err());

        let result: Result<Requirement, _> = serde_json::from_str(r#"{"name": "package"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let resource: Result<Resource, _> = serde_json::from_str(
            r#"{"symbolicname": "org.foo", "version": "1.0.0", "size": 12345}"#,
        );
        assert!(resource.is_ok());
    }

    #[test]
    fn test_format_last_modified() {
        assert_eq!(
            format_last_modified(0).as_deref(),
            Some("1970-01-01T00:00:00Z")
        );
        assert_eq!(
            format_last_modified(1214830800000).as_deref(),
            Some("2008-06-30T13:00:00Z")
        );
    }
}
