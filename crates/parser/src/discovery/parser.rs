//! Discovery document parser

use super::types::{DiscoveryDoc, ResourceTree};
use discovery_client_common::{ClientError, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Discovery Document parser
///
/// Reads and parses discovery documents from files, strings or already
/// decoded JSON values.
pub struct DiscoveryParser {
    /// Loaded Discovery document
    doc: DiscoveryDoc,
}

impl DiscoveryParser {
    /// Load Discovery document from file path
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = DiscoveryParser::from_file("fleet-v1.json")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ClientError::Parse(format!(
                "Failed to read Discovery file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_json(&content)
    }

    /// Parse Discovery document from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: DiscoveryDoc = serde_json::from_str(json)
            .map_err(|e| ClientError::Parse(format!("Failed to parse Discovery JSON: {}", e)))?;

        Ok(Self::from_doc(doc))
    }

    /// Parse Discovery document from raw bytes, e.g. an HTTP response body
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let doc: DiscoveryDoc = serde_json::from_slice(bytes)
            .map_err(|e| ClientError::Parse(format!("Failed to parse Discovery JSON: {}", e)))?;

        Ok(Self::from_doc(doc))
    }

    fn from_doc(doc: DiscoveryDoc) -> Self {
        debug!(
            name = doc.name.as_deref().unwrap_or("<unnamed>"),
            service_path = %doc.service_path,
            resources = doc.resource_count(),
            methods = doc.method_count(),
            "Loaded discovery document"
        );
        Self { doc }
    }

    /// Get reference to the underlying Discovery document
    pub fn doc(&self) -> &DiscoveryDoc {
        &self.doc
    }

    /// Take ownership of the underlying Discovery document
    pub fn into_doc(self) -> DiscoveryDoc {
        self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_discovery() {
        let discovery_json = r##"{
            "discoveryVersion": "v1",
            "name": "fleet",
            "version": "v1",
            "servicePath": "fleet/v1/"
        }"##;

        let parser = DiscoveryParser::from_json(discovery_json);
        assert!(parser.is_ok());

        let parser = parser.unwrap();
        assert_eq!(parser.doc.name.as_deref(), Some("fleet"));
        assert_eq!(parser.doc.service_path, "fleet/v1/");
        assert!(parser.doc.resources.is_empty());
        assert!(parser.doc.methods.is_empty());
    }

    #[test]
    fn test_missing_children_are_empty() {
        let parser = DiscoveryParser::from_json("{}").unwrap();
        assert_eq!(parser.doc().resource_count(), 0);
        assert_eq!(parser.doc().method_count(), 0);
        assert_eq!(parser.doc().service_path, "");
    }

    #[test]
    fn test_method_without_path_is_rejected() {
        let json = r#"{"methods": {"List": {"httpMethod": "GET"}}}"#;
        let result = DiscoveryParser::from_json(json);
        assert!(matches!(result, Err(ClientError::Parse(_))));
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let result = DiscoveryParser::from_slice(b"<html>not json</html>");
        assert!(matches!(result, Err(ClientError::Parse(_))));
    }
}
