//! Discovery Document type definitions
//!
//! Based on JSON Schema Draft 3 with discovery-specific extensions. Only
//! `path` and `httpMethod` on a method are mandatory; everything else is
//! optional so that sparse documents still load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Discovery Document root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryDoc {
    /// Discovery version (e.g., "v1")
    #[serde(rename = "discoveryVersion")]
    #[serde(default)]
    pub discovery_version: Option<String>,

    /// API name (e.g., "fleet")
    #[serde(default)]
    pub name: Option<String>,

    /// API version (e.g., "v1")
    #[serde(default)]
    pub version: Option<String>,

    /// API title
    #[serde(default)]
    pub title: Option<String>,

    /// Description
    #[serde(default)]
    pub description: Option<String>,

    /// Root URL (e.g., "<https://storage.googleapis.com/>")
    #[serde(rename = "rootUrl")]
    #[serde(default)]
    pub root_url: Option<String>,

    /// Service path (e.g., "fleet/v1/")
    #[serde(rename = "servicePath")]
    #[serde(default)]
    pub service_path: String,

    /// Base path
    #[serde(rename = "basePath")]
    #[serde(default)]
    pub base_path: Option<String>,

    /// Parameters common to every method
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,

    /// Schemas (data types)
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,

    /// Resources (collections of methods)
    #[serde(default)]
    pub resources: BTreeMap<String, Resource>,

    /// Methods at root level
    #[serde(default)]
    pub methods: BTreeMap<String, Method>,
}

/// Where a parameter goes in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
    /// Missing or unrecognized location, sent as a query parameter
    Other,
}

impl ParameterLocation {
    pub fn is_path(self) -> bool {
        self == ParameterLocation::Path
    }
}

/// Parameter definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter type (string, integer, boolean, etc.)
    #[serde(rename = "type")]
    #[serde(default)]
    pub param_type: Option<String>,

    /// Description
    #[serde(default)]
    pub description: Option<String>,

    /// Default value
    #[serde(default)]
    pub default: Option<String>,

    /// Required flag
    #[serde(default)]
    pub required: bool,

    /// Whether the parameter may be given more than once
    #[serde(default)]
    pub repeated: bool,

    /// Location (query, path)
    #[serde(default)]
    pub location: Option<String>,

    /// Enum values
    #[serde(rename = "enum")]
    #[serde(default)]
    pub enum_values: Vec<String>,
}

impl Parameter {
    /// Classify the raw `location` string
    pub fn location(&self) -> ParameterLocation {
        match self.location.as_deref() {
            Some("path") => ParameterLocation::Path,
            Some("query") => ParameterLocation::Query,
            _ => ParameterLocation::Other,
        }
    }
}

/// Schema (data type) definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Schema ID
    #[serde(default)]
    pub id: Option<String>,

    /// Type (string, object, array, etc.)
    #[serde(rename = "type")]
    #[serde(default)]
    pub schema_type: Option<String>,

    /// Description
    #[serde(default)]
    pub description: Option<String>,

    /// Properties (for object type)
    #[serde(default)]
    pub properties: BTreeMap<String, Schema>,

    /// Items (for array type)
    #[serde(default)]
    pub items: Option<Box<Schema>>,

    /// Reference to another schema
    #[serde(rename = "$ref")]
    #[serde(default)]
    pub ref_schema: Option<String>,
}

/// Resource (collection of methods)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    /// Methods for this resource
    #[serde(default)]
    pub methods: BTreeMap<String, Method>,

    /// Nested resources
    #[serde(default)]
    pub resources: BTreeMap<String, Resource>,
}

/// Method (API operation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Method {
    /// Method ID (e.g., "fleet.Unit.Get")
    #[serde(default)]
    pub id: Option<String>,

    /// URI template relative to the service base
    pub path: String,

    /// HTTP method (GET, POST, PUT, DELETE, PATCH)
    #[serde(rename = "httpMethod")]
    pub http_method: String,

    /// Description
    #[serde(default)]
    pub description: Option<String>,

    /// Parameters
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,

    /// Suggested ordering of required parameters
    #[serde(rename = "parameterOrder")]
    #[serde(default)]
    pub parameter_order: Vec<String>,

    /// Request body schema
    #[serde(default)]
    pub request: Option<SchemaRef>,

    /// Response schema
    #[serde(default)]
    pub response: Option<SchemaRef>,
}

/// Reference to a named schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub ref_schema: String,
}

impl Method {
    /// Names of the parameters declared with `location: path`
    pub fn path_parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|(_, p)| p.location().is_path())
            .map(|(name, _)| name.as_str())
    }

    /// Identifier used in diagnostics: the method id, else verb and path
    pub fn display_name(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("{} {}", self.http_method, self.path),
        }
    }
}

/// A level of the resource tree: either the document root or a resource
pub trait ResourceTree {
    /// Nested resources at this level
    fn resources(&self) -> &BTreeMap<String, Resource>;

    /// Methods at this level
    fn methods(&self) -> &BTreeMap<String, Method>;

    /// Number of resources at this level and below
    fn resource_count(&self) -> usize {
        self.resources()
            .values()
            .map(|r| 1 + r.resource_count())
            .sum()
    }

    /// Number of methods at this level and below
    fn method_count(&self) -> usize {
        self.methods().len()
            + self
                .resources()
                .values()
                .map(|r| r.method_count())
                .sum::<usize>()
    }
}

impl ResourceTree for DiscoveryDoc {
    fn resources(&self) -> &BTreeMap<String, Resource> {
        &self.resources
    }

    fn methods(&self) -> &BTreeMap<String, Method> {
        &self.methods
    }
}

impl ResourceTree for Resource {
    fn resources(&self) -> &BTreeMap<String, Resource> {
        &self.resources
    }

    fn methods(&self) -> &BTreeMap<String, Method> {
        &self.methods
    }
}

impl DiscoveryDoc {
    /// Get a schema by reference
    /// e.g., "Unit" -> returns Unit schema
    pub fn resolve_schema_ref(&self, ref_name: &str) -> Option<&Schema> {
        self.schemas.get(ref_name)
    }

    /// Join a root URL and the service path with exactly one slash between them
    ///
    /// e.g., ("http://localhost:8080/", "v1-alpha/") -> "http://localhost:8080/v1-alpha/"
    pub fn base_uri(&self, root_url: &str) -> String {
        if self.service_path.is_empty() {
            return root_url.to_string();
        }
        format!(
            "{}/{}",
            root_url.trim_end_matches('/'),
            self.service_path.trim_start_matches('/')
        )
    }
}
