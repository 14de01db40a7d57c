//! Runtime REST client synthesized from a discovery document
//!
//! The crate builds a client graph from a parsed discovery document and
//! turns calls on that graph into HTTP requests.
//!
//! ## Pipeline
//!
//! 1. [`Collection::from_document`] walks the resource tree once. Each
//!    resource becomes a nested [`Collection`], each method a [`MethodNode`].
//! 2. [`MethodNode::invoke`] synthesizes the request for one call: the
//!    `body` payload is set aside, the path template is expanded, path
//!    parameters are removed and the rest is sent as the query string.
//! 3. The request goes to a [`Transport`]; its response is returned as is.
//!
//! ## Usage
//! ```rust,ignore
//! use discovery_client::{CallArgs, ClientConfig, DiscoveryClient};
//!
//! let client = DiscoveryClient::connect(&ClientConfig::default()).await?;
//! let response = client
//!     .call("Units.Get", CallArgs::new().with("unitName", "hello.service"))
//!     .await?;
//! ```

mod client;
mod graph;
mod request;
pub mod template;
mod transport;

pub use client::{fetch_document, DiscoveryClient};
pub use graph::{build, Collection, MethodNode, Node};
pub use request::{synthesize, HttpRequest, JSON_CONTENT_TYPE};
pub use transport::{HttpTransport, RawResponse, Transport};

pub use discovery_client_common::{
    CallArgs, ClientConfig, ClientError, RequestBody, Result, TransportError, Value,
};
pub use discovery_client_parser::{DiscoveryDoc, DiscoveryParser};
