//! Discovery Document parser
//!
//! Parses discovery documents into a typed resource tree.
//!
//! ## Discovery Document Format
//!
//! A discovery document describes a REST API as a tree: the root and every
//! resource may hold nested `resources` and `methods`. Each method names an
//! HTTP verb, a URI template relative to the service base, and its
//! parameters with their `location` (`path` or `query`).
//!
//! ## Discovery Sources
//!
//! - **fleet**: `GET http://localhost:8080/v1-alpha/discovery.json`
//! - **Google APIs**: `GET https://{service}.googleapis.com/$discovery/rest?version={version}`
//!
//! ## Usage
//! ```rust,ignore
//! use discovery_client_parser::discovery::DiscoveryParser;
//!
//! let doc = DiscoveryParser::from_file("fleet-v1.json")?.into_doc();
//! ```

mod parser;
mod types;

pub use parser::DiscoveryParser;
pub use types::*;
