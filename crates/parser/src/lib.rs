//! Discovery document parsing
//!
//! This crate turns a discovery document (JSON) into a typed tree of
//! resources and methods (`DiscoveryDoc`). Absent `resources` or `methods`
//! at any level load as empty maps; a method must carry `path` and
//! `httpMethod`.

pub mod discovery;

pub use discovery::{
    DiscoveryDoc, DiscoveryParser, Method, Parameter, ParameterLocation, Resource, ResourceTree,
    Schema, SchemaRef,
};
