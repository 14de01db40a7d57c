//! Common types and utilities for the discovery-driven REST client
//!
//! This crate contains shared data structures, error types, and configuration
//! used across the parser, client, and CLI components.

mod args;
mod config;

pub use args::{CallArgs, RequestBody, Value, BODY_KEY};
pub use config::{ClientConfig, DEFAULT_DISCOVERY_PATH, DEFAULT_ROOT_URL, DEFAULT_TIMEOUT_SECS};

use thiserror::Error;

/// Errors raised by a transport while executing a request
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Transport error: {0}")]
    Other(String),
}

/// Errors that can occur while building or invoking a client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Method {method} requires path parameter '{parameter}'")]
    MissingPathParameter { method: String, parameter: String },

    #[error("No such resource or method: {0}")]
    UnknownMember(String),

    #[error("{0} is a resource, not a method")]
    NotAMethod(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
