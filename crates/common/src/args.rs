//! Call-time arguments for a discovery method
//!
//! A call carries named scalar parameters plus an optional request payload.
//! The payload lives outside the parameter map, so it can never leak into
//! path expansion or the query string.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Reserved argument name carrying the request payload
pub const BODY_KEY: &str = "body";

/// Scalar parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// JSON form of the value, used when a value is promoted to a payload
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

/// Request payload, handed to the transport untouched
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured payload, serialized by the transport
    Json(serde_json::Value),
    /// Already serialized payload
    Raw(Vec<u8>),
}

impl RequestBody {
    /// Wire bytes of the payload
    pub fn to_bytes(&self) -> Result<Cow<'_, [u8]>, serde_json::Error> {
        match self {
            RequestBody::Json(value) => serde_json::to_vec(value).map(Cow::Owned),
            RequestBody::Raw(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
        }
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        RequestBody::Json(value)
    }
}

/// Arguments for one method invocation
///
/// ## Examples
///
/// ```rust
/// use discovery_client_common::{CallArgs, RequestBody};
///
/// let args = CallArgs::new()
///     .with("unitName", "hello.service")
///     .with("nextPageToken", "abc")
///     .with_body(RequestBody::Json(serde_json::json!({"desiredState": "launched"})));
///
/// assert_eq!(args.len(), 2);
/// assert!(args.body().is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    params: BTreeMap<String, Value>,
    body: Option<RequestBody>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`CallArgs::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder form of [`CallArgs::set_body`]
    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.set_body(body);
        self
    }

    /// Insert a named argument.
    ///
    /// The reserved name `body` sets the payload instead of a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if name == BODY_KEY {
            self.body = Some(RequestBody::Json(value.to_json()));
        } else {
            self.params.insert(name, value);
        }
    }

    pub fn set_body(&mut self, body: impl Into<RequestBody>) {
        self.body = Some(body.into());
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Remove and return the payload
    pub fn take_body(&mut self) -> Option<RequestBody> {
        self.body.take()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.params.remove(name)
    }

    /// Number of parameters, not counting the payload
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameters in ascending name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for CallArgs
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = CallArgs::new();
        for (name, value) in iter {
            args.insert(name, value);
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_key_is_never_a_parameter() {
        let args = CallArgs::new().with("body", "payload").with("x", 1);
        assert!(!args.contains("body"));
        assert_eq!(args.len(), 1);
        assert_eq!(
            args.body(),
            Some(&RequestBody::Json(serde_json::json!("payload")))
        );
    }

    #[test]
    fn test_value_string_forms() {
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from("a b").to_string(), "a b");
    }

    #[test]
    fn test_take_body_leaves_parameters() {
        let mut args: CallArgs = vec![("a", "1"), ("b", "2")].into_iter().collect();
        args.set_body(RequestBody::Raw(b"{}".to_vec()));

        assert_eq!(args.take_body(), Some(RequestBody::Raw(b"{}".to_vec())));
        assert!(args.take_body().is_none());
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_request_body_bytes() {
        let json = RequestBody::Json(serde_json::json!({"a": 1}));
        assert_eq!(json.to_bytes().unwrap().as_ref(), br#"{"a":1}"#);

        let raw = RequestBody::Raw(b"already encoded".to_vec());
        assert_eq!(raw.to_bytes().unwrap().as_ref(), b"already encoded");
    }
}
