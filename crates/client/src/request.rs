//! Request synthesis
//!
//! Turns one method descriptor, the service base URI and a set of call
//! arguments into a fully resolved [`HttpRequest`]. The steps run in a fixed
//! order:
//!
//! 1. the `body` payload is taken out of the arguments
//! 2. the path template is expanded against all remaining arguments and
//!    joined onto the base URI
//! 3. parameters declared with `location: path` are dropped from the pool
//! 4. whatever is left becomes the query string
//!
//! Path parameters must stay in the pool until after expansion, otherwise a
//! token they fill would be unresolved; they must leave it before step 4,
//! otherwise they would also show up in the query string.

use crate::template::{self, TemplateError};
use discovery_client_common::{CallArgs, ClientError, RequestBody, Result};
use discovery_client_parser::Method;
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

/// Content type sent with every synthesized request
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A fully resolved HTTP request, ready for a transport
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP verb as declared by the method (e.g., "GET")
    pub method: String,

    /// Final URL including the query string
    pub url: Url,

    /// Request headers
    pub headers: BTreeMap<String, String>,

    /// Payload, passed through untouched
    pub body: Option<RequestBody>,
}

/// Build the request for one invocation of `method`
///
/// Fails with [`ClientError::MissingPathParameter`] before anything is
/// dispatched when a declared path parameter, or any template variable, has
/// no argument.
pub fn synthesize(method: &Method, base_uri: &Url, mut args: CallArgs) -> Result<HttpRequest> {
    let body = args.take_body();

    let missing = |parameter: &str| ClientError::MissingPathParameter {
        method: method.display_name(),
        parameter: parameter.to_string(),
    };

    if let Some(absent) = method.path_parameters().find(|name| !args.contains(name)) {
        return Err(missing(absent));
    }

    let expanded = template::expand(&method.path, |name| {
        args.get(name).map(|value| value.to_string())
    })
    .map_err(|e| match e {
        TemplateError::Unresolved(name) => missing(&name),
        other => ClientError::Parse(other.to_string()),
    })?;

    let mut url = base_uri.join(&expanded)?;

    for name in method.path_parameters() {
        args.remove(name);
    }

    if !args.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(args.iter().map(|(name, value)| (name, value.to_string())));
    }

    let mut headers = BTreeMap::new();
    headers.insert("content-type".to_string(), JSON_CONTENT_TYPE.to_string());

    debug!(
        method = %method.display_name(),
        http.method = %method.http_method,
        http.url = %url,
        has_body = body.is_some(),
        "Synthesized request"
    );

    Ok(HttpRequest {
        method: method.http_method.clone(),
        url,
        headers,
        body,
    })
}
