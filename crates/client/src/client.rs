//! Client facade
//!
//! [`DiscoveryClient`] owns a built graph together with the transport it
//! dispatches through, and knows how to fetch a discovery document.

use crate::graph::{Collection, MethodNode};
use crate::request::HttpRequest;
use crate::transport::{HttpTransport, RawResponse, Transport};
use discovery_client_common::{CallArgs, ClientConfig, Result, TransportError};
use discovery_client_parser::{DiscoveryDoc, DiscoveryParser};
use std::collections::BTreeMap;
use tracing::{debug, info};
use url::Url;

/// Fetch and parse the discovery document at `url`
pub async fn fetch_document<T>(transport: &T, url: &Url) -> Result<DiscoveryDoc>
where
    T: Transport + ?Sized,
{
    info!(url = %url, "Fetching discovery document");

    let response = transport
        .request(HttpRequest {
            method: "GET".to_string(),
            url: url.clone(),
            headers: BTreeMap::new(),
            body: None,
        })
        .await?;

    if !response.is_success() {
        return Err(TransportError::Status {
            status: response.status,
            message: response.text(),
        }
        .into());
    }

    Ok(DiscoveryParser::from_slice(&response.body)?.into_doc())
}

/// A client graph bound to a transport
///
/// ## Examples
///
/// ```rust,ignore
/// use discovery_client::{CallArgs, ClientConfig, DiscoveryClient};
///
/// let client = DiscoveryClient::connect(&ClientConfig::default()).await?;
/// let response = client.call("Machines.List", CallArgs::new()).await?;
/// println!("{}", response.text());
/// ```
#[derive(Debug)]
pub struct DiscoveryClient<T> {
    root: Collection,
    base_uri: Url,
    transport: T,
}

impl<T: Transport> DiscoveryClient<T> {
    /// Build a client for `doc`, served under `root_url`
    pub fn new(doc: &DiscoveryDoc, root_url: &str, transport: T) -> Result<Self> {
        let base_uri = Url::parse(&doc.base_uri(root_url))?;
        debug!(base_uri = %base_uri, "Building client");
        let root = Collection::from_document(doc, base_uri.clone());

        Ok(Self {
            root,
            base_uri,
            transport,
        })
    }

    /// Build a client for `doc` under the configured root URL.
    ///
    /// The document's own `rootUrl` is ignored: calls go to the same root the
    /// document is served from.
    pub fn from_config(doc: &DiscoveryDoc, config: &ClientConfig, transport: T) -> Result<Self> {
        Self::new(doc, config.effective_root_url(), transport)
    }

    /// Fetch the discovery document through `transport`, then build the client
    pub async fn fetch(config: &ClientConfig, transport: T) -> Result<Self> {
        let doc = fetch_document(&transport, &config.discovery_url()?).await?;
        Self::from_config(&doc, config, transport)
    }

    /// Root of the client graph
    pub fn root(&self) -> &Collection {
        &self.root
    }

    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Look up a method by dotted path (e.g., `Units.Get`)
    pub fn method(&self, path: &str) -> Result<&MethodNode> {
        self.root.resolve_method(path)
    }

    /// Invoke the method at `path` with `args`
    pub async fn call(&self, path: &str, args: CallArgs) -> Result<RawResponse> {
        self.method(path)?.invoke(&self.transport, args).await
    }
}

impl DiscoveryClient<HttpTransport> {
    /// Fetch the discovery document over HTTP and build a client on it
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config)?;
        Self::fetch(config, transport).await
    }
}

impl<T> DiscoveryClient<T> {
    /// Consume the client, returning its transport
    pub fn into_transport(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use discovery_client_common::ClientError;

    const DOC: &str = r#"{
        "rootUrl": "http://fleet.example:8080/",
        "servicePath": "v1-alpha/",
        "resources": {
            "Units": {
                "methods": {
                    "Get": {
                        "httpMethod": "GET",
                        "path": "units/{unitName}",
                        "parameters": {"unitName": {"location": "path"}}
                    }
                }
            }
        }
    }"#;

    fn ok(body: &str) -> RawResponse {
        RawResponse {
            status: 200,
            body: body.as_bytes().to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn test_document_root_url_is_ignored() {
        let doc = DiscoveryParser::from_json(DOC).unwrap().into_doc();

        let client =
            DiscoveryClient::from_config(&doc, &ClientConfig::default(), MockTransport::new())
                .unwrap();
        assert_eq!(client.base_uri().as_str(), "http://localhost:8080/v1-alpha/");

        let config = ClientConfig {
            root_url: Some("http://127.0.0.1:49153/".to_string()),
            ..Default::default()
        };
        let client = DiscoveryClient::from_config(&doc, &config, MockTransport::new()).unwrap();
        assert_eq!(client.base_uri().as_str(), "http://127.0.0.1:49153/v1-alpha/");
    }

    #[test]
    fn test_templated_root_url_builds() {
        let json = r#"{
            "rootUrl": "$ENDPOINT/",
            "servicePath": "fleet/v1/",
            "resources": {
                "Machines": {"methods": {"List": {"httpMethod": "GET", "path": "machines"}}}
            }
        }"#;
        let doc = DiscoveryParser::from_json(json).unwrap().into_doc();

        let client =
            DiscoveryClient::from_config(&doc, &ClientConfig::default(), MockTransport::new())
                .unwrap();
        assert_eq!(client.base_uri().as_str(), "http://localhost:8080/fleet/v1/");
        assert!(client.method("Machines.List").is_ok());
    }

    #[tokio::test]
    async fn test_call_by_path() {
        let doc = DiscoveryParser::from_json(DOC).unwrap().into_doc();

        let mut transport = MockTransport::new();
        transport
            .expect_request()
            .withf(|req| req.url.as_str() == "http://localhost:8080/v1-alpha/units/a.service")
            .times(1)
            .returning(|_| Ok(ok(r#"{"name":"a.service"}"#)));

        let client = DiscoveryClient::new(&doc, "http://localhost:8080/", transport).unwrap();
        assert_eq!(client.base_uri().as_str(), "http://localhost:8080/v1-alpha/");

        let response = client
            .call("Units.Get", CallArgs::new().with("unitName", "a.service"))
            .await
            .unwrap();
        assert_eq!(response.text(), r#"{"name":"a.service"}"#);
    }

    #[tokio::test]
    async fn test_call_unknown_method() {
        let doc = DiscoveryParser::from_json(DOC).unwrap().into_doc();
        let mut transport = MockTransport::new();
        transport.expect_request().times(0);

        let client = DiscoveryClient::new(&doc, "http://localhost:8080/", transport).unwrap();
        let err = client.call("Units.Destroy", CallArgs::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::UnknownMember(_)));
    }

    #[tokio::test]
    async fn test_fetch_builds_from_served_document() {
        let mut transport = MockTransport::new();
        transport
            .expect_request()
            .withf(|req| {
                req.method == "GET"
                    && req.url.as_str() == "http://localhost:8080/v1-alpha/discovery.json"
            })
            .times(1)
            .returning(|_| Ok(ok(DOC)));

        let client = DiscoveryClient::fetch(&ClientConfig::default(), transport)
            .await
            .unwrap();

        // Calls go to the root the document came from, not its rootUrl
        assert_eq!(
            client.base_uri().as_str(),
            "http://localhost:8080/v1-alpha/"
        );
        assert!(client.method("Units.Get").is_ok());
    }

    #[tokio::test]
    async fn test_fetch_document_rejects_error_status() {
        let mut transport = MockTransport::new();
        transport.expect_request().times(1).returning(|_| {
            Ok(RawResponse {
                status: 404,
                body: b"not found".to_vec(),
                ..Default::default()
            })
        });

        let url = Url::parse("http://localhost:8080/v1-alpha/discovery.json").unwrap();
        let err = fetch_document(&transport, &url).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::Status { status: 404, .. })
        ));
    }
}
