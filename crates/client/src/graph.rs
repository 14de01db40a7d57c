//! Client graph construction
//!
//! Walks a discovery document once and produces a tree of [`Node`]s whose
//! shape mirrors the document: every resource becomes a [`Collection`], every
//! method becomes a [`MethodNode`] bound to the shared base URI. The graph is
//! read-only once built and can be shared freely between tasks.

use crate::request::{self, HttpRequest};
use crate::template;
use crate::transport::{RawResponse, Transport};
use discovery_client_common::{CallArgs, ClientError, Result};
use discovery_client_parser::{Method, ResourceTree};
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, trace};
use url::Url;

/// A node of the client graph
#[derive(Debug, Clone)]
pub enum Node {
    Collection(Collection),
    Method(MethodNode),
}

impl Node {
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Node::Collection(c) => Some(c),
            Node::Method(_) => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodNode> {
        match self {
            Node::Method(m) => Some(m),
            Node::Collection(_) => None,
        }
    }
}

/// A callable method: one descriptor paired with the service base URI
#[derive(Debug, Clone)]
pub struct MethodNode {
    descriptor: Arc<Method>,
    base_uri: Arc<Url>,
}

impl MethodNode {
    pub fn new(descriptor: Method, base_uri: Arc<Url>) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            base_uri,
        }
    }

    pub fn descriptor(&self) -> &Method {
        &self.descriptor
    }

    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    /// Arguments a call cannot omit: declared path parameters and every
    /// variable of the path template
    pub fn required_arguments(&self) -> BTreeSet<String> {
        self.descriptor
            .path_parameters()
            .map(str::to_string)
            .chain(template::variables(&self.descriptor.path))
            .collect()
    }

    /// Resolve `args` into a request without dispatching it
    pub fn synthesize(&self, args: CallArgs) -> Result<HttpRequest> {
        request::synthesize(&self.descriptor, &self.base_uri, args)
    }

    /// Synthesize the request and hand it to `transport`.
    ///
    /// Argument errors are raised before the transport is touched; transport
    /// failures are returned as they come.
    pub async fn invoke<T>(&self, transport: &T, args: CallArgs) -> Result<RawResponse>
    where
        T: Transport + ?Sized,
    {
        let request = self.synthesize(args)?;
        Ok(transport.request(request).await?)
    }
}

/// A named group of resources and methods
#[derive(Debug, Clone, Default)]
pub struct Collection {
    children: BTreeMap<String, Node>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for a whole document rooted at `base_uri`
    pub fn from_document<T: ResourceTree>(tree: &T, base_uri: Url) -> Self {
        let root = build(tree, &Arc::new(base_uri), Collection::new());
        debug!(
            collections = root.collection_count(),
            methods = root.method_count(),
            "Built client graph"
        );
        root
    }

    /// Attach `node` under `name`, replacing any previous child of that name
    pub fn insert(&mut self, name: impl Into<String>, node: Node) {
        self.children.insert(name.into(), node);
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Child collection by name
    pub fn resource(&self, name: &str) -> Option<&Collection> {
        self.get(name).and_then(Node::as_collection)
    }

    /// Child method by name
    pub fn method(&self, name: &str) -> Option<&MethodNode> {
        self.get(name).and_then(Node::as_method)
    }

    /// Follow a dotted path such as `Units.Get`
    pub fn resolve(&self, path: &str) -> Result<&Node> {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let mut node = self
            .get(first)
            .ok_or_else(|| ClientError::UnknownMember(path.to_string()))?;

        for segment in segments {
            node = node
                .as_collection()
                .and_then(|c| c.get(segment))
                .ok_or_else(|| ClientError::UnknownMember(path.to_string()))?;
        }
        Ok(node)
    }

    /// Follow a dotted path that must end at a method
    pub fn resolve_method(&self, path: &str) -> Result<&MethodNode> {
        self.resolve(path)?
            .as_method()
            .ok_or_else(|| ClientError::NotAMethod(path.to_string()))
    }

    /// Children in name order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Node> {
        self.children.iter()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of collections below this one
    pub fn collection_count(&self) -> usize {
        self.children
            .values()
            .filter_map(Node::as_collection)
            .map(|c| 1 + c.collection_count())
            .sum()
    }

    /// Number of methods at this level and below
    pub fn method_count(&self) -> usize {
        self.children
            .values()
            .map(|node| match node {
                Node::Collection(c) => c.method_count(),
                Node::Method(_) => 1,
            })
            .sum()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = (&'a String, &'a Node);
    type IntoIter = btree_map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Populate `collection` from one level of the resource tree.
///
/// Resources are attached before methods, so a method sharing a name with a
/// resource at the same level replaces it.
pub fn build<T: ResourceTree>(
    tree: &T,
    base_uri: &Arc<Url>,
    mut collection: Collection,
) -> Collection {
    for (name, resource) in tree.resources() {
        trace!(resource = %name, "Attaching collection");
        let child = build(resource, base_uri, Collection::new());
        collection.insert(name.clone(), Node::Collection(child));
    }

    for (name, method) in tree.methods() {
        trace!(method = %name, path = %method.path, "Attaching method");
        let node = MethodNode::new(method.clone(), Arc::clone(base_uri));
        collection.insert(name.clone(), Node::Method(node));
    }

    collection
}
