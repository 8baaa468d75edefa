//! Grouping of exported types into a namespace tree.
//!
//! Types are grouped by their exact namespace string. Every dotted prefix of a known
//! namespace is a namespace too, even without types of its own, so each level of the
//! package hierarchy gets a unit. The global namespace (empty path) is the package root
//! and lists the top-level namespaces as its children.
//!
//! Nodes are kept in a `BTreeMap`, so iteration order, child manifests and therefore the
//! emitted text do not depend on the provider's iteration order.

use std::collections::BTreeMap;

use crate::metadata::types::MetadataTypeRc;

/// One namespace with its direct types and children
#[derive(Debug, Clone, Default)]
pub struct NamespaceNode {
    /// Dotted namespace, empty for the package root
    pub namespace: String,
    /// Namespace segments, empty for the package root
    pub path: Vec<String>,
    /// Types declared directly in this namespace, in declaration order
    pub types: Vec<MetadataTypeRc>,
    /// Segment names of the direct child namespaces, sorted
    pub children: Vec<String>,
}

impl NamespaceNode {
    fn new(namespace: &str) -> Self {
        NamespaceNode {
            namespace: namespace.to_string(),
            path: if namespace.is_empty() {
                Vec::new()
            } else {
                namespace.split('.').map(str::to_string).collect()
            },
            ..NamespaceNode::default()
        }
    }

    /// Last path segment, empty for the package root
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.last().map_or("", String::as_str)
    }

    /// True for the package root
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// True if the node has child namespaces
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Collects types and builds a [`NamespaceTree`]
#[derive(Debug, Default)]
pub struct NamespaceTreeBuilder {
    groups: BTreeMap<String, Vec<MetadataTypeRc>>,
}

impl NamespaceTreeBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one type to its namespace group
    pub fn add(&mut self, ty: MetadataTypeRc) -> &mut Self {
        self.groups.entry(ty.namespace.clone()).or_default().push(ty);
        self
    }

    /// Add types, keeping their order within each namespace
    pub fn extend<I>(&mut self, types: I) -> &mut Self
    where
        I: IntoIterator<Item = MetadataTypeRc>,
    {
        for ty in types {
            self.add(ty);
        }
        self
    }

    /// Finish the tree
    #[must_use]
    pub fn build(self) -> NamespaceTree {
        let mut nodes: BTreeMap<String, NamespaceNode> = BTreeMap::new();
        nodes.insert(String::new(), NamespaceNode::new(""));

        for (namespace, types) in self.groups {
            let mut prefix = namespace.as_str();
            while let Some((parent, _)) = prefix.rsplit_once('.') {
                nodes
                    .entry(parent.to_string())
                    .or_insert_with(|| NamespaceNode::new(parent));
                prefix = parent;
            }

            nodes
                .entry(namespace.clone())
                .or_insert_with(|| NamespaceNode::new(&namespace))
                .types = types;
        }

        let known: Vec<String> = nodes.keys().filter(|ns| !ns.is_empty()).cloned().collect();
        for namespace in known {
            let (parent, segment) = match namespace.rsplit_once('.') {
                Some((parent, segment)) => (parent, segment),
                None => ("", namespace.as_str()),
            };
            if let Some(node) = nodes.get_mut(parent) {
                node.children.push(segment.to_string());
            }
        }

        for node in nodes.values_mut() {
            node.children.sort();
        }

        NamespaceTree { nodes }
    }
}

/// Immutable namespace hierarchy of one library
#[derive(Debug, Clone, Default)]
pub struct NamespaceTree {
    nodes: BTreeMap<String, NamespaceNode>,
}

impl NamespaceTree {
    /// Build a tree from a list of types
    pub fn from_types<I>(types: I) -> Self
    where
        I: IntoIterator<Item = MetadataTypeRc>,
    {
        let mut builder = NamespaceTreeBuilder::new();
        builder.extend(types);
        builder.build()
    }

    /// Node for a dotted namespace
    #[must_use]
    pub fn get(&self, namespace: &str) -> Option<&NamespaceNode> {
        self.nodes.get(namespace)
    }

    /// The package root
    #[must_use]
    pub fn root(&self) -> Option<&NamespaceNode> {
        self.nodes.get("")
    }

    /// Direct child segments of `namespace`, sorted
    #[must_use]
    pub fn children(&self, namespace: &str) -> &[String] {
        self.nodes
            .get(namespace)
            .map_or(&[], |node| node.children.as_slice())
    }

    /// All nodes, sorted by namespace, package root first
    pub fn nodes(&self) -> impl Iterator<Item = &NamespaceNode> {
        self.nodes.values()
    }

    /// Number of nodes, package root included
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the tree holds nothing but an empty package root
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1 && self.root().map_or(true, |root| root.types.is_empty())
    }
}
