//! Driver producing one stub unit per namespace.
//!
//! [`StubEmitter::run`] asks the provider for its exported types once, builds the
//! [`NamespaceTree`] and renders every namespace into a [`NamespaceStub`]. Each namespace
//! owns its mapper, imports and diagnostics, so namespaces are rendered independently and,
//! with [`StubConfig::parallel`], on the rayon thread pool.
//!
//! # Failure Isolation
//!
//! A provider failure while rendering a namespace fails that namespace only. The run keeps
//! every unit that rendered and reports the failures next to them in [`StubRun::failures`].
//!
//! # Unit Layout
//!
//! ```text
//! __all__ = ["Child", ...]          only with child namespaces
//!
//! from abc import ABC, abstractmethod
//! from typing import ...
//! from Other.Namespace import Name  only with StubConfig::emit_imports
//!
//!
//! class First:
//!     ...
//! ```

use std::{collections::BTreeSet, time::Instant};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    metadata::{
        diagnostics::Diagnostics,
        provider::{LibraryInfo, MetadataProvider},
        signature::split_qualified_name,
    },
    stubs::{
        config::StubConfig,
        mapper::{python_type_name, TypeNameMapper},
        namespace::{NamespaceNode, NamespaceTree},
        renderer::{RenderedType, TypeRenderer},
    },
    Error, Result,
};

/// Static preamble shared by every unit
pub const PREAMBLE: &str = "from abc import ABC, abstractmethod\n\
from typing import Callable, ClassVar, Dict, Iterable, List, Optional, Set, Tuple, overload\n";

/// The rendered stub of one namespace
#[derive(Debug, Clone)]
pub struct NamespaceStub {
    /// Dotted namespace, empty for the package root
    pub namespace: String,
    /// Namespace segments, empty for the package root
    pub path: Vec<String>,
    /// Child namespace segments listed in the manifest
    pub children: Vec<String>,
    /// Python names of the rendered types, in declaration order
    pub types: Vec<String>,
    /// Qualified names of every type referenced by this unit
    pub imports: BTreeSet<String>,
    /// Stub text
    pub text: String,
    /// Degradations recorded while rendering this unit
    pub diagnostics: Diagnostics,
}

impl NamespaceStub {
    /// True for the package root unit
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}

/// Outcome of a whole run
#[derive(Debug)]
pub struct StubRun {
    /// Identity of the library the stubs describe
    pub library: LibraryInfo,
    /// First namespace segment of the first exported type
    pub root_namespace: Option<String>,
    /// Rendered units, sorted by namespace
    pub units: Vec<NamespaceStub>,
    /// Namespaces that failed, each as [`Error::Namespace`]
    pub failures: Vec<Error>,
}

impl StubRun {
    /// Unit for a dotted namespace
    #[must_use]
    pub fn unit(&self, namespace: &str) -> Option<&NamespaceStub> {
        self.units.iter().find(|unit| unit.namespace == namespace)
    }

    /// True if every namespace rendered
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of diagnostics across all units
    #[must_use]
    pub fn diagnostic_count(&self) -> usize {
        self.units.iter().map(|unit| unit.diagnostics.count()).sum()
    }
}

/// Renders a library's exported types into per-namespace stubs
pub struct StubEmitter<'p> {
    provider: &'p dyn MetadataProvider,
    config: StubConfig,
}

impl<'p> StubEmitter<'p> {
    /// Create an emitter over `provider`
    pub fn new(provider: &'p dyn MetadataProvider, config: StubConfig) -> Self {
        StubEmitter { provider, config }
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &StubConfig {
        &self.config
    }

    /// Render every namespace of the library.
    ///
    /// # Errors
    /// Returns an error only if the provider cannot list the exported types. Failures while
    /// rendering a single namespace are collected in [`StubRun::failures`].
    pub fn run(&self) -> Result<StubRun> {
        let started = Instant::now();
        let types = self.provider.exported_types()?;
        let root_namespace = types
            .first()
            .map(|ty| ty.root_namespace().to_string())
            .filter(|root| !root.is_empty());

        let tree = NamespaceTree::from_types(types);
        let nodes: Vec<&NamespaceNode> = tree
            .nodes()
            .filter(|node| !node.is_root() || self.config.emit_root_unit || !node.types.is_empty())
            .collect();

        let results: Vec<Result<NamespaceStub>> = if self.config.parallel {
            nodes.par_iter().map(|node| self.emit_namespace(node)).collect()
        } else {
            nodes.iter().map(|node| self.emit_namespace(node)).collect()
        };

        let mut units = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(unit) => units.push(unit),
                Err(err) => failures.push(err),
            }
        }

        debug!(
            units = units.len(),
            failures = failures.len(),
            elapsed = ?started.elapsed(),
            "stub run finished"
        );

        Ok(StubRun {
            library: self.provider.library(),
            root_namespace,
            units,
            failures,
        })
    }

    /// Render one namespace into its unit.
    ///
    /// # Errors
    /// Returns [`Error::Namespace`] wrapping the first provider failure met while rendering.
    pub fn emit_namespace(&self, node: &NamespaceNode) -> Result<NamespaceStub> {
        let started = Instant::now();
        let diagnostics = Diagnostics::new();
        let renderer = TypeRenderer::new(&self.config);

        let (rendered, imports) = {
            let mut mapper = TypeNameMapper::new(self.provider, &diagnostics);
            let rendered: Vec<RenderedType> = node
                .types
                .iter()
                .filter_map(|ty| renderer.render(ty, &mut mapper))
                .collect();

            if let Some(err) = mapper.take_failure() {
                warn!(namespace = %node.namespace, error = %err, "namespace failed");
                return Err(err.in_namespace(&node.namespace));
            }
            (rendered, mapper.into_imports())
        };

        let text = self.assemble(node, &rendered, &imports);
        debug!(
            namespace = %node.namespace,
            types = rendered.len(),
            diagnostics = diagnostics.count(),
            elapsed = ?started.elapsed(),
            "namespace rendered"
        );

        Ok(NamespaceStub {
            namespace: node.namespace.clone(),
            path: node.path.clone(),
            children: node.children.clone(),
            types: rendered.into_iter().map(|ty| ty.name).collect(),
            imports,
            text,
            diagnostics,
        })
    }

    fn assemble(
        &self,
        node: &NamespaceNode,
        rendered: &[RenderedType],
        imports: &BTreeSet<String>,
    ) -> String {
        let mut text = String::new();

        if node.has_children() {
            let names: Vec<String> = node
                .children
                .iter()
                .map(|child| format!("\"{child}\""))
                .collect();
            text.push_str(&format!("__all__ = [{}]\n\n", names.join(", ")));
        }

        text.push_str(PREAMBLE);

        if self.config.emit_imports {
            for qualified in imports {
                let (namespace, name) = split_qualified_name(qualified);
                if namespace.is_empty() || namespace == node.namespace {
                    continue;
                }
                text.push_str(&format!("from {namespace} import {}\n", python_type_name(name)));
            }
        }

        for ty in rendered {
            text.push_str("\n\n");
            text.push_str(&ty.text);
        }

        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{acme_provider, failing_provider};

    #[test]
    fn test_run_sorted_units() {
        let provider = acme_provider();
        let run = StubEmitter::new(&provider, StubConfig::default()).run().unwrap();

        let namespaces: Vec<_> = run.units.iter().map(|unit| unit.namespace.as_str()).collect();
        let mut sorted = namespaces.clone();
        sorted.sort_unstable();
        assert_eq!(namespaces, sorted);
        assert_eq!(run.root_namespace.as_deref(), Some("Acme"));
        assert!(run.unit("").unwrap().is_root());
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let provider = acme_provider();
        let parallel = StubEmitter::new(&provider, StubConfig::default()).run().unwrap();
        let sequential = StubEmitter::new(&provider, StubConfig::sequential()).run().unwrap();

        assert_eq!(parallel.units.len(), sequential.units.len());
        for (left, right) in parallel.units.iter().zip(&sequential.units) {
            assert_eq!(left.namespace, right.namespace);
            assert_eq!(left.text, right.text);
        }
    }

    #[test]
    fn test_manifest_and_preamble() {
        let provider = acme_provider();
        let run = StubEmitter::new(&provider, StubConfig::default()).run().unwrap();

        let acme = run.unit("Acme").unwrap();
        assert!(acme.text.starts_with("__all__ = [\"Geometry\"]\n\n"));
        assert!(acme.text.contains(PREAMBLE));

        let geometry = run.unit("Acme.Geometry").unwrap();
        assert!(geometry.text.starts_with(PREAMBLE));
        assert!(geometry.children.is_empty());
    }

    #[test]
    fn test_root_unit_optional() {
        let provider = acme_provider();
        let config = StubConfig {
            emit_root_unit: false,
            ..StubConfig::default()
        };
        let run = StubEmitter::new(&provider, config).run().unwrap();
        assert!(run.unit("").is_none());
    }

    #[test]
    fn test_imports_block() {
        let provider = acme_provider();
        let run = StubEmitter::new(&provider, StubConfig::complete()).run().unwrap();

        let acme = run.unit("Acme").unwrap();
        assert!(acme.imports.contains("Acme.Geometry.Point"));
        assert!(acme.text.contains("from Acme.Geometry import Point\n"));
        assert!(!acme.text.contains("from Acme import"));
    }

    #[test]
    fn test_failure_is_isolated() {
        let provider = failing_provider();
        let run = StubEmitter::new(&provider, StubConfig::sequential()).run().unwrap();

        assert!(!run.is_complete());
        assert_eq!(run.failures.len(), 1);
        assert!(matches!(
            &run.failures[0],
            Error::Namespace { namespace, .. } if namespace == "Acme.Plugins"
        ));
        assert!(run.unit("Acme.Plugins").is_none());
        assert!(run.unit("Acme").is_some());
        assert!(run.unit("Acme.Geometry").is_some());
    }
}
