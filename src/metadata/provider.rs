//! Metadata provider boundary and the in-memory snapshot provider.
//!
//! The engine never loads binaries itself. It consumes a [`MetadataProvider`], a passive,
//! read-only query surface that lists the exported types of one library and resolves
//! qualified names on demand (base types, interfaces, referenced enums).
//!
//! [`SnapshotProvider`] is the provider shipped with the crate. It serves a
//! [`LibrarySnapshot`], a plain record dump of a library's reflection metadata that can be
//! built in code or loaded from JSON.
//!
//! # Resolution Contract
//!
//! [`MetadataProvider::resolve`] distinguishes three answers:
//! - `Ok(Some(ty))` - the type is known
//! - `Ok(None)` - the type is unknown, callers degrade gracefully
//! - `Err(_)` - the provider failed to answer, e.g. a referenced assembly cannot be loaded
//!
//! # Thread Safety
//!
//! Providers are `Send + Sync` so namespaces can be rendered in parallel against one shared
//! provider. [`SnapshotProvider`] keeps declaration order in a lock-free `SkipMap` and its
//! name index in a `DashMap`.
//!
//! # Examples
//!
//! ```rust
//! use dotstub::metadata::{LibrarySnapshot, MetadataProvider, SnapshotProvider, TypeBuilder};
//!
//! let snapshot = LibrarySnapshot::new("Acme")
//!     .with_type(TypeBuilder::class("Acme", "Widget").build()?);
//! let provider = SnapshotProvider::new(snapshot);
//!
//! assert_eq!(provider.exported_types()?.len(), 1);
//! assert!(provider.resolve("Acme.Widget")?.is_some());
//! assert!(provider.resolve("Acme.Missing")?.is_none());
//! # Ok::<(), dotstub::Error>(())
//! ```

use std::{path::Path, sync::Arc};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::{
    metadata::types::{MetadataType, MetadataTypeRc},
    Error, Result,
};

/// Identity of the library a provider describes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryInfo {
    /// Simple library name
    pub name: String,
    /// Library version, `major.minor.build.revision`
    pub version: Option<String>,
    /// Location of the library binary, used by re-export shims
    pub location: Option<String>,
}

/// Read-only query surface over one library's metadata
pub trait MetadataProvider: Send + Sync {
    /// Identity of the library
    fn library(&self) -> LibraryInfo {
        LibraryInfo::default()
    }

    /// All types the library defines, in declaration order.
    ///
    /// # Errors
    /// Returns an error if the type list cannot be produced.
    fn exported_types(&self) -> Result<Vec<MetadataTypeRc>>;

    /// Look up a type by qualified name.
    ///
    /// # Errors
    /// Returns an error if the provider cannot answer the query, as opposed to `Ok(None)`
    /// for a type it simply does not know.
    fn resolve(&self, qualified_name: &str) -> Result<Option<MetadataTypeRc>>;

    /// Look up a type that must exist.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] for an unknown type, or the provider's own
    /// error if it cannot answer.
    fn require(&self, qualified_name: &str) -> Result<MetadataTypeRc> {
        self.resolve(qualified_name)?
            .ok_or_else(|| Error::TypeNotFound(qualified_name.to_string()))
    }
}

/// Plain record dump of a library's metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySnapshot {
    /// Simple library name
    pub name: String,
    /// Library version
    pub version: Option<String>,
    /// Location of the library binary
    pub location: Option<String>,
    /// Types defined by the library, in declaration order
    pub types: Vec<MetadataType>,
    /// Types from referenced libraries, resolvable but never emitted
    pub references: Vec<MetadataType>,
    /// Qualified-name prefixes whose lookup fails, e.g. `Vendor.` when `Vendor.dll` is missing
    pub unresolvable: Vec<String>,
}

impl LibrarySnapshot {
    /// Create an empty snapshot
    pub fn new(name: &str) -> Self {
        LibrarySnapshot {
            name: name.to_string(),
            ..LibrarySnapshot::default()
        }
    }

    /// Set the library version
    #[must_use]
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Set the library location
    #[must_use]
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    /// Add a defined type
    #[must_use]
    pub fn with_type(mut self, ty: MetadataType) -> Self {
        self.types.push(ty);
        self
    }

    /// Add a type from a referenced library
    #[must_use]
    pub fn with_reference(mut self, ty: MetadataType) -> Self {
        self.references.push(ty);
        self
    }

    /// Make every lookup below `prefix` fail
    #[must_use]
    pub fn with_unresolvable(mut self, prefix: &str) -> Self {
        self.unresolvable.push(prefix.to_string());
        self
    }

    /// Serialize the snapshot as pretty printed JSON
    ///
    /// # Errors
    /// Returns [`crate::Error::Snapshot`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// In-memory provider over a [`LibrarySnapshot`]
pub struct SnapshotProvider {
    /// Library identity
    library: LibraryInfo,
    /// Defined types, keyed by declaration index
    types: SkipMap<usize, MetadataTypeRc>,
    /// Defined and referenced types by qualified name
    types_by_fullname: DashMap<String, MetadataTypeRc>,
    /// Prefixes whose lookup fails
    unresolvable: Vec<String>,
}

impl SnapshotProvider {
    /// Create a provider serving `snapshot`.
    ///
    /// When two types share a qualified name, the first one wins the name index.
    pub fn new(snapshot: LibrarySnapshot) -> Self {
        let provider = SnapshotProvider {
            library: LibraryInfo {
                name: snapshot.name,
                version: snapshot.version,
                location: snapshot.location,
            },
            types: SkipMap::new(),
            types_by_fullname: DashMap::new(),
            unresolvable: snapshot.unresolvable,
        };

        for (index, ty) in snapshot.types.into_iter().enumerate() {
            let ty = Arc::new(ty);
            provider.index(&ty);
            provider.types.insert(index, ty);
        }

        for ty in snapshot.references {
            provider.index(&Arc::new(ty));
        }

        provider
    }

    /// Load a provider from a JSON snapshot
    ///
    /// # Errors
    /// Returns [`crate::Error::Snapshot`] if the JSON is not a valid snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: LibrarySnapshot = serde_json::from_str(json)?;
        Ok(Self::new(snapshot))
    }

    /// Load a provider from a JSON snapshot file
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read, or
    /// [`crate::Error::Snapshot`] if it is not a valid snapshot.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn index(&self, ty: &MetadataTypeRc) {
        self.types_by_fullname
            .entry(ty.fullname())
            .or_insert_with(|| Arc::clone(ty));
    }

    /// Number of defined types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True if the snapshot defines no types
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl MetadataProvider for SnapshotProvider {
    fn library(&self) -> LibraryInfo {
        self.library.clone()
    }

    fn exported_types(&self) -> Result<Vec<MetadataTypeRc>> {
        Ok(self
            .types
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect())
    }

    fn resolve(&self, qualified_name: &str) -> Result<Option<MetadataTypeRc>> {
        if let Some(entry) = self.types_by_fullname.get(qualified_name) {
            return Ok(Some(Arc::clone(entry.value())));
        }

        if let Some(prefix) = self
            .unresolvable
            .iter()
            .find(|prefix| qualified_name.starts_with(prefix.as_str()))
        {
            return Err(provider_error!(
                "Cannot resolve '{}' - the library providing '{}' could not be loaded",
                qualified_name,
                prefix
            ));
        }

        Ok(None)
    }
}
