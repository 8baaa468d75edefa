//! Metadata-to-stub translation engine.
//!
//! This module turns the exported types of a [`crate::metadata::MetadataProvider`] into
//! Python type stub text, one unit per namespace.
//!
//! # Architecture
//!
//! Components, leaves first:
//!
//! - [`mapper`] - [`TypeNameMapper`] converts type references into Python type expressions
//!   and records the imports a unit needs
//! - [`member`] - [`MemberRenderer`] renders constructors, methods, properties, fields and
//!   events, folding accessor pairs into properties
//! - [`renderer`] - [`TypeRenderer`] picks the rendering mode of a type and states its parent
//! - [`namespace`] - [`NamespaceTreeBuilder`] groups types into a [`NamespaceTree`]
//! - [`emitter`] - [`StubEmitter`] drives a run and isolates failures per namespace
//!
//! Rendering never fails on odd metadata. Unmappable types, unsupported shapes and accessor
//! collisions degrade locally and are recorded in the unit's diagnostics. Only provider
//! failures fail a namespace.
//!
//! # Examples
//!
//! ```rust
//! use dotstub::metadata::{LibrarySnapshot, MethodBuilder, SnapshotProvider, TypeBuilder};
//! use dotstub::stubs::{StubConfig, StubEmitter};
//!
//! let widget = TypeBuilder::class("Acme", "Widget")
//!     .constructor(MethodBuilder::constructor().param("count", "System.Int32"))
//!     .getter("Size", "System.Int32")
//!     .setter("Size", "System.Int32")
//!     .build()?;
//! let provider = SnapshotProvider::new(LibrarySnapshot::new("Acme").with_type(widget));
//!
//! let run = StubEmitter::new(&provider, StubConfig::default()).run()?;
//! let acme = run.unit("Acme").unwrap();
//! assert!(acme.text.contains("class Widget:"));
//! assert!(acme.text.contains("def __init__(self, count: int) -> None: ..."));
//! assert!(acme.text.contains("@Size.setter"));
//! # Ok::<(), dotstub::Error>(())
//! ```

/// Run configuration
pub mod config;
/// Per-namespace driver
pub mod emitter;
/// Type reference mapping
pub mod mapper;
/// Member rendering
pub mod member;
/// Namespace grouping
pub mod namespace;
/// Per-type rendering
pub mod renderer;

pub use config::StubConfig;
pub use emitter::{NamespaceStub, StubEmitter, StubRun, PREAMBLE};
pub use mapper::TypeNameMapper;
pub use member::{MemberRenderer, RenderedKind, RenderedMember};
pub use namespace::{NamespaceNode, NamespaceTree, NamespaceTreeBuilder};
pub use renderer::{RenderMode, RenderedType, TypeRenderer};
