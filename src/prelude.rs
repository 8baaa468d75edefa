//! # dotstub Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dotstub library. Import this module to get quick access to everything needed to
//! describe a library and render its stubs.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotstub operations
pub use crate::Error;

/// The result type used throughout dotstub
pub use crate::Result;

// ================================================================================================
// Metadata Model
// ================================================================================================

/// Types, members and parameters
pub use crate::metadata::{
    AccessorKind, EnumValue, Member, MetadataEvent, MetadataField, MetadataMethod,
    MetadataProperty, MetadataType, MetadataTypeRc, ParamDirection, Parameter, TypeKind,
};

/// Type references and literal data
pub use crate::metadata::{ConstantValue, PrimitiveKind, TypeSignature};

/// Attribute flags
pub use crate::metadata::{FieldAttributes, MethodAttributes, ParamAttributes, TypeAttributes};

/// Fluent construction of types
pub use crate::metadata::{MethodBuilder, TypeBuilder};

// ================================================================================================
// Metadata Providers
// ================================================================================================

/// Provider boundary and the snapshot provider
pub use crate::metadata::{LibraryInfo, LibrarySnapshot, MetadataProvider, SnapshotProvider};

/// Diagnostics recorded while rendering
pub use crate::metadata::diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics,
};

// ================================================================================================
// Stub Generation
// ================================================================================================

/// Engine entry points and results
pub use crate::stubs::{NamespaceStub, StubConfig, StubEmitter, StubRun};

/// Lower-level engine components
pub use crate::stubs::{
    MemberRenderer, NamespaceTree, NamespaceTreeBuilder, RenderMode, RenderedType,
    TypeNameMapper, TypeRenderer,
};

// ================================================================================================
// Output
// ================================================================================================

/// Stub sinks and packaging helpers
pub use crate::output::{
    bump_manifest_version, DirectorySink, MemorySink, OutputConfig, StubSink,
};
