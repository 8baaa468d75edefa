//! Metadata model and provider boundary.
//!
//! This module describes what the stub engine reads: exported types with their members,
//! parameters, flags and inheritance, as a passive read-only view. It does not load
//! binaries; metadata comes from a [`MetadataProvider`] such as the in-memory
//! [`SnapshotProvider`].
//!
//! # Key Components
//!
//! - [`attributes`] - ECMA-335 flag sets for types, methods, fields and parameters
//! - [`primitives`] - Primitive kinds and literal constant data
//! - [`signature`] - Type references in member signatures, with a textual form
//! - [`types`] - Types, members and parameters
//! - [`builder`] - Fluent construction of types in code
//! - [`provider`] - The provider trait and the snapshot provider
//! - [`diagnostics`] - Local degradations recorded while rendering
//!
//! # Examples
//!
//! ```rust
//! use dotstub::metadata::{MethodBuilder, TypeBuilder, TypeKind};
//!
//! let io = TypeBuilder::class("Acme", "Io")
//!     .method(
//!         MethodBuilder::new("TryParse")
//!             .static_method()
//!             .param("value", "System.String")
//!             .out_param("result", "System.Int32")
//!             .returns("System.Boolean"),
//!     )
//!     .build()?;
//!
//! assert_eq!(io.kind, TypeKind::Class);
//! assert_eq!(io.methods[0].output_params().count(), 1);
//! # Ok::<(), dotstub::Error>(())
//! ```

/// ECMA-335 attribute flags
pub mod attributes;
/// Fluent builders for types and methods
pub mod builder;
/// Diagnostics collected while rendering
pub mod diagnostics;
/// Primitive kinds and constants
pub mod primitives;
/// Provider trait and snapshot provider
pub mod provider;
/// Type references in signatures
pub mod signature;
/// Types, members and parameters
pub mod types;

pub use attributes::{
    FieldAttributes, MemberAccess, MethodAttributes, ParamAttributes, TypeAttributes,
};
pub use builder::{MethodBuilder, TypeBuilder};
pub use primitives::{ConstantValue, PrimitiveKind};
pub use provider::{LibraryInfo, LibrarySnapshot, MetadataProvider, SnapshotProvider};
pub use signature::TypeSignature;
pub use types::{
    AccessorKind, EnumValue, Member, MetadataEvent, MetadataField, MetadataMethod,
    MetadataProperty, MetadataType, MetadataTypeRc, ParamDirection, Parameter, TypeKind,
};
