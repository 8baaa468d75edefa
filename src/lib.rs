// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # dotstub
//!
//! Generates Python type stubs (`.pyi`) from the metadata of a compiled .NET library, so
//! that code driving the library through pythonnet gets completion and static type checks
//! without re-implementing it.
//!
//! ## Features
//!
//! - **Namespace packages** - One stub unit per namespace, with `__all__` manifests listing
//!   the child namespaces
//! - **Faithful signatures** - Overloads, `out`/`ref` parameters folded into tuple returns,
//!   default values, static members and interfaces as abstract classes
//! - **Property synthesis** - Accessor method pairs become one Python property
//! - **Type mapping** - Primitives, arrays and the common generic collections and delegates
//!   map to `typing` constructs
//! - **Local degradation** - Odd metadata never aborts a run; every compromise is recorded
//!   as a diagnostic of its namespace
//! - **Parallel rendering** - Namespaces render independently on the rayon thread pool
//!
//! ## Quick Start
//!
//! ```rust
//! use dotstub::prelude::*;
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
//! let provider = SnapshotProvider::new(LibrarySnapshot::new("Acme").with_type(io));
//!
//! let run = StubEmitter::new(&provider, StubConfig::default()).run()?;
//! let text = &run.unit("Acme").unwrap().text;
//! assert!(text.contains("def TryParse(value: str) -> Tuple[bool, int]: ..."));
//! # Ok::<(), dotstub::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - The read-only metadata model and the [`metadata::MetadataProvider`]
//!   boundary, with an in-memory provider loadable from JSON snapshots
//! - [`stubs`] - The translation engine: type mapping, member and type rendering,
//!   namespace grouping and the per-namespace driver
//! - [`output`] - Sinks writing units to memory or to a Python package tree
//!
//! ## Logging
//!
//! The crate emits `tracing` events at its decision points (skipped types and members,
//! unmappable references, provider failures, per-namespace timing). It never installs a
//! subscriber; that is left to the application.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dotstub::prelude::*;
///
/// let provider = SnapshotProvider::new(LibrarySnapshot::new("Empty"));
/// let run = StubEmitter::new(&provider, StubConfig::default()).run()?;
/// assert!(run.is_complete());
/// # Ok::<(), dotstub::Error>(())
/// ```
pub mod prelude;

/// Metadata model and provider boundary
///
/// Types, members, parameters and flags as a passive, read-only view of a library, plus the
/// [`metadata::MetadataProvider`] trait the engine queries and the
/// [`metadata::SnapshotProvider`] serving in-memory or JSON snapshots.
pub mod metadata;

/// Metadata-to-stub translation engine
pub mod stubs;

/// Stub sinks and packaging helpers
///
/// Where rendered units go: [`output::MemorySink`], [`output::DirectorySink`] and the
/// `setup.py` version stamping in [`output::bump_manifest_version`].
pub mod output;

/// `dotstub` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
///
/// # Examples
///
/// ```rust,no_run
/// use dotstub::{metadata::SnapshotProvider, Result};
///
/// fn load(path: &str) -> Result<SnapshotProvider> {
///     SnapshotProvider::from_file(std::path::Path::new(path))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `dotstub` Error type
///
/// The main error type for all operations in this crate. Rendering degradations are
/// diagnostics, not errors; see [`metadata::diagnostics`].
///
/// # Examples
///
/// ```rust
/// use dotstub::{prelude::*, Error};
///
/// let provider = SnapshotProvider::new(LibrarySnapshot::new("Acme"));
/// let run = StubEmitter::new(&provider, StubConfig::default()).run()?;
/// for failure in &run.failures {
///     if let Error::Namespace { namespace, source } = failure {
///         eprintln!("{namespace}: {source}");
///     }
/// }
/// # Ok::<(), dotstub::Error>(())
/// ```
pub use error::Error;
