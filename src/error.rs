use thiserror::Error;

macro_rules! provider_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Provider {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Provider {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Stub generation itself degrades locally: unmappable types, unsupported type shapes and
/// ambiguous accessors are recorded as [`crate::metadata::diagnostics::Diagnostic`] entries and
/// never surface here. What remains are failures of the collaborators around the engine: the
/// metadata provider, snapshot decoding and the file system.
///
/// # Error Categories
///
/// ## Provider Errors
/// - [`Error::Provider`] - The metadata source could not answer a query
/// - [`Error::TypeNotFound`] - A type that must exist is unknown to the provider
/// - [`Error::Namespace`] - A provider failure scoped to one namespace unit
///
/// ## I/O and External Errors
/// - [`Error::Snapshot`] - A JSON metadata snapshot could not be decoded
/// - [`Error::FileError`] - Filesystem I/O errors while writing stubs
///
/// # Examples
///
/// ```rust
/// use dotstub::{Error, metadata::SnapshotProvider};
///
/// match SnapshotProvider::from_json("{ not json") {
///     Ok(_) => println!("loaded"),
///     Err(Error::Snapshot(err)) => eprintln!("bad snapshot: {}", err),
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The metadata provider failed to answer a query.
    ///
    /// Raised for example when a referenced assembly cannot be resolved while the provider
    /// is asked about a base type. The error includes the source location where the failure
    /// was raised for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of the failed query
    /// * `file` - Source file where the error was raised
    /// * `line` - Source line where the error was raised
    #[error("Provider - {file}:{line}: {message}")]
    Provider {
        /// The message to be printed for the Provider error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Failed to find a type by its qualified name.
    #[error("Failed to find type - {0}")]
    TypeNotFound(String),

    /// Rendering of a single namespace unit failed.
    ///
    /// Other namespaces of the same run are unaffected; the emitter reports this error
    /// next to the units that were produced successfully.
    #[error("Namespace '{namespace}' could not be rendered - {source}")]
    Namespace {
        /// Dotted namespace whose unit failed
        namespace: String,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },

    /// A metadata snapshot could not be decoded.
    #[error("Invalid metadata snapshot - {0}")]
    Snapshot(#[from] serde_json::Error),

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while writing stub files
    /// or stamping a packaging manifest.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}

impl Error {
    /// Wraps this error into an [`Error::Namespace`] for the given namespace
    #[must_use]
    pub fn in_namespace(self, namespace: &str) -> Self {
        match self {
            Error::Namespace { .. } => self,
            other => Error::Namespace {
                namespace: namespace.to_string(),
                source: Box::new(other),
            },
        }
    }
}
