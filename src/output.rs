//! Destinations for rendered stubs.
//!
//! The engine produces [`NamespaceStub`] units and never touches storage itself. A
//! [`StubSink`] decides where each unit goes:
//!
//! - [`MemorySink`] keeps the text keyed by namespace, for tests and embedding
//! - [`DirectorySink`] writes a Python package tree, one `__init__.pyi` per namespace,
//!   optionally next to an `__init__.py` shim that loads the library through `clr`
//!
//! # Directory Layout
//!
//! ```text
//! <dest>/<prefix><root><postfix>/__init__.pyi            package root unit
//! <dest>/<prefix><root><postfix>/Acme/__init__.pyi
//! <dest>/<prefix><root><postfix>/Acme/Geometry/__init__.pyi
//! ```
//!
//! With [`OutputConfig::dest_is_root`] the units are written below `<dest>` directly.
//! Two namespaces that land in the same directory (`Acme.IO` and `Acme.Io` with
//! [`OutputConfig::fold_case`]) fail the second write instead of overwriting the first.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    stubs::emitter::{NamespaceStub, StubRun},
    Error, Result,
};

/// Receives the units of a run
pub trait StubSink {
    /// Called once before any unit of `run` is written.
    ///
    /// # Errors
    /// Returns an error if the sink cannot prepare its destination.
    fn begin(&mut self, _run: &StubRun) -> Result<()> {
        Ok(())
    }

    /// Store one unit.
    ///
    /// # Errors
    /// Returns an error if the unit cannot be stored.
    fn write_unit(&mut self, unit: &NamespaceStub) -> Result<()>;
}

impl StubRun {
    /// Hand every unit to `sink`, returning the number of units written.
    ///
    /// # Errors
    /// Returns the first error reported by the sink.
    pub fn write_to(&self, sink: &mut dyn StubSink) -> Result<usize> {
        sink.begin(self)?;
        for unit in &self.units {
            sink.write_unit(unit)?;
        }
        Ok(self.units.len())
    }
}

/// Keeps unit text in memory, keyed by dotted namespace
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    units: BTreeMap<String, String>,
}

impl MemorySink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the unit for `namespace`
    #[must_use]
    pub fn get(&self, namespace: &str) -> Option<&str> {
        self.units.get(namespace).map(String::as_str)
    }

    /// All units, sorted by namespace
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.units
            .iter()
            .map(|(namespace, text)| (namespace.as_str(), text.as_str()))
    }

    /// Number of stored units
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// True if nothing was stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl StubSink for MemorySink {
    fn write_unit(&mut self, unit: &NamespaceStub) -> Result<()> {
        self.units.insert(unit.namespace.clone(), unit.text.clone());
        Ok(())
    }
}

/// Layout options of a [`DirectorySink`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct OutputConfig {
    /// Prepended to the root namespace when naming the package directory
    pub prefix: String,
    /// Appended to the root namespace when naming the package directory
    pub postfix: String,
    /// Write below the destination directly instead of a package directory
    pub dest_is_root: bool,
    /// Lowercase directory names derived from namespaces
    pub fold_case: bool,
    /// Write `__init__.py` re-export shims next to the stubs
    pub write_shims: bool,
}

/// Writes units as a Python package tree
#[derive(Debug)]
pub struct DirectorySink {
    dest: PathBuf,
    config: OutputConfig,
    stub_root: PathBuf,
    location: Option<String>,
    written: Vec<PathBuf>,
    /// Unit directory -> namespace written there
    claimed: HashMap<PathBuf, String>,
}

impl DirectorySink {
    /// Create a sink writing below `dest`
    pub fn new(dest: impl Into<PathBuf>, config: OutputConfig) -> Self {
        let dest = dest.into();
        DirectorySink {
            stub_root: dest.clone(),
            dest,
            config,
            location: None,
            written: Vec::new(),
            claimed: HashMap::new(),
        }
    }

    /// Directory holding the package root unit, known after [`StubSink::begin`]
    #[must_use]
    pub fn stub_root(&self) -> &Path {
        &self.stub_root
    }

    /// Files written so far
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Packaging manifest next to the package directory
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.stub_root
            .parent()
            .unwrap_or(&self.stub_root)
            .join("setup.py")
    }

    fn segment(&self, segment: &str) -> String {
        if self.config.fold_case {
            segment.to_lowercase()
        } else {
            segment.to_string()
        }
    }

    fn unit_dir(&self, unit: &NamespaceStub) -> PathBuf {
        let mut dir = self.stub_root.clone();
        for segment in &unit.path {
            dir.push(self.segment(segment));
        }
        dir
    }

    fn write_file(&mut self, path: PathBuf, text: &str) -> Result<()> {
        fs::write(&path, text)?;
        debug!(path = %path.display(), bytes = text.len(), "stub file written");
        self.written.push(path);
        Ok(())
    }
}

impl StubSink for DirectorySink {
    fn begin(&mut self, run: &StubRun) -> Result<()> {
        self.stub_root = if self.config.dest_is_root {
            self.dest.clone()
        } else {
            let root = run.root_namespace.as_deref().unwrap_or(&run.library.name);
            let name = format!("{}{}{}", self.config.prefix, root, self.config.postfix);
            self.dest.join(self.segment(&name))
        };
        self.location.clone_from(&run.library.location);

        fs::create_dir_all(&self.stub_root)?;
        info!(path = %self.stub_root.display(), units = run.units.len(), "writing stubs");
        Ok(())
    }

    fn write_unit(&mut self, unit: &NamespaceStub) -> Result<()> {
        let dir = self.unit_dir(unit);
        if let Some(previous) = self.claimed.get(&dir) {
            if *previous != unit.namespace {
                warn!(
                    path = %dir.display(),
                    first = %previous,
                    second = %unit.namespace,
                    "namespaces share a directory"
                );
                return Err(Error::Error(format!(
                    "Namespaces '{previous}' and '{}' both map to {}",
                    unit.namespace,
                    dir.display()
                )));
            }
        }
        self.claimed.insert(dir.clone(), unit.namespace.clone());
        fs::create_dir_all(&dir)?;

        self.write_file(dir.join("__init__.pyi"), &unit.text)?;

        if self.config.write_shims && !unit.is_root() {
            if let Some(location) = self.location.clone() {
                let shim = format!(
                    "import clr\nclr.AddReference('{location}')\n\nfrom {} import *\n",
                    unit.namespace
                );
                self.write_file(dir.join("__init__.py"), &shim)?;
            }
        }

        Ok(())
    }
}

/// Rewrite every `version=` line of a `setup.py` style manifest to `version`.
///
/// Indentation and a trailing comma are kept. Returns `false` when the manifest does not
/// exist or holds no `version=` line.
///
/// # Errors
/// Returns [`crate::Error::FileError`] if the manifest cannot be read or written.
pub fn bump_manifest_version(path: &Path, version: &str) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }

    let contents = fs::read_to_string(path)?;
    let mut changed = false;
    let lines: Vec<String> = contents
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            if !trimmed.starts_with("version=") {
                return line.to_string();
            }

            changed = true;
            let indent = &line[..line.len() - line.trim_start().len()];
            let comma = if trimmed.ends_with(',') { "," } else { "" };
            format!("{indent}version=\"{version}\"{comma}")
        })
        .collect();

    if changed {
        let mut text = lines.join("\n");
        if contents.ends_with('\n') {
            text.push('\n');
        }
        fs::write(path, text)?;
        info!(path = %path.display(), version, "manifest version updated");
    }

    Ok(changed)
}
