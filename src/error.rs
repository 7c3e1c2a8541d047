//! Error types for map archive and mission settings operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes of the build pipeline and the settings store, along with a
//! convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. A pipeline
//! operation that ran the external tool but produced no output is *not* an
//! error: [`BuildPipeline::unpack`] and [`BuildPipeline::pack`] report that
//! through their `bool` result.
//!
//! ```rust,no_run
//! use mapsmith::{BuildPipeline, Error, PackerOptions};
//!
//! fn open_map(path: &str) -> mapsmith::Result<bool> {
//!     let pipeline = BuildPipeline::external(PackerOptions::new());
//!     match pipeline.unpack(path) {
//!         Ok(true) => Ok(true),
//!         Ok(false) => {
//!             eprintln!("The packer produced no staging directory for {}", path);
//!             Ok(false)
//!         }
//!         Err(Error::InvalidArchive { path, reason }) => {
//!             eprintln!("Not a map archive: {} ({})", path.display(), reason);
//!             Ok(false)
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```
//!
//! [`BuildPipeline::unpack`]: crate::BuildPipeline::unpack
//! [`BuildPipeline::pack`]: crate::BuildPipeline::pack

use std::io;
use std::path::{Path, PathBuf};

use crate::settings::TechList;

/// The main error type for archive and settings operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | Preconditions | [`InvalidArchive`][Self::InvalidArchive], [`InvalidStaging`][Self::InvalidStaging], [`InvalidResourcePath`][Self::InvalidResourcePath] | Wrong path shape |
/// | Filesystem | [`StagingCleanup`][Self::StagingCleanup], [`ResourceInjection`][Self::ResourceInjection] | Delete or write failed |
/// | Process | [`PackerInvocation`][Self::PackerInvocation] | Packer could not run |
/// | Settings | [`SettingsLoad`][Self::SettingsLoad], [`SettingsSave`][Self::SettingsSave] | Document shape or I/O |
/// | Editing | [`InvalidTransition`][Self::InvalidTransition] | Technology not in source list |
/// | Document | [`DocumentParse`][Self::DocumentParse], [`DocumentSerialize`][Self::DocumentSerialize] | JSON syntax |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An unanticipated I/O error from a lower layer.
    ///
    /// Expected filesystem failures are reported through the dedicated
    /// variants below; this one only covers faults outside of them.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The selected archive path cannot be unpacked.
    ///
    /// A packed map archive is a single opaque file, so this is returned when
    /// the path does not exist or names a directory.
    #[error("Invalid map archive {}: {reason}", path.display())]
    InvalidArchive {
        /// The offending archive path.
        path: PathBuf,
        /// Why the path was rejected.
        reason: &'static str,
    },

    /// The staging directory cannot be packed.
    #[error("Invalid staging directory {}: {reason}", path.display())]
    InvalidStaging {
        /// The offending staging path.
        path: PathBuf,
        /// Why the path was rejected.
        reason: &'static str,
    },

    /// Deleting a stale staging tree or packed output failed.
    ///
    /// Deletion stops at the first failure; entries not yet visited are left
    /// in place.
    #[error("Failed to clean up {}: {source}", path.display())]
    StagingCleanup {
        /// The entry that could not be removed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing a resource into the staging tree failed.
    #[error("Failed to inject resource at {}: {source}", path.display())]
    ResourceInjection {
        /// The destination that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The external packer could not be started, or relaying its output
    /// failed.
    ///
    /// A non-zero exit status is not reported through this variant.
    #[error("Failed to run packer {}: {source}", program.display())]
    PackerInvocation {
        /// The packer executable.
        program: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The mission settings document could not be loaded.
    #[error("Failed to load mission settings from {}: {reason}", path.display())]
    SettingsLoad {
        /// The settings file.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// The in-memory settings could not be serialized or written.
    #[error("Failed to save mission settings field {field}: {reason}")]
    SettingsSave {
        /// The document field that failed, e.g. `StartResources[2]`.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A technology move named an identifier missing from the source list.
    #[error("Technology '{id}' cannot move from {from} to {to}: not in {from}")]
    InvalidTransition {
        /// The technology identifier.
        id: String,
        /// The list it was expected in.
        from: TechList,
        /// The requested destination list.
        to: TechList,
    },

    /// The document is not valid JSON or not an array of records.
    #[error("Invalid settings document: {0}")]
    DocumentParse(String),

    /// The document could not be serialized.
    #[error("Failed to serialize settings document: {0}")]
    DocumentSerialize(String),

    /// A resource destination path failed validation.
    #[error("Invalid resource path: {0}")]
    InvalidResourcePath(String),
}

impl Error {
    /// Returns `true` if the error is a precondition violation on a path.
    ///
    /// These errors are raised before anything on disk is touched.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::InvalidArchive { .. }
                | Error::InvalidStaging { .. }
                | Error::InvalidResourcePath(_)
        )
    }

    /// Returns `true` if the error is a filesystem fault during cleanup or
    /// injection.
    pub fn is_filesystem(&self) -> bool {
        matches!(
            self,
            Error::StagingCleanup { .. } | Error::ResourceInjection { .. } | Error::Io(_)
        )
    }

    /// Returns `true` if the error came from the settings store.
    pub fn is_settings(&self) -> bool {
        matches!(
            self,
            Error::SettingsLoad { .. }
                | Error::SettingsSave { .. }
                | Error::InvalidTransition { .. }
                | Error::DocumentParse(_)
                | Error::DocumentSerialize(_)
        )
    }

    /// Returns the filesystem path associated with this error, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::InvalidArchive { path, .. }
            | Error::InvalidStaging { path, .. }
            | Error::StagingCleanup { path, .. }
            | Error::ResourceInjection { path, .. }
            | Error::SettingsLoad { path, .. } => Some(path),
            Error::PackerInvocation { program, .. } => Some(program),
            _ => None,
        }
    }

    pub(crate) fn settings_load(path: &Path, reason: impl Into<String>) -> Self {
        Error::SettingsLoad {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn settings_save(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::SettingsSave {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
