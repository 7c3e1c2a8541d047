//! Archive build pipeline.
//!
//! [`BuildPipeline`] combines the staging functions with a [`Packer`] into
//! the two operations the editor needs: [`unpack`](BuildPipeline::unpack) an
//! archive into its staging directory, and [`pack`](BuildPipeline::pack) a
//! staging directory back into an archive.
//!
//! Success is judged by what exists on disk after the packer ran, never by
//! its exit status alone. A `false` result means the tool ran but produced
//! nothing usable.
//!
//! # Example
//!
//! ```rust,no_run
//! use mapsmith::{BuildPipeline, PackerOptions, ResourcePath, WorkingSet};
//!
//! let pipeline = BuildPipeline::external(PackerOptions::new().tool_dir("/opt/editor"));
//! let set = WorkingSet::new("maps/coast.s5x");
//!
//! if pipeline.unpack(set.archive_path())? {
//!     let qsb = ResourcePath::new("maps/externalmap/qsb.lua")?;
//!     let packed = pipeline.pack_with_resources(set.staging_path(), [(qsb, b"-- qsb".to_vec())])?;
//!     println!("packed: {}", packed);
//! }
//! # Ok::<(), mapsmith::Error>(())
//! ```

use std::path::Path;

use serde::Serialize;

use crate::packer::{ExternalPacker, Packer, PackerOptions};
use crate::staging::{self, inject_resource};
use crate::{ResourcePath, Result};

/// Unpacks and packs map archives with a [`Packer`].
#[derive(Debug, Clone)]
pub struct BuildPipeline<P> {
    packer: P,
}

impl BuildPipeline<ExternalPacker> {
    /// Creates a pipeline running the external packer.
    pub fn external(options: PackerOptions) -> Self {
        Self::new(ExternalPacker::new(&options))
    }
}

impl<P: Packer> BuildPipeline<P> {
    /// Creates a pipeline around `packer`.
    pub fn new(packer: P) -> Self {
        Self { packer }
    }

    /// Returns the packer.
    pub fn packer(&self) -> &P {
        &self.packer
    }

    /// Unpacks `archive` into its staging directory.
    ///
    /// A stale staging directory is removed first. Returns whether the
    /// staging directory exists after the packer ran.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::InvalidArchive`](crate::Error::InvalidArchive),
    /// [`Error::StagingCleanup`](crate::Error::StagingCleanup) and
    /// [`Error::PackerInvocation`](crate::Error::PackerInvocation).
    pub fn unpack(&self, archive: impl AsRef<Path>) -> Result<bool> {
        let archive = archive.as_ref();
        let staging = staging::prepare_for_unpack(archive)?;
        let status = self.packer.invoke(archive)?;

        let unpacked = staging.is_dir();
        log::info!(
            "Unpack of {} finished (exit code {:?}, staging present: {})",
            archive.display(),
            status.code(),
            unpacked
        );
        Ok(unpacked)
    }

    /// Packs `staging` into the archive it was unpacked from.
    ///
    /// An existing output archive is removed first. The staging directory is
    /// kept in every case so a failed pack can be retried. Returns whether the
    /// output archive exists after the packer ran.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::InvalidStaging`](crate::Error::InvalidStaging),
    /// [`Error::StagingCleanup`](crate::Error::StagingCleanup) and
    /// [`Error::PackerInvocation`](crate::Error::PackerInvocation).
    pub fn pack(&self, staging: impl AsRef<Path>) -> Result<bool> {
        let staging = staging.as_ref();
        let output = staging::prepare_for_pack(staging)?;
        let status = self.packer.invoke(staging)?;

        let packed = output.is_file();
        log::info!(
            "Pack of {} finished (exit code {:?}, archive present: {})",
            staging.display(),
            status.code(),
            packed
        );
        Ok(packed)
    }

    /// Injects `resources` into `staging`, then packs it.
    ///
    /// The staging directory must already exist. Injection stops at the
    /// first failure, before the packer runs.
    pub fn pack_with_resources<I>(&self, staging: impl AsRef<Path>, resources: I) -> Result<bool>
    where
        I: IntoIterator<Item = (ResourcePath, Vec<u8>)>,
    {
        let staging = staging.as_ref();
        staging::require_staging_dir(staging)?;
        for (dest, content) in resources {
            inject_resource(staging, content.as_slice(), &dest)?;
        }
        self.pack(staging)
    }
}

/// Lifecycle of an archive working set, as seen by the editor.
///
/// ```text
/// Unselected --unpack--> Unpacked --edit--> Modified --pack--> Packed
/// ```
///
/// A failed or `false` unpack stays in `Unselected`; a failed or `false` pack
/// stays in `Modified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkingSetState {
    /// No usable staging directory.
    #[default]
    Unselected,
    /// Freshly unpacked.
    Unpacked,
    /// Edited or extended since the last unpack or pack.
    Modified,
    /// Packed into an archive.
    Packed,
}

impl WorkingSetState {
    /// Applies the outcome of an unpack.
    ///
    /// Any successful unpack starts a fresh working set; otherwise the
    /// archive is treated as unusable.
    pub fn after_unpack(self, outcome: &Result<bool>) -> Self {
        match outcome {
            Ok(true) => WorkingSetState::Unpacked,
            _ => WorkingSetState::Unselected,
        }
    }

    /// Applies an edit or resource injection.
    ///
    /// Edits without an unpacked working set have nothing to modify.
    pub fn after_edit(self) -> Self {
        match self {
            WorkingSetState::Unselected => WorkingSetState::Unselected,
            _ => WorkingSetState::Modified,
        }
    }

    /// Applies the outcome of a pack.
    pub fn after_pack(self, outcome: &Result<bool>) -> Self {
        match (self, outcome) {
            (WorkingSetState::Unselected, _) => WorkingSetState::Unselected,
            (_, Ok(true)) => WorkingSetState::Packed,
            _ => WorkingSetState::Modified,
        }
    }

    /// Returns true when the editing surfaces should be enabled.
    pub fn is_editable(self) -> bool {
        self != WorkingSetState::Unselected
    }
}
