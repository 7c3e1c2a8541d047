//! Async wrapper around the build pipeline.
//!
//! Packer runs block for as long as the external tool needs. An interactive
//! front end awaits these futures instead; the blocking work runs on Tokio's
//! blocking thread pool and nothing is locked while it waits.
//!
//! Runs cannot be cancelled. Dropping a future leaves the packer running to
//! completion in the background.
//!
//! ```rust,ignore
//! use mapsmith::{AsyncBuildPipeline, PackerOptions};
//!
//! #[tokio::main]
//! async fn main() -> mapsmith::Result<()> {
//!     let pipeline = AsyncBuildPipeline::external(PackerOptions::new());
//!     if pipeline.unpack("maps/coast.s5x").await? {
//!         println!("ready to edit");
//!     }
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::packer::{ExternalPacker, Packer, PackerOptions};
use crate::pipeline::BuildPipeline;
use crate::{Error, Result};

/// A [`BuildPipeline`] whose operations run on the blocking thread pool.
#[derive(Debug)]
pub struct AsyncBuildPipeline<P> {
    inner: Arc<BuildPipeline<P>>,
}

impl<P> Clone for AsyncBuildPipeline<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl AsyncBuildPipeline<ExternalPacker> {
    /// Creates an async pipeline running the external packer.
    pub fn external(options: PackerOptions) -> Self {
        Self::new(BuildPipeline::external(options))
    }
}

impl<P> AsyncBuildPipeline<P>
where
    P: Packer + Send + Sync + 'static,
{
    /// Wraps a blocking pipeline.
    pub fn new(pipeline: BuildPipeline<P>) -> Self {
        Self {
            inner: Arc::new(pipeline),
        }
    }

    /// Async version of [`BuildPipeline::unpack`].
    pub async fn unpack(&self, archive: impl Into<PathBuf>) -> Result<bool> {
        let archive = archive.into();
        let pipeline = Arc::clone(&self.inner);
        let target = archive.clone();
        tokio::task::spawn_blocking(move || pipeline.unpack(&archive))
            .await
            .map_err(|e| self.join_error(target, e))?
    }

    /// Async version of [`BuildPipeline::pack`].
    pub async fn pack(&self, staging: impl Into<PathBuf>) -> Result<bool> {
        let staging = staging.into();
        let pipeline = Arc::clone(&self.inner);
        let target = staging.clone();
        tokio::task::spawn_blocking(move || pipeline.pack(&staging))
            .await
            .map_err(|e| self.join_error(target, e))?
    }

    /// Maps a panicked or cancelled blocking task to `PackerInvocation`.
    ///
    /// The error names the packer's executable; packers that run no
    /// executable are named by the path they were working on.
    fn join_error(&self, target: PathBuf, e: tokio::task::JoinError) -> Error {
        let program = self
            .inner
            .packer()
            .executable()
            .map(Path::to_path_buf)
            .unwrap_or(target);
        Error::PackerInvocation {
            program,
            source: std::io::Error::other(e),
        }
    }
}
