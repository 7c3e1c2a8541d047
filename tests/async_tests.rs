//! Integration tests for the async pipeline with the Tokio runtime.

#![cfg(feature = "async")]

use std::path::Path;

use mapsmith::{
    AsyncBuildPipeline, BuildPipeline, Error, Packer, PackerStatus, Result, staging_path_for,
};
use tempfile::TempDir;

mod common;

use common::{BrokenPacker, StubPacker, create_archive};

#[tokio::test]
async fn test_async_unpack_and_pack() {
    let dir = TempDir::new().unwrap();
    let archive = create_archive(dir.path(), "coast.s5x");
    let pipeline = AsyncBuildPipeline::new(BuildPipeline::new(StubPacker::new()));

    assert!(pipeline.unpack(&archive).await.unwrap());
    let staging = staging_path_for(&archive);
    assert!(staging.is_dir());

    assert!(pipeline.pack(&staging).await.unwrap());
    assert!(archive.is_file());
}

#[tokio::test]
async fn test_async_clones_share_pipeline() {
    let dir = TempDir::new().unwrap();
    let first = create_archive(dir.path(), "first.s5x");
    let second = create_archive(dir.path(), "second.s5x");
    let pipeline = AsyncBuildPipeline::new(BuildPipeline::new(StubPacker::new()));
    let other = pipeline.clone();

    let (a, b) = tokio::join!(pipeline.unpack(&first), other.unpack(&second));
    assert!(a.unwrap());
    assert!(b.unwrap());
}

#[tokio::test]
async fn test_async_errors_propagate() {
    let dir = TempDir::new().unwrap();
    let archive = create_archive(dir.path(), "coast.s5x");

    let broken = AsyncBuildPipeline::new(BuildPipeline::new(BrokenPacker));
    let err = broken.unpack(&archive).await.unwrap_err();
    assert!(matches!(err, Error::PackerInvocation { .. }));

    let stub = AsyncBuildPipeline::new(BuildPipeline::new(StubPacker::new()));
    let err = stub
        .pack(dir.path().join("missing.s5x.unpacked"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidStaging { .. }));
}

/// Panics inside the blocking task.
struct PanickingPacker {
    executable: Option<&'static Path>,
}

impl Packer for PanickingPacker {
    fn invoke(&self, _target: &Path) -> Result<PackerStatus> {
        panic!("packer crashed");
    }

    fn executable(&self) -> Option<&Path> {
        self.executable
    }
}

#[tokio::test]
async fn test_async_panic_names_executable() {
    let dir = TempDir::new().unwrap();
    let archive = create_archive(dir.path(), "coast.s5x");
    let pipeline = AsyncBuildPipeline::new(BuildPipeline::new(PanickingPacker {
        executable: Some(Path::new("bin/bba5.sh")),
    }));

    let err = pipeline.unpack(&archive).await.unwrap_err();
    assert!(matches!(err, Error::PackerInvocation { .. }));
    assert_eq!(err.path(), Some(Path::new("bin/bba5.sh")));
}

#[tokio::test]
async fn test_async_panic_without_executable_names_target() {
    let dir = TempDir::new().unwrap();
    let archive = create_archive(dir.path(), "coast.s5x");
    let pipeline = AsyncBuildPipeline::new(BuildPipeline::new(PanickingPacker {
        executable: None,
    }));

    let err = pipeline.unpack(&archive).await.unwrap_err();
    assert!(matches!(err, Error::PackerInvocation { .. }));
    assert_eq!(err.path(), Some(archive.as_path()));
}
