//! Build pipeline integration tests.
//!
//! These run the unpack/inject/pack flow against stub packers on a scratch
//! directory.

use std::fs;

use mapsmith::{
    BuildPipeline, Error, ResourcePath, SCRIPT_LIBRARY_DEST, WorkingSet, WorkingSetState,
    inject_resource, prepare_for_unpack, staging_path_for,
};
use tempfile::TempDir;

mod common;

use common::{BrokenPacker, StubPacker, create_archive};

// =============================================================================
// Unpack
// =============================================================================

#[test]
fn test_unpack_creates_staging() {
    let dir = TempDir::new().unwrap();
    let archive = create_archive(dir.path(), "coast.s5x");
    let pipeline = BuildPipeline::new(StubPacker::new());

    let unpacked = pipeline.unpack(&archive).unwrap();
    assert!(unpacked);
    assert!(staging_path_for(&archive).is_dir());
    assert_eq!(pipeline.packer().calls()[0].target, archive);
}

#[test]
fn test_unpack_replaces_stale_staging() {
    let dir = TempDir::new().unwrap();
    let archive = create_archive(dir.path(), "coast.s5x");
    let staging = staging_path_for(&archive);
    fs::create_dir_all(staging.join("maps/externalmap")).unwrap();
    fs::write(staging.join("maps/externalmap/old.lua"), b"stale").unwrap();

    let pipeline = BuildPipeline::new(StubPacker::new());
    assert!(pipeline.unpack(&archive).unwrap());

    let calls = pipeline.packer().calls();
    assert!(!calls[0].output_existed, "staging must be gone before the packer runs");
    assert!(!staging.join("maps/externalmap/old.lua").exists());
    assert!(staging.join("info.xml").is_file());
}

#[test]
fn test_unpack_without_output_is_false() {
    let dir = TempDir::new().unwrap();
    let archive = create_archive(dir.path(), "coast.s5x");
    let pipeline = BuildPipeline::new(StubPacker::silent());

    assert!(!pipeline.unpack(&archive).unwrap());
    assert_eq!(pipeline.packer().calls().len(), 1);
}

#[test]
fn test_unpack_directory_archive_deletes_nothing() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("folder.s5x");
    fs::create_dir(&archive).unwrap();
    let staging = staging_path_for(&archive);
    fs::create_dir(&staging).unwrap();
    fs::write(staging.join("keep.txt"), b"keep").unwrap();

    let err = prepare_for_unpack(&archive).unwrap_err();
    assert!(matches!(err, Error::InvalidArchive { .. }));
    assert!(err.is_precondition());
    assert!(staging.join("keep.txt").is_file());

    let pipeline = BuildPipeline::new(StubPacker::new());
    assert!(pipeline.unpack(&archive).is_err());
    assert!(pipeline.packer().calls().is_empty());
}

#[test]
fn test_unpack_propagates_invocation_failure() {
    let dir = TempDir::new().unwrap();
    let archive = create_archive(dir.path(), "coast.s5x");
    let pipeline = BuildPipeline::new(BrokenPacker);

    let err = pipeline.unpack(&archive).unwrap_err();
    assert!(matches!(err, Error::PackerInvocation { .. }));
}

// =============================================================================
// Pack
// =============================================================================

#[test]
fn test_pack_removes_old_output_first() {
    let dir = TempDir::new().unwrap();
    let archive = create_archive(dir.path(), "coast.s5x");
    let pipeline = BuildPipeline::new(StubPacker::new());
    assert!(pipeline.unpack(&archive).unwrap());

    // The archive from before the unpack is still in place.
    assert!(archive.is_file());
    let staging = staging_path_for(&archive);
    assert!(pipeline.pack(&staging).unwrap());

    let calls = pipeline.packer().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].target, staging);
    assert!(!calls[1].output_existed, "old archive must be deleted before packing");
    assert_eq!(fs::read(&archive).unwrap(), b"BBA5\0packed");
}

#[test]
fn test_pack_keeps_staging_on_failure() {
    let dir = TempDir::new().unwrap();
    let archive = create_archive(dir.path(), "coast.s5x");
    let staging = staging_path_for(&archive);
    fs::create_dir(&staging).unwrap();

    let silent = BuildPipeline::new(StubPacker::silent());
    assert!(!silent.pack(&staging).unwrap());
    assert!(staging.is_dir());
    assert!(!archive.exists());

    let broken = BuildPipeline::new(BrokenPacker);
    assert!(broken.pack(&staging).is_err());
    assert!(staging.is_dir());
}

#[test]
fn test_pack_keeps_staging_on_success() {
    let dir = TempDir::new().unwrap();
    let archive = create_archive(dir.path(), "coast.s5x");
    let pipeline = BuildPipeline::new(StubPacker::new());
    assert!(pipeline.unpack(&archive).unwrap());

    let staging = staging_path_for(&archive);
    assert!(pipeline.pack(&staging).unwrap());
    assert!(staging.join("info.xml").is_file());
}

#[test]
fn test_pack_staging_with_trailing_separator() {
    let dir = TempDir::new().unwrap();
    let archive = create_archive(dir.path(), "coast.s5x");
    let pipeline = BuildPipeline::new(StubPacker::new());
    assert!(pipeline.unpack(&archive).unwrap());

    let mut staging = staging_path_for(&archive).into_os_string();
    staging.push("/");
    assert!(pipeline.pack(&staging).unwrap());
    assert_eq!(fs::read(&archive).unwrap(), b"BBA5\0packed");
}

#[test]
fn test_pack_missing_staging() {
    let dir = TempDir::new().unwrap();
    let pipeline = BuildPipeline::new(StubPacker::new());

    let err = pipeline
        .pack(dir.path().join("absent.s5x.unpacked"))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidStaging { reason: "does not exist", .. }));
    assert!(pipeline.packer().calls().is_empty());
}

#[test]
fn test_pack_requires_staging_suffix() {
    let dir = TempDir::new().unwrap();
    let plain = dir.path().join("plain");
    fs::create_dir(&plain).unwrap();

    let pipeline = BuildPipeline::new(StubPacker::new());
    let err = pipeline.pack(&plain).unwrap_err();
    assert!(matches!(err, Error::InvalidStaging { .. }));
}

#[test]
fn test_pack_with_resources() {
    let dir = TempDir::new().unwrap();
    let archive = create_archive(dir.path(), "coast.s5x");
    let set = WorkingSet::new(&archive);
    let pipeline = BuildPipeline::new(StubPacker::new());
    assert!(pipeline.unpack(set.archive_path()).unwrap());

    let qsb = ResourcePath::new(SCRIPT_LIBRARY_DEST).unwrap();
    let script = ResourcePath::new("maps/externalmap/mapscript.lua").unwrap();
    let packed = pipeline
        .pack_with_resources(
            set.staging_path(),
            [(qsb.clone(), b"-- qsb".to_vec()), (script.clone(), b"-- script".to_vec())],
        )
        .unwrap();

    assert!(packed);
    assert_eq!(fs::read(set.resource_location(&qsb)).unwrap(), b"-- qsb");
    assert_eq!(fs::read(set.resource_location(&script)).unwrap(), b"-- script");
}

#[test]
fn test_pack_with_resources_needs_existing_staging() {
    let dir = TempDir::new().unwrap();
    let staging = dir.path().join("coast.s5x.unpacked");
    let pipeline = BuildPipeline::new(StubPacker::new());

    let qsb = ResourcePath::new(SCRIPT_LIBRARY_DEST).unwrap();
    let err = pipeline
        .pack_with_resources(&staging, [(qsb, b"-- qsb".to_vec())])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidStaging { .. }));
    assert!(!staging.exists());
}

// =============================================================================
// Injection
// =============================================================================

#[test]
fn test_inject_twice_keeps_second_content() {
    let dir = TempDir::new().unwrap();
    let staging = dir.path().join("coast.s5x.unpacked");
    fs::create_dir(&staging).unwrap();
    let dest = ResourcePath::new(SCRIPT_LIBRARY_DEST).unwrap();

    inject_resource(&staging, &b"first version, longer"[..], &dest).unwrap();
    inject_resource(&staging, &b"second"[..], &dest).unwrap();

    let parent = staging.join("maps/externalmap");
    let entries: Vec<_> = fs::read_dir(&parent).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(fs::read(parent.join("qsb.lua")).unwrap(), b"second");
}

#[test]
fn test_inject_onto_directory_fails() {
    let dir = TempDir::new().unwrap();
    let staging = dir.path().join("coast.s5x.unpacked");
    fs::create_dir_all(staging.join("maps/externalmap/qsb.lua")).unwrap();
    let dest = ResourcePath::new(SCRIPT_LIBRARY_DEST).unwrap();

    let err = inject_resource(&staging, &b"x"[..], &dest).unwrap_err();
    assert!(matches!(err, Error::ResourceInjection { .. }));
    assert!(err.is_filesystem());
}

// =============================================================================
// Working set lifecycle
// =============================================================================

#[test]
fn test_working_set_lifecycle() {
    let dir = TempDir::new().unwrap();
    let archive = create_archive(dir.path(), "coast.s5x");
    let set = WorkingSet::new(&archive);
    let pipeline = BuildPipeline::new(StubPacker::new());

    let mut state = WorkingSetState::default();
    state = state.after_unpack(&pipeline.unpack(set.archive_path()));
    assert_eq!(state, WorkingSetState::Unpacked);
    assert!(set.is_unpacked());

    let dest = ResourcePath::new(SCRIPT_LIBRARY_DEST).unwrap();
    inject_resource(set.staging_path(), &b"-- qsb"[..], &dest).unwrap();
    state = state.after_edit();
    assert_eq!(state, WorkingSetState::Modified);

    state = state.after_pack(&pipeline.pack(set.staging_path()));
    assert_eq!(state, WorkingSetState::Packed);

    // Packing again from Packed is allowed.
    state = state.after_pack(&pipeline.pack(set.staging_path()));
    assert_eq!(state, WorkingSetState::Packed);
}
