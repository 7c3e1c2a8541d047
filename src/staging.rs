//! Staging directory management.
//!
//! A map archive `foo.s5x` is unpacked by the external packer into the
//! staging directory `foo.s5x.unpacked`, where its files can be edited and
//! extended. Packing the staging directory produces `foo.s5x` again.
//!
//! The functions here prepare the filesystem on both sides of a packer run
//! and merge generated resources into a staging tree. State lives entirely on
//! disk between calls.

use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{Error, ResourcePath, Result};

/// Suffix appended to an archive path to name its staging directory.
pub const STAGING_SUFFIX: &str = ".unpacked";

/// File extension of packed map archives.
pub const MAP_ARCHIVE_EXTENSION: &str = "s5x";

/// Staging-relative destination of the bundled script library.
pub const SCRIPT_LIBRARY_DEST: &str = "maps/externalmap/qsb.lua";

/// Returns true if `path` has the map archive extension (case-insensitive).
pub fn is_map_archive(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MAP_ARCHIVE_EXTENSION))
}

/// Returns the staging directory path for an archive.
pub fn staging_path_for(archive: impl AsRef<Path>) -> PathBuf {
    let mut staging = OsString::from(archive.as_ref().as_os_str());
    staging.push(STAGING_SUFFIX);
    PathBuf::from(staging)
}

/// Returns the packed output path for a staging directory.
///
/// Only the final component is inspected, so trailing separators and
/// non-UTF-8 names are accepted.
///
/// # Errors
///
/// Returns [`Error::InvalidStaging`] if the path does not end with
/// [`STAGING_SUFFIX`].
pub fn packed_output_path_for(staging: impl AsRef<Path>) -> Result<PathBuf> {
    let staging = staging.as_ref();
    let stripped = staging
        .file_name()
        .and_then(|name| strip_os_suffix(name, STAGING_SUFFIX))
        .filter(|name| !name.is_empty());

    match stripped {
        Some(name) => Ok(staging.with_file_name(name)),
        None => Err(Error::InvalidStaging {
            path: staging.to_path_buf(),
            reason: "name does not end with .unpacked",
        }),
    }
}

#[cfg(unix)]
fn strip_os_suffix(name: &OsStr, suffix: &str) -> Option<OsString> {
    use std::os::unix::ffi::OsStrExt;

    name.as_bytes()
        .strip_suffix(suffix.as_bytes())
        .map(|prefix| OsStr::from_bytes(prefix).to_os_string())
}

#[cfg(windows)]
fn strip_os_suffix(name: &OsStr, suffix: &str) -> Option<OsString> {
    use std::os::windows::ffi::{OsStrExt, OsStringExt};

    let name: Vec<u16> = name.encode_wide().collect();
    let suffix: Vec<u16> = suffix.encode_utf16().collect();
    name.strip_suffix(suffix.as_slice()).map(OsString::from_wide)
}

#[cfg(not(any(unix, windows)))]
fn strip_os_suffix(name: &OsStr, suffix: &str) -> Option<OsString> {
    name.to_str()?.strip_suffix(suffix).map(OsString::from)
}

/// An archive selected for editing, with its derived paths.
///
/// ```
/// use mapsmith::WorkingSet;
/// use std::path::Path;
///
/// let set = WorkingSet::new("maps/coast.s5x");
/// assert_eq!(set.staging_path(), Path::new("maps/coast.s5x.unpacked"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingSet {
    archive: PathBuf,
    staging: PathBuf,
}

impl WorkingSet {
    /// Creates the working set for an archive path.
    pub fn new(archive: impl Into<PathBuf>) -> Self {
        let archive = archive.into();
        let staging = staging_path_for(&archive);
        Self { archive, staging }
    }

    /// Creates the working set from an existing staging directory path.
    pub fn from_staging(staging: impl AsRef<Path>) -> Result<Self> {
        let archive = packed_output_path_for(staging.as_ref())?;
        Ok(Self {
            archive,
            staging: staging.as_ref().to_path_buf(),
        })
    }

    /// Returns the packed archive path.
    pub fn archive_path(&self) -> &Path {
        &self.archive
    }

    /// Returns the staging directory path.
    pub fn staging_path(&self) -> &Path {
        &self.staging
    }

    /// Returns true if the staging directory exists.
    pub fn is_unpacked(&self) -> bool {
        self.staging.is_dir()
    }

    /// Returns the on-disk location of a resource inside the staging tree.
    pub fn resource_location(&self, dest: &ResourcePath) -> PathBuf {
        self.staging.join(dest.to_relative_path())
    }
}

/// Prepares an unpack of `archive`.
///
/// The archive must exist and must not be a directory; this is checked before
/// anything is deleted. A stale staging directory is then removed
/// recursively, children before parents. Returns the staging path.
///
/// # Errors
///
/// - [`Error::InvalidArchive`] if `archive` is missing or a directory.
/// - [`Error::StagingCleanup`] for the first entry that cannot be removed;
///   entries not yet visited are left in place.
pub fn prepare_for_unpack(archive: impl AsRef<Path>) -> Result<PathBuf> {
    let archive = archive.as_ref();

    match fs::metadata(archive) {
        Ok(meta) if meta.is_dir() => {
            return Err(Error::InvalidArchive {
                path: archive.to_path_buf(),
                reason: "is a directory",
            });
        }
        Ok(_) => {}
        Err(_) => {
            return Err(Error::InvalidArchive {
                path: archive.to_path_buf(),
                reason: "does not exist",
            });
        }
    }

    let staging = staging_path_for(archive);
    if fs::symlink_metadata(&staging).is_ok() {
        log::info!("Deleting unpacked {}", staging.display());
        remove_tree(&staging)?;
    }
    Ok(staging)
}

/// Removes `root` and everything below it, deepest entries first.
///
/// A symlinked `root` is removed as a link; its target is left alone.
fn remove_tree(root: &Path) -> Result<()> {
    let walker = WalkDir::new(root)
        .contents_first(true)
        .follow_links(false)
        .follow_root_links(false);
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            Error::StagingCleanup {
                path,
                source: e.into_io_error().unwrap_or_else(|| io::Error::other("filesystem loop")),
            }
        })?;

        let path = entry.path();
        log::debug!("Deleting {}", path.display());
        let removed = if entry.file_type().is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };
        removed.map_err(|source| Error::StagingCleanup {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

pub(crate) fn require_staging_dir(staging: &Path) -> Result<()> {
    if staging.is_dir() {
        return Ok(());
    }
    Err(Error::InvalidStaging {
        path: staging.to_path_buf(),
        reason: if staging.exists() {
            "is not a directory"
        } else {
            "does not exist"
        },
    })
}

/// Prepares a pack of `staging`.
///
/// The staging path must be an existing directory. A previously packed
/// output at the derived path is deleted (a single file, not recursively) so
/// the packer never merges into stale output. Returns the output path.
///
/// # Errors
///
/// - [`Error::InvalidStaging`] if `staging` is missing, not a directory, or
///   not named with [`STAGING_SUFFIX`].
/// - [`Error::StagingCleanup`] if the old output cannot be deleted.
pub fn prepare_for_pack(staging: impl AsRef<Path>) -> Result<PathBuf> {
    let staging = staging.as_ref();
    require_staging_dir(staging)?;

    let output = packed_output_path_for(staging)?;
    if fs::symlink_metadata(&output).is_ok() {
        log::info!("Deleting old version {}", output.display());
        fs::remove_file(&output).map_err(|source| Error::StagingCleanup {
            path: output.clone(),
            source,
        })?;
    }
    Ok(output)
}

/// Writes `content` to `dest` inside the staging tree.
///
/// Intermediate directories are created as needed and an existing file at
/// the destination is replaced. Returns the number of bytes written.
///
/// # Errors
///
/// Returns [`Error::ResourceInjection`] wrapping the first I/O failure. A
/// failure while copying can leave a partially written destination.
pub fn inject_resource(
    staging: impl AsRef<Path>,
    mut content: impl Read,
    dest: &ResourcePath,
) -> Result<u64> {
    let target = staging.as_ref().join(dest.to_relative_path());
    let fail = |source: io::Error| Error::ResourceInjection {
        path: target.clone(),
        source,
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(fail)?;
    }

    match fs::remove_file(&target) {
        Ok(()) => log::debug!("Replacing {}", target.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(fail(e)),
    }

    log::info!("Copying resource to {}", target.display());
    let mut file = File::create(&target).map_err(fail)?;
    let written = io::copy(&mut content, &mut file).map_err(fail)?;
    file.sync_all().map_err(fail)?;
    Ok(written)
}

/// Copies the file at `source` to `dest` inside the staging tree.
///
/// Behaves like [`inject_resource`]; a source that cannot be opened is also
/// reported as [`Error::ResourceInjection`].
pub fn inject_file(
    staging: impl AsRef<Path>,
    source: impl AsRef<Path>,
    dest: &ResourcePath,
) -> Result<u64> {
    let source = source.as_ref();
    let file = File::open(source).map_err(|e| Error::ResourceInjection {
        path: source.to_path_buf(),
        source: e,
    })?;
    inject_resource(staging, file, dest)
}
