//! External packer invocation.
//!
//! The archive codec itself is an external tool shipped next to the editor
//! (`bin/bba5.exe` on Windows, `bin/bba5.sh` elsewhere). Given an archive it
//! unpacks it into `<archive>.unpacked`; given a staging directory it packs
//! it back. This module only starts the tool, relays its output and waits.
//!
//! The [`Packer`] trait is the seam between the pipeline and the tool, so a
//! pipeline can run against a stub in tests.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};

use crate::{Error, Result};

/// Size of the relay buffer for the packer's standard output.
const RELAY_BUFFER_SIZE: usize = 1024;

/// Operating system family, selecting the packer executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Windows: runs `bin/bba5.exe`.
    Windows,
    /// Everything else: runs `bin/bba5.sh`.
    Unix,
}

impl Platform {
    /// Returns the platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Returns the packer path relative to the tool directory.
    pub fn packer_relative_path(self) -> &'static str {
        match self {
            Platform::Windows => "bin/bba5.exe",
            Platform::Unix => "bin/bba5.sh",
        }
    }
}

/// Exit status reported by a packer run.
///
/// The pipeline does not trust it for success; it is kept for logging and
/// for callers that want it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackerStatus {
    code: Option<i32>,
}

impl PackerStatus {
    /// Creates a status from an exit code (`None` if killed by a signal).
    pub fn new(code: Option<i32>) -> Self {
        Self { code }
    }

    /// A zero exit status.
    pub fn success() -> Self {
        Self::new(Some(0))
    }

    /// Returns the exit code, if the process exited normally.
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// Returns true for a zero exit code.
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for PackerStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self::new(status.code())
    }
}

/// Converts between archives and staging directories.
pub trait Packer {
    /// Runs the conversion for `target` and blocks until it finishes.
    ///
    /// `target` is an archive to unpack or a staging directory to pack.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PackerInvocation`] if the conversion could not be
    /// run. A non-zero exit status is returned as `Ok`.
    fn invoke(&self, target: &Path) -> Result<PackerStatus>;

    /// Returns the executable this packer runs, if it runs one.
    fn executable(&self) -> Option<&Path> {
        None
    }
}

impl<P: Packer + ?Sized> Packer for &P {
    fn invoke(&self, target: &Path) -> Result<PackerStatus> {
        (**self).invoke(target)
    }

    fn executable(&self) -> Option<&Path> {
        (**self).executable()
    }
}

impl<P: Packer + ?Sized> Packer for Box<P> {
    fn invoke(&self, target: &Path) -> Result<PackerStatus> {
        (**self).invoke(target)
    }

    fn executable(&self) -> Option<&Path> {
        (**self).executable()
    }
}

/// Options selecting the packer executable.
#[derive(Debug, Clone, Default)]
pub struct PackerOptions {
    /// Directory containing `bin/`. Defaults to the working directory.
    pub tool_dir: Option<PathBuf>,
    /// Explicit executable, overriding the platform convention.
    pub program: Option<PathBuf>,
    /// Platform override, mainly for tests.
    pub platform: Option<Platform>,
}

impl PackerOptions {
    /// Creates options using the platform convention under the working
    /// directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory that contains `bin/`.
    pub fn tool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tool_dir = Some(dir.into());
        self
    }

    /// Uses `program` instead of the platform packer.
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Overrides the detected platform.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Resolves the executable to run.
    pub fn resolve_program(&self) -> PathBuf {
        if let Some(program) = &self.program {
            return program.clone();
        }
        let platform = self.platform.unwrap_or_else(Platform::current);
        let tool_dir = self
            .tool_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default();
        tool_dir.join(platform.packer_relative_path())
    }
}

type SharedSink = Arc<Mutex<dyn Write + Send>>;

/// Runs the external packer executable.
///
/// The child's standard output is copied to a sink (the host's standard
/// output unless [`ExternalPacker::with_output`] is used) as it arrives.
/// Standard error is inherited.
pub struct ExternalPacker {
    program: PathBuf,
    output: Option<SharedSink>,
}

impl ExternalPacker {
    /// Creates a packer from options.
    pub fn new(options: &PackerOptions) -> Self {
        Self {
            program: options.resolve_program(),
            output: None,
        }
    }

    /// Relays the child's output to `sink` instead of standard output.
    pub fn with_output(mut self, sink: impl Write + Send + 'static) -> Self {
        self.output = Some(Arc::new(Mutex::new(sink)));
        self
    }

    /// Returns the executable this packer runs.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn invocation_error(&self, source: io::Error) -> Error {
        Error::PackerInvocation {
            program: self.program.clone(),
            source,
        }
    }

    fn relay(&self, child_out: &mut impl Read) -> io::Result<u64> {
        match &self.output {
            Some(sink) => {
                let mut sink = sink
                    .lock()
                    .map_err(|_| io::Error::other("packer output sink poisoned"))?;
                relay_stream(child_out, &mut *sink)
            }
            None => relay_stream(child_out, &mut io::stdout().lock()),
        }
    }
}

impl std::fmt::Debug for ExternalPacker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalPacker")
            .field("program", &self.program)
            .field("custom_output", &self.output.is_some())
            .finish()
    }
}

impl Packer for ExternalPacker {
    fn invoke(&self, target: &Path) -> Result<PackerStatus> {
        log::info!("Processing map {}", target.display());
        log::debug!("Running {} {}", self.program.display(), target.display());

        let mut child = Command::new(&self.program)
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| self.invocation_error(e))?;

        let relayed = match child.stdout.take() {
            Some(mut out) => self.relay(&mut out),
            None => Ok(0),
        };

        // Reap the child even when relaying failed.
        let status = child.wait().map_err(|e| self.invocation_error(e))?;
        let relayed = relayed.map_err(|e| self.invocation_error(e))?;

        let status = PackerStatus::from(status);
        log::info!("Done ({} bytes of packer output)", relayed);
        if !status.is_success() {
            log::warn!(
                "{} exited with status {:?}",
                self.program.display(),
                status.code()
            );
        }
        Ok(status)
    }

    fn executable(&self) -> Option<&Path> {
        Some(&self.program)
    }
}

/// Copies `reader` to `writer` chunk by chunk, flushing after every chunk so
/// output appears while the child is still running.
pub fn relay_stream<R, W>(reader: &mut R, writer: &mut W) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buffer = [0u8; RELAY_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..n])?;
        writer.flush()?;
        total += n as u64;
    }
    Ok(total)
}
