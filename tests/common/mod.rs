//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use mapsmith::{Error, Packer, PackerStatus, Result, packed_output_path_for, staging_path_for};
use serde_json::{Value, json};

/// Returns a valid two-record mission settings document.
pub fn sample_settings_value() -> Value {
    json!([
        {
            "DiplomacyStates": ["Enemy", "Neutral", "Allied"],
            "PlayerColors": ["Blue", "Red", "Yellow", "Green"],
            "Resources": ["Gold", "Clay", "Wood", "Stone", "Iron", "Sulfur"],
            "Technologies": ["T_Banking", "T_Cannon", "T_Chainmail", "T_Gilds"],
            "MapTitle": "Coast"
        },
        {
            "DebugMode": [false, true, false],
            "StartResources": [500, 1200, 1500, 800, 50, 50],
            "PlayerNames": ["Dario", "Kerberos", "Mary", "Varg", "Ari", "", "", ""],
            "PlayerDiplomacies": [0, 0, 1, 2, 1, 1, 1, 1],
            "PlayerColors": [0, 1, 2, 3, 0, 0, 0, 0],
            "ForbidTechnologies": ["T_Flamethrower"],
            "ResearchedTechnologies": ["T_Construction"]
        }
    ])
}

/// Writes `value` as the settings document of `dir`.
pub fn write_settings(dir: &Path, value: &Value) {
    fs::create_dir_all(dir).expect("Failed to create settings dir");
    let text = serde_json::to_string_pretty(value).expect("Failed to serialize settings");
    fs::write(dir.join(mapsmith::settings::SETTINGS_FILE_NAME), text)
        .expect("Failed to write settings");
}

/// Writes a placeholder archive file and returns its path.
pub fn create_archive(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"BBA5\0placeholder").expect("Failed to write archive");
    path
}

/// One recorded packer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub target: PathBuf,
    /// Whether the file the call is expected to produce already existed.
    pub output_existed: bool,
}

/// Packer that imitates the external tool on the filesystem.
///
/// Unpacking creates `<archive>.unpacked/info.xml`; packing writes the output
/// archive. Every call is recorded.
#[derive(Debug, Default)]
pub struct StubPacker {
    calls: Mutex<Vec<Invocation>>,
    produce: bool,
}

impl StubPacker {
    /// A packer that produces output.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            produce: true,
        }
    }

    /// A packer that runs but produces nothing.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("poisoned").clone()
    }
}

impl Packer for StubPacker {
    fn invoke(&self, target: &Path) -> Result<PackerStatus> {
        let output = if target.is_dir() {
            packed_output_path_for(target)?
        } else {
            staging_path_for(target)
        };
        self.calls.lock().expect("poisoned").push(Invocation {
            target: target.to_path_buf(),
            output_existed: output.exists(),
        });

        if self.produce {
            if target.is_dir() {
                fs::write(&output, b"BBA5\0packed")?;
            } else {
                fs::create_dir_all(&output)?;
                fs::write(output.join("info.xml"), b"<root/>")?;
            }
        }
        Ok(PackerStatus::success())
    }
}

/// Packer whose executable cannot be started.
#[derive(Debug, Default)]
pub struct BrokenPacker;

impl Packer for BrokenPacker {
    fn invoke(&self, _target: &Path) -> Result<PackerStatus> {
        Err(Error::PackerInvocation {
            program: PathBuf::from("bin/bba5.sh"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}
