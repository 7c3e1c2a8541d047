//! Command implementations for the CLI tool.

use std::path::{Path, PathBuf};

use mapsmith::{
    BuildPipeline, MAP_ARCHIVE_EXTENSION, MissionSettings, PackerOptions, ResourcePath,
    SCRIPT_LIBRARY_DEST, TechList, WorkingSet, WorkingSetState, inject_file, is_map_archive,
    packed_output_path_for, staging_path_for,
};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::{BuildReport, create_formatter};

/// Builds packer options from the global flags.
pub fn packer_options(tool_dir: Option<&Path>) -> PackerOptions {
    match tool_dir {
        Some(dir) => PackerOptions::new().tool_dir(dir),
        None => PackerOptions::new(),
    }
}

/// Unpack command implementation
pub fn unpack(archive: &Path, options: &PackerOptions, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    if !is_map_archive(archive) {
        eprintln!(
            "Error: {} is not a .{} map archive",
            archive.display(),
            MAP_ARCHIVE_EXTENSION
        );
        return ExitCode::BadArchive;
    }

    let pipeline = BuildPipeline::external(options.clone());
    let result = pipeline.unpack(archive);
    let state = WorkingSetState::default().after_unpack(&result);
    let unpacked = match result {
        Ok(unpacked) => unpacked,
        Err(e) => {
            eprintln!("Error unpacking {}: {}", archive.display(), e);
            return error_to_exit_code(&e);
        }
    };

    let staging = staging_path_for(archive);
    print!(
        "{}",
        formatter.format_unpack(&BuildReport {
            target: archive,
            produced_path: &staging,
            produced: unpacked,
            state,
            injected: 0,
        })
    );

    ExitCode::from_produced(unpacked)
}

/// Pack command implementation
///
/// `script_library` is copied to [`SCRIPT_LIBRARY_DEST`] after the `inject`
/// files, so it wins over an injection with the same destination.
pub fn pack(
    staging: &Path,
    inject: &[(PathBuf, ResourcePath)],
    script_library: Option<&Path>,
    options: &PackerOptions,
    format: OutputFormat,
) -> ExitCode {
    let formatter = create_formatter(format);

    // Validate the name before reading any resource from disk
    let output = match packed_output_path_for(staging) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    let mut sources: Vec<(&Path, ResourcePath)> = inject
        .iter()
        .map(|(source, dest)| (source.as_path(), dest.clone()))
        .collect();
    if let Some(library) = script_library {
        match ResourcePath::new(SCRIPT_LIBRARY_DEST) {
            Ok(dest) => sources.push((library, dest)),
            Err(e) => {
                eprintln!("Error: {}", e);
                return error_to_exit_code(&e);
            }
        }
    }

    let mut resources = Vec::with_capacity(sources.len());
    for (source, dest) in sources {
        match std::fs::read(source) {
            Ok(content) => resources.push((dest, content)),
            Err(e) => {
                eprintln!("Error reading {}: {}", source.display(), e);
                return ExitCode::IoError;
            }
        }
    }
    let injected = resources.len();

    let pipeline = BuildPipeline::external(options.clone());
    let result = pipeline.pack_with_resources(staging, resources);
    let state = WorkingSetState::Modified.after_pack(&result);
    let packed = match result {
        Ok(packed) => packed,
        Err(e) => {
            eprintln!("Error packing {}: {}", staging.display(), e);
            return error_to_exit_code(&e);
        }
    };

    print!(
        "{}",
        formatter.format_pack(&BuildReport {
            target: staging,
            produced_path: &output,
            produced: packed,
            state,
            injected,
        })
    );

    ExitCode::from_produced(packed)
}

/// Inject command implementation
pub fn inject(staging: &Path, source: &Path, dest: &ResourcePath, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let set = match WorkingSet::from_staging(staging) {
        Ok(set) => set,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };
    if !set.is_unpacked() {
        eprintln!("Error: {} is not an unpacked map", staging.display());
        return ExitCode::BadArchive;
    }

    match inject_file(set.staging_path(), source, dest) {
        Ok(bytes) => {
            print!("{}", formatter.format_inject(&set.resource_location(dest), bytes));
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error injecting {}: {}", source.display(), e);
            error_to_exit_code(&e)
        }
    }
}

/// Settings show command implementation
pub fn show_settings(dir: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let settings = match MissionSettings::load(dir) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    print!("{}", formatter.format_settings(&settings));
    ExitCode::Success
}

/// Settings tech command implementation
pub fn move_technology(
    dir: &Path,
    id: &str,
    from: TechList,
    to: TechList,
    format: OutputFormat,
) -> ExitCode {
    let formatter = create_formatter(format);

    let result = MissionSettings::load(dir).and_then(|mut settings| {
        settings.move_technology(id, from, to)?;
        settings.save(dir)?;
        Ok(settings)
    });

    match result {
        Ok(settings) => {
            print!(
                "{}",
                formatter.format_move(id, from, to, settings.technologies())
            );
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            error_to_exit_code(&e)
        }
    }
}
