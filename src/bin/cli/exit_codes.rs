//! Exit codes for the CLI tool.

use mapsmith::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// The packer ran but produced no staging directory or archive
pub const NO_OUTPUT: i32 = 1;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Not a usable archive or staging directory
pub const BAD_ARCHIVE: i32 = 3;
/// Mission settings could not be loaded, edited or saved
pub const SETTINGS_ERROR: i32 = 4;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    NoOutput,
    FatalError,
    BadArchive,
    SettingsError,
    IoError,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::NoOutput => NO_OUTPUT,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::SettingsError => SETTINGS_ERROR,
            Self::IoError => IO_ERROR,
            Self::BadArgs => BAD_ARGS,
        }
    }

    /// Maps a pipeline outcome to an exit code
    pub fn from_produced(produced: bool) -> Self {
        if produced {
            Self::Success
        } else {
            Self::NoOutput
        }
    }
}

/// Converts a mapsmith error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::InvalidArchive { .. } | Error::InvalidStaging { .. } => ExitCode::BadArchive,
        Error::StagingCleanup { .. } | Error::ResourceInjection { .. } => ExitCode::IoError,
        Error::PackerInvocation { .. } => ExitCode::FatalError,
        Error::SettingsLoad { .. }
        | Error::SettingsSave { .. }
        | Error::InvalidTransition { .. }
        | Error::DocumentParse(_)
        | Error::DocumentSerialize(_) => ExitCode::SettingsError,
        Error::InvalidResourcePath(_) => ExitCode::BadArgs,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_mapping() {
        let err = Error::InvalidArchive {
            path: PathBuf::from("m.s5x"),
            reason: "is a directory",
        };
        assert_eq!(error_to_exit_code(&err).code(), BAD_ARCHIVE);

        let err = Error::PackerInvocation {
            program: PathBuf::from("bin/bba5.sh"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(error_to_exit_code(&err).code(), FATAL_ERROR);

        let err = Error::InvalidResourcePath("..".into());
        assert_eq!(error_to_exit_code(&err).code(), BAD_ARGS);
    }

    #[test]
    fn test_from_produced() {
        assert_eq!(ExitCode::from_produced(true), ExitCode::Success);
        assert_eq!(ExitCode::from_produced(false).code(), NO_OUTPUT);
    }
}
