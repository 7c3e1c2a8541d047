//! CLI tool for mapsmith map operations.

mod commands;
mod exit_codes;
mod output;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mapsmith::{ResourcePath, TechList};

use exit_codes::ExitCode;

/// Unpack, extend and repack strategy-game map archives
#[derive(Parser)]
#[command(name = "mapsmith")]
#[command(author, version, about = "Map archive build and settings tool", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Directory containing the packer's bin/ folder
    #[arg(long, env = "MAPSMITH_TOOL_DIR", global = true)]
    tool_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Unpack a map archive into its staging directory (alias: u)
    #[command(alias = "u")]
    Unpack {
        /// Map archive (.s5x) to unpack
        archive: PathBuf,
    },

    /// Pack a staging directory back into its archive (alias: p)
    #[command(alias = "p")]
    Pack {
        /// Staging directory (<archive>.unpacked)
        staging: PathBuf,

        /// Copy a file into the staging tree before packing (SRC=DEST)
        #[arg(short = 'i', long = "inject", value_parser = parse_injection)]
        inject: Vec<(PathBuf, ResourcePath)>,

        /// Script library to copy to maps/externalmap/qsb.lua before packing
        #[arg(long, value_name = "FILE")]
        script_library: Option<PathBuf>,
    },

    /// Copy a file into a staging directory
    Inject {
        /// Staging directory (<archive>.unpacked)
        staging: PathBuf,

        /// File to copy
        source: PathBuf,

        /// Destination inside the staging tree, e.g. maps/externalmap/qsb.lua
        dest: ResourcePath,
    },

    /// Inspect or edit mission settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Show the mission settings of a settings directory
    Show {
        /// Settings directory containing baseWindow.json
        #[arg(default_value = mapsmith::settings::DEFAULT_SETTINGS_DIR)]
        dir: PathBuf,
    },

    /// Move a technology between lists and save
    Tech(TechArgs),
}

#[derive(Args)]
struct TechArgs {
    /// Settings directory containing baseWindow.json
    dir: PathBuf,

    /// Technology identifier
    id: String,

    /// List the technology is currently in
    #[arg(long, value_enum)]
    from: ListArg,

    /// List to move the technology to
    #[arg(long, value_enum)]
    to: ListArg,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ListArg {
    Catalog,
    Forbidden,
    Researched,
}

impl From<ListArg> for TechList {
    fn from(list: ListArg) -> Self {
        match list {
            ListArg::Catalog => TechList::Catalog,
            ListArg::Forbidden => TechList::Forbidden,
            ListArg::Researched => TechList::Researched,
        }
    }
}

/// Parses `SRC=DEST`, splitting at the last `=`.
fn parse_injection(arg: &str) -> Result<(PathBuf, ResourcePath), String> {
    let (source, dest) = arg
        .rsplit_once('=')
        .ok_or_else(|| format!("expected SRC=DEST, got `{arg}`"))?;
    if source.is_empty() {
        return Err(format!("missing source file in `{arg}`"));
    }
    let dest = ResourcePath::new(dest).map_err(|e| e.to_string())?;
    Ok((PathBuf::from(source), dest))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Also installs the bridge that turns library `log` records into events.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::BadArgs
            } else {
                ExitCode::Success
            };
            e.print().ok();
            std::process::exit(code.code());
        }
    };

    init_logging(cli.verbose);

    let options = commands::packer_options(cli.tool_dir.as_deref());

    let exit_code = match cli.command {
        Commands::Unpack { archive } => commands::unpack(&archive, &options, cli.format),

        Commands::Pack {
            staging,
            inject,
            script_library,
        } => commands::pack(
            &staging,
            &inject,
            script_library.as_deref(),
            &options,
            cli.format,
        ),

        Commands::Inject {
            staging,
            source,
            dest,
        } => commands::inject(&staging, &source, &dest, cli.format),

        Commands::Settings(SettingsCommand::Show { dir }) => commands::show_settings(&dir, cli.format),

        Commands::Settings(SettingsCommand::Tech(args)) => commands::move_technology(
            &args.dir,
            &args.id,
            args.from.into(),
            args.to.into(),
            cli.format,
        ),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
