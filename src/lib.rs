//! # mapsmith
//!
//! Build and configuration core for a strategy-game map editor.
//!
//! A map is distributed as an archive (`.s5x`) that an external packer tool
//! converts into a staging directory (`<archive>.unpacked`) and back. This
//! crate drives that round trip, merges generated script resources into the
//! staging tree, and edits the mission settings document (`baseWindow.json`)
//! that the editor keeps alongside it.
//!
//! ## Quick Start
//!
//! ### Unpacking, extending and repacking a map
//!
//! ```rust,no_run
//! use mapsmith::{BuildPipeline, PackerOptions, ResourcePath, Result, WorkingSet};
//!
//! fn main() -> Result<()> {
//!     let pipeline = BuildPipeline::external(PackerOptions::new().tool_dir("/opt/editor"));
//!     let set = WorkingSet::new("maps/coast.s5x");
//!
//!     if !pipeline.unpack(set.archive_path())? {
//!         eprintln!("packer produced no staging directory");
//!         return Ok(());
//!     }
//!
//!     let dest = ResourcePath::new("maps/externalmap/mapscript.lua")?;
//!     mapsmith::inject_file(set.staging_path(), "build/mapscript.lua", &dest)?;
//!
//!     let packed = pipeline.pack(set.staging_path())?;
//!     println!("archive written: {}", packed);
//!     Ok(())
//! }
//! ```
//!
//! ### Editing mission settings
//!
//! ```rust,no_run
//! use mapsmith::{MissionSettings, Result, TechList};
//!
//! fn main() -> Result<()> {
//!     let mut settings = MissionSettings::load("cnf")?;
//!     settings.player_mut().start_resources[0] = "1000".into();
//!     settings.move_technology("T_Cannon", TechList::Catalog, TechList::Forbidden)?;
//!     settings.save("cnf")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `async` | No | [`AsyncBuildPipeline`] on Tokio's blocking pool |
//! | `cli` | No | The `mapsmith` command-line binary |
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`], with [`Error`] grouping
//! failures into precondition, filesystem and settings categories:
//!
//! ```rust,no_run
//! use mapsmith::{BuildPipeline, Error, PackerOptions};
//!
//! let pipeline = BuildPipeline::external(PackerOptions::new());
//! match pipeline.unpack("maps/coast.s5x") {
//!     Ok(true) => println!("unpacked"),
//!     Ok(false) => println!("packer ran, nothing unpacked"),
//!     Err(e) if e.is_precondition() => println!("not a map archive: {e}"),
//!     Err(e) => println!("failed: {e}"),
//! }
//! ```
//!
//! ## Logging
//!
//! Progress is reported through the [`log`] facade (`info` for each step,
//! `debug` for every deleted or copied entry, `warn` for suspicious input).
//! Install any logger in the host application to see it.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod document;
pub mod error;
pub mod packer;
pub mod pipeline;
pub mod resource_path;
pub mod settings;
pub mod staging;

#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub mod async_pipeline;

pub use document::{Document, Record};
pub use error::{Error, Result};
pub use resource_path::ResourcePath;

pub use settings::{MissionSettings, PlayerConfig, TechList, TechnologyPartition, WorldCatalog};

pub use staging::{
    MAP_ARCHIVE_EXTENSION, SCRIPT_LIBRARY_DEST, WorkingSet, inject_file, inject_resource,
    is_map_archive, packed_output_path_for, prepare_for_pack, prepare_for_unpack,
    staging_path_for,
};

pub use packer::{ExternalPacker, Packer, PackerOptions, PackerStatus, Platform};
pub use pipeline::{BuildPipeline, WorkingSetState};

#[cfg(feature = "async")]
pub use async_pipeline::AsyncBuildPipeline;
