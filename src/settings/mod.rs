//! Mission settings store.
//!
//! [`MissionSettings`] owns the in-memory state of a mission settings
//! document (`baseWindow.json`) for one edit session: the world catalog, the
//! player configuration and the technology partition. There is no auto-save;
//! call [`MissionSettings::save`] before dropping an edited value.
//!
//! # Example
//!
//! ```rust,no_run
//! use mapsmith::settings::{MissionSettings, TechList};
//!
//! let mut settings = MissionSettings::load("cnf")?;
//! settings.player_mut().player_names[1] = "Kerberos".into();
//! settings.forbid("T_Cannon")?;
//! settings.save("cnf")?;
//! # Ok::<(), mapsmith::Error>(())
//! ```

mod schema;
mod technology;

pub use schema::{
    DEBUG_FLAG_COUNT, DIPLOMACY_STATE_COUNT, PLAYER_COUNT, PLAYER_RECORD, PlayerConfig,
    RESOURCE_COUNT, WORLD_RECORD, WorldCatalog, keys,
};
pub use technology::{TechList, TechnologyPartition};

use std::fs;
use std::path::{Path, PathBuf};

use schema::{RecordReader, string_array};

use crate::document::{Document, Record};
use crate::{Error, Result};

/// File name of the settings document inside a settings directory.
pub const SETTINGS_FILE_NAME: &str = "baseWindow.json";

/// Settings directory used when none has been chosen yet.
pub const DEFAULT_SETTINGS_DIR: &str = "cnf";

/// Returns the settings document path for a settings directory.
pub fn settings_file(settings_dir: impl AsRef<Path>) -> PathBuf {
    settings_dir.as_ref().join(SETTINGS_FILE_NAME)
}

/// In-memory mission settings.
///
/// Fields outside the ones modelled here are kept from the loaded document
/// and written back unchanged.
#[derive(Debug, Clone)]
pub struct MissionSettings {
    document: Document,
    world: WorldCatalog,
    player: PlayerConfig,
    technologies: TechnologyPartition,
}

impl MissionSettings {
    /// Creates settings from typed parts, with no extra document fields.
    pub fn new(world: WorldCatalog, player: PlayerConfig, technologies: TechnologyPartition) -> Self {
        Self {
            document: Document::new(vec![Record::new(), Record::new()]),
            world,
            player,
            technologies,
        }
    }

    /// Loads the settings document from `settings_dir`.
    ///
    /// The technology lists are taken as stored. Identifiers that appear in
    /// more than one list are logged, not rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SettingsLoad`] if the file is missing or malformed,
    /// does not hold exactly two records, or any field is missing, mistyped,
    /// has the wrong number of entries or selects an index outside its
    /// catalog.
    pub fn load(settings_dir: impl AsRef<Path>) -> Result<Self> {
        let path = settings_file(settings_dir);
        log::debug!("Loading mission settings from {}", path.display());

        let document = Document::load(&path).map_err(|e| match e {
            Error::Io(io) => Error::settings_load(&path, io.to_string()),
            Error::DocumentParse(reason) => Error::settings_load(&path, reason),
            other => other,
        })?;
        Self::decode(document, &path)
    }

    /// Decodes settings from an already loaded document.
    pub fn from_document(document: Document) -> Result<Self> {
        Self::decode(document, Path::new(SETTINGS_FILE_NAME))
    }

    fn decode(document: Document, origin: &Path) -> Result<Self> {
        if document.len() != 2 {
            return Err(Error::settings_load(
                origin,
                format!("expected exactly 2 records, found {}", document.len()),
            ));
        }

        let (world, player, technologies) = {
            let world_reader =
                RecordReader::new(&document.records()[WORLD_RECORD], "world", origin);
            let player_reader =
                RecordReader::new(&document.records()[PLAYER_RECORD], "player", origin);

            let world = WorldCatalog::decode(&world_reader)?;
            let player = PlayerConfig::decode(&player_reader, &world)?;
            let technologies = TechnologyPartition::new(
                world_reader.strings(keys::TECHNOLOGIES)?,
                player_reader.strings(keys::FORBID_TECHNOLOGIES)?,
                player_reader.strings(keys::RESEARCHED_TECHNOLOGIES)?,
            );
            (world, player, technologies)
        };

        let overlaps = technologies.overlaps();
        if !overlaps.is_empty() {
            log::warn!(
                "{}: technologies listed more than once: {}",
                origin.display(),
                overlaps.join(", ")
            );
        }

        Ok(Self {
            document,
            world,
            player,
            technologies,
        })
    }

    /// Builds the document that [`save`](Self::save) would write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SettingsSave`] naming the field that cannot be
    /// serialized, e.g. a starting resource amount that is not an integer.
    pub fn to_document(&self) -> Result<Document> {
        let mut records = self.document.clone().into_records();
        let [world, player] = records.as_mut_slice() else {
            return Err(Error::settings_save(
                SETTINGS_FILE_NAME,
                "document does not hold two records",
            ));
        };

        self.world.encode(world);
        world.insert(keys::TECHNOLOGIES.into(), string_array(self.technologies.catalog()));

        self.player.encode(&self.world, player)?;
        player.insert(
            keys::FORBID_TECHNOLOGIES.into(),
            string_array(self.technologies.forbidden()),
        );
        player.insert(
            keys::RESEARCHED_TECHNOLOGIES.into(),
            string_array(self.technologies.researched()),
        );

        Ok(Document::new(records))
    }

    /// Writes the current state to `settings_dir`, replacing the document.
    ///
    /// The settings directory is created if needed. Nothing is written when
    /// serialization fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SettingsSave`] for an unserializable field or when the
    /// file cannot be written.
    pub fn save(&self, settings_dir: impl AsRef<Path>) -> Result<()> {
        let settings_dir = settings_dir.as_ref();
        let document = self.to_document()?;
        let path = settings_file(settings_dir);

        let io_error = |e: std::io::Error| Error::settings_save(SETTINGS_FILE_NAME, e.to_string());
        fs::create_dir_all(settings_dir).map_err(io_error)?;
        document.write(&path).map_err(|e| match e {
            Error::Io(io) => io_error(io),
            Error::DocumentSerialize(reason) => Error::settings_save(SETTINGS_FILE_NAME, reason),
            other => other,
        })?;

        log::info!("Saved mission settings to {}", path.display());
        Ok(())
    }

    /// Returns the world catalog.
    pub fn world(&self) -> &WorldCatalog {
        &self.world
    }

    /// Returns the player configuration.
    pub fn player(&self) -> &PlayerConfig {
        &self.player
    }

    /// Returns the player configuration for editing.
    pub fn player_mut(&mut self) -> &mut PlayerConfig {
        &mut self.player
    }

    /// Returns the technology partition.
    pub fn technologies(&self) -> &TechnologyPartition {
        &self.technologies
    }

    /// Moves a technology between lists.
    ///
    /// See [`TechnologyPartition::move_technology`].
    pub fn move_technology(&mut self, id: &str, from: TechList, to: TechList) -> Result<()> {
        self.technologies.move_technology(id, from, to)?;
        log::debug!("Moved technology {} from {} to {}", id, from, to);
        Ok(())
    }

    /// Moves the technology selected at `index` of `from` to `to`.
    pub fn move_technology_at(&mut self, index: usize, from: TechList, to: TechList) -> Result<String> {
        self.technologies.move_at(index, from, to)
    }

    /// Forbids an available technology.
    pub fn forbid(&mut self, id: &str) -> Result<()> {
        self.move_technology(id, TechList::Catalog, TechList::Forbidden)
    }

    /// Returns a forbidden technology to the catalog.
    pub fn unforbid(&mut self, id: &str) -> Result<()> {
        self.move_technology(id, TechList::Forbidden, TechList::Catalog)
    }

    /// Marks an available technology as researched.
    pub fn research(&mut self, id: &str) -> Result<()> {
        self.move_technology(id, TechList::Catalog, TechList::Researched)
    }

    /// Returns a researched technology to the catalog.
    pub fn unresearch(&mut self, id: &str) -> Result<()> {
        self.move_technology(id, TechList::Researched, TechList::Catalog)
    }
}

impl PartialEq for MissionSettings {
    /// Compares the edited state; untouched extra document fields are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.world == other.world
            && self.player == other.player
            && self.technologies == other.technologies
    }
}
