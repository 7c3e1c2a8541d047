//! Typed view of the two mission records.
//!
//! The settings document is `[world, player]`. Every field the editor owns is
//! decoded here once, with its element count and type checked, so later code
//! never has to look fields up by name.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::document::{Record, value_kind};
use crate::{Error, Result};

/// Number of diplomacy states offered to every player slot.
pub const DIPLOMACY_STATE_COUNT: usize = 3;
/// Number of resource kinds.
pub const RESOURCE_COUNT: usize = 6;
/// Number of player slots.
pub const PLAYER_COUNT: usize = 8;
/// Number of debug switches.
pub const DEBUG_FLAG_COUNT: usize = 3;

/// Index of the world/catalog record in the document.
pub const WORLD_RECORD: usize = 0;
/// Index of the player/quest record in the document.
pub const PLAYER_RECORD: usize = 1;

/// JSON keys of the mission document.
pub mod keys {
    /// World record: diplomacy state labels.
    pub const DIPLOMACY_STATES: &str = "DiplomacyStates";
    /// World record: color labels. Player record: color index per slot.
    pub const PLAYER_COLORS: &str = "PlayerColors";
    /// World record: resource labels.
    pub const RESOURCES: &str = "Resources";
    /// World record: available technologies.
    pub const TECHNOLOGIES: &str = "Technologies";
    /// Player record: debug switches.
    pub const DEBUG_MODE: &str = "DebugMode";
    /// Player record: starting resource amounts.
    pub const START_RESOURCES: &str = "StartResources";
    /// Player record: player names.
    pub const PLAYER_NAMES: &str = "PlayerNames";
    /// Player record: diplomacy index per slot.
    pub const PLAYER_DIPLOMACIES: &str = "PlayerDiplomacies";
    /// Player record: forbidden technologies.
    pub const FORBID_TECHNOLOGIES: &str = "ForbidTechnologies";
    /// Player record: researched technologies.
    pub const RESEARCHED_TECHNOLOGIES: &str = "ResearchedTechnologies";
}

/// Labels shared by all player slots.
///
/// The editor never changes these; they populate the selection widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorldCatalog {
    /// Diplomacy state labels, selectable per player.
    pub diplomacy_states: [String; DIPLOMACY_STATE_COUNT],
    /// Color labels, selectable per player.
    pub player_colors: Vec<String>,
    /// Resource labels, in the order of [`PlayerConfig::start_resources`].
    pub resource_names: [String; RESOURCE_COUNT],
}

/// Per-mission player settings edited by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerConfig {
    /// Debug switches.
    pub debug_flags: [bool; DEBUG_FLAG_COUNT],
    /// Starting resource amounts as entered in the editor.
    ///
    /// They are trimmed and parsed as integers on save, and stored as JSON
    /// numbers. Text such as `" 200 "`, `"+5"` or `"007"` therefore reloads
    /// in canonical form (`"200"`, `"5"`, `"7"`), not as typed.
    pub start_resources: [String; RESOURCE_COUNT],
    /// Player names.
    pub player_names: [String; PLAYER_COUNT],
    /// Index into [`WorldCatalog::diplomacy_states`] per slot.
    ///
    /// Slot 0 is the human player and is not edited by the editor.
    pub player_diplomacy: [usize; PLAYER_COUNT],
    /// Index into [`WorldCatalog::player_colors`] per slot.
    pub player_colors: [usize; PLAYER_COUNT],
}

/// Reads typed fields out of one record, producing load errors that name the
/// record and key.
pub(crate) struct RecordReader<'a> {
    record: &'a Record,
    name: &'static str,
    origin: &'a Path,
}

impl<'a> RecordReader<'a> {
    pub(crate) fn new(record: &'a Record, name: &'static str, origin: &'a Path) -> Self {
        Self {
            record,
            name,
            origin,
        }
    }

    fn error(&self, key: &str, reason: impl std::fmt::Display) -> Error {
        Error::settings_load(self.origin, format!("{} record, {}: {}", self.name, key, reason))
    }

    fn array(&self, key: &str) -> Result<&'a Vec<Value>> {
        match self.record.get(key) {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(self.error(key, format!("expected an array, found {}", value_kind(other)))),
            None => Err(self.error(key, "missing field")),
        }
    }

    fn elements<T>(&self, key: &str, convert: impl Fn(&Value) -> Option<T>, kind: &str) -> Result<Vec<T>> {
        self.array(key)?
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                convert(value).ok_or_else(|| {
                    self.error(
                        key,
                        format!("element {} is {}, expected {}", idx, value_kind(value), kind),
                    )
                })
            })
            .collect()
    }

    fn fixed<T, const N: usize>(&self, key: &str, items: Vec<T>) -> Result<[T; N]> {
        let found = items.len();
        <[T; N]>::try_from(items)
            .map_err(|_| self.error(key, format!("expected exactly {} entries, found {}", N, found)))
    }

    pub(crate) fn strings(&self, key: &str) -> Result<Vec<String>> {
        self.elements(key, |v| v.as_str().map(str::to_string), "a string")
    }

    pub(crate) fn fixed_strings<const N: usize>(&self, key: &str) -> Result<[String; N]> {
        let items = self.strings(key)?;
        self.fixed(key, items)
    }

    pub(crate) fn fixed_bools<const N: usize>(&self, key: &str) -> Result<[bool; N]> {
        let items = self.elements(key, Value::as_bool, "a boolean")?;
        self.fixed(key, items)
    }

    pub(crate) fn fixed_integers<const N: usize>(&self, key: &str) -> Result<[i64; N]> {
        let items = self.elements(key, Value::as_i64, "an integer")?;
        self.fixed(key, items)
    }

    /// Reads exactly `N` indices, each below `bound`.
    pub(crate) fn fixed_indices<const N: usize>(&self, key: &str, bound: usize) -> Result<[usize; N]> {
        let items = self.elements(
            key,
            |v| v.as_u64().and_then(|n| usize::try_from(n).ok()),
            "a non-negative integer",
        )?;
        if let Some((slot, index)) = items.iter().enumerate().find(|(_, i)| **i >= bound) {
            return Err(self.error(
                key,
                format!("slot {} selects index {}, but only {} entries exist", slot, index, bound),
            ));
        }
        self.fixed(key, items)
    }
}

impl WorldCatalog {
    pub(crate) fn decode(reader: &RecordReader<'_>) -> Result<Self> {
        Ok(Self {
            diplomacy_states: reader.fixed_strings(keys::DIPLOMACY_STATES)?,
            player_colors: reader.strings(keys::PLAYER_COLORS)?,
            resource_names: reader.fixed_strings(keys::RESOURCES)?,
        })
    }

    pub(crate) fn encode(&self, record: &mut Record) {
        record.insert(keys::DIPLOMACY_STATES.into(), string_array(&self.diplomacy_states));
        record.insert(keys::PLAYER_COLORS.into(), string_array(&self.player_colors));
        record.insert(keys::RESOURCES.into(), string_array(&self.resource_names));
    }
}

impl PlayerConfig {
    pub(crate) fn decode(reader: &RecordReader<'_>, world: &WorldCatalog) -> Result<Self> {
        let amounts: [i64; RESOURCE_COUNT] = reader.fixed_integers(keys::START_RESOURCES)?;
        Ok(Self {
            debug_flags: reader.fixed_bools(keys::DEBUG_MODE)?,
            start_resources: amounts.map(|n| n.to_string()),
            player_names: reader.fixed_strings(keys::PLAYER_NAMES)?,
            player_diplomacy: reader
                .fixed_indices(keys::PLAYER_DIPLOMACIES, world.diplomacy_states.len())?,
            player_colors: reader.fixed_indices(keys::PLAYER_COLORS, world.player_colors.len())?,
        })
    }

    /// Parses the starting resource amounts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SettingsSave`] naming the first amount that is not an
    /// integer.
    pub fn parse_start_resources(&self) -> Result<[i64; RESOURCE_COUNT]> {
        let mut amounts = [0i64; RESOURCE_COUNT];
        for (slot, (amount, text)) in amounts.iter_mut().zip(&self.start_resources).enumerate() {
            *amount = text.trim().parse().map_err(|_| {
                Error::settings_save(
                    format!("{}[{}]", keys::START_RESOURCES, slot),
                    format!("not an integer: '{}'", text),
                )
            })?;
        }
        Ok(amounts)
    }

    /// Checks every selection index against the catalog it refers to.
    pub(crate) fn check_indices(&self, world: &WorldCatalog) -> Result<()> {
        let checks = [
            (keys::PLAYER_DIPLOMACIES, &self.player_diplomacy, world.diplomacy_states.len()),
            (keys::PLAYER_COLORS, &self.player_colors, world.player_colors.len()),
        ];
        for (key, indices, bound) in checks {
            if let Some((slot, index)) = indices.iter().enumerate().find(|(_, i)| **i >= bound) {
                return Err(Error::settings_save(
                    format!("{}[{}]", key, slot),
                    format!("index {} out of range (0..{})", index, bound),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn encode(&self, world: &WorldCatalog, record: &mut Record) -> Result<()> {
        let amounts = self.parse_start_resources()?;
        self.check_indices(world)?;

        record.insert(
            keys::START_RESOURCES.into(),
            Value::Array(amounts.iter().map(|&n| Value::from(n)).collect()),
        );
        record.insert(keys::PLAYER_NAMES.into(), string_array(&self.player_names));
        record.insert(keys::PLAYER_DIPLOMACIES.into(), index_array(&self.player_diplomacy));
        record.insert(keys::PLAYER_COLORS.into(), index_array(&self.player_colors));
        record.insert(
            keys::DEBUG_MODE.into(),
            Value::Array(self.debug_flags.iter().map(|&b| Value::Bool(b)).collect()),
        );
        Ok(())
    }
}

pub(crate) fn string_array(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

fn index_array(items: &[usize]) -> Value {
    Value::Array(items.iter().map(|&i| Value::from(i as u64)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn world() -> WorldCatalog {
        WorldCatalog {
            diplomacy_states: ["Feind".into(), "Neutral".into(), "Verbündet".into()],
            player_colors: vec!["Blau".into(), "Rot".into()],
            resource_names: ["Taler", "Lehm", "Holz", "Stein", "Eisen", "Schwefel"].map(String::from),
        }
    }

    #[test]
    fn test_wrong_count_names_field() {
        let rec = record(json!({"Resources": ["a", "b"]}));
        let reader = RecordReader::new(&rec, "world", Path::new("baseWindow.json"));
        let err = reader.fixed_strings::<RESOURCE_COUNT>(keys::RESOURCES).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Resources"));
        assert!(msg.contains("exactly 6"));
    }

    #[test]
    fn test_wrong_element_type() {
        let rec = record(json!({"DebugMode": [true, "no", false]}));
        let reader = RecordReader::new(&rec, "player", Path::new("baseWindow.json"));
        let err = reader.fixed_bools::<DEBUG_FLAG_COUNT>(keys::DEBUG_MODE).unwrap_err();
        assert!(err.to_string().contains("element 1"));
    }

    #[test]
    fn test_missing_field() {
        let rec = Record::new();
        let reader = RecordReader::new(&rec, "player", Path::new("baseWindow.json"));
        let err = reader.strings(keys::PLAYER_NAMES).unwrap_err();
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn test_index_out_of_range() {
        let rec = record(json!({"PlayerColors": [0, 1, 2, 0, 0, 0, 0, 0]}));
        let reader = RecordReader::new(&rec, "player", Path::new("baseWindow.json"));
        let err = reader.fixed_indices::<PLAYER_COUNT>(keys::PLAYER_COLORS, 2).unwrap_err();
        assert!(err.to_string().contains("slot 2"));
    }

    #[test]
    fn test_parse_start_resources_names_slot() {
        let mut player = PlayerConfig {
            debug_flags: [false; DEBUG_FLAG_COUNT],
            start_resources: ["100", " 200 ", "0", "-5", "x1", "7"].map(String::from),
            player_names: Default::default(),
            player_diplomacy: [0; PLAYER_COUNT],
            player_colors: [0; PLAYER_COUNT],
        };
        let err = player.parse_start_resources().unwrap_err();
        assert!(matches!(err, Error::SettingsSave { ref field, .. } if field == "StartResources[4]"));

        player.start_resources[4] = "1".into();
        assert_eq!(player.parse_start_resources().unwrap(), [100, 200, 0, -5, 1, 7]);
    }

    #[test]
    fn test_check_indices() {
        let mut player = PlayerConfig {
            debug_flags: [false; DEBUG_FLAG_COUNT],
            start_resources: Default::default(),
            player_names: Default::default(),
            player_diplomacy: [1; PLAYER_COUNT],
            player_colors: [0; PLAYER_COUNT],
        };
        assert!(player.check_indices(&world()).is_ok());
        player.player_diplomacy[7] = 3;
        let err = player.check_indices(&world()).unwrap_err();
        assert!(err.to_string().contains("PlayerDiplomacies[7]"));
    }
}
