//! The technology partition.
//!
//! Every technology identifier of a mission lives in exactly one of three
//! lists: the catalog of still-available technologies, the forbidden list, or
//! the already-researched list. The only edit is moving an identifier from
//! one list to the tail of another.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::{Error, Result};

/// One of the three technology lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TechList {
    /// Technologies still available to the player.
    Catalog,
    /// Technologies the player may never research.
    Forbidden,
    /// Technologies granted at mission start.
    Researched,
}

impl TechList {
    /// All lists in document order.
    pub const ALL: [TechList; 3] = [TechList::Catalog, TechList::Forbidden, TechList::Researched];

    /// Returns the lowercase name of the list.
    pub fn as_str(self) -> &'static str {
        match self {
            TechList::Catalog => "catalog",
            TechList::Forbidden => "forbidden",
            TechList::Researched => "researched",
        }
    }
}

impl fmt::Display for TechList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TechList {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        TechList::ALL
            .into_iter()
            .find(|list| list.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown technology list '{}'", s))
    }
}

/// The catalog, forbidden and researched technology lists.
///
/// Lists are taken as loaded; [`TechnologyPartition::overlaps`] reports
/// identifiers that appear more than once so callers can warn about
/// hand-edited documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TechnologyPartition {
    catalog: Vec<String>,
    forbidden: Vec<String>,
    researched: Vec<String>,
}

impl TechnologyPartition {
    /// Creates a partition from its three lists.
    pub fn new(catalog: Vec<String>, forbidden: Vec<String>, researched: Vec<String>) -> Self {
        Self {
            catalog,
            forbidden,
            researched,
        }
    }

    /// Creates a partition where every identifier starts in the catalog.
    pub fn from_catalog<I, S>(catalog: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(catalog.into_iter().map(Into::into).collect(), Vec::new(), Vec::new())
    }

    /// Returns the identifiers in `list`, in order.
    pub fn list(&self, list: TechList) -> &[String] {
        match list {
            TechList::Catalog => &self.catalog,
            TechList::Forbidden => &self.forbidden,
            TechList::Researched => &self.researched,
        }
    }

    fn list_mut(&mut self, list: TechList) -> &mut Vec<String> {
        match list {
            TechList::Catalog => &mut self.catalog,
            TechList::Forbidden => &mut self.forbidden,
            TechList::Researched => &mut self.researched,
        }
    }

    /// Returns the available technologies.
    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    /// Returns the forbidden technologies.
    pub fn forbidden(&self) -> &[String] {
        &self.forbidden
    }

    /// Returns the researched technologies.
    pub fn researched(&self) -> &[String] {
        &self.researched
    }

    /// Returns the list currently holding `id`.
    pub fn location(&self, id: &str) -> Option<TechList> {
        TechList::ALL
            .into_iter()
            .find(|&list| self.list(list).iter().any(|t| t == id))
    }

    /// Returns the total number of identifiers across all lists.
    pub fn len(&self) -> usize {
        self.catalog.len() + self.forbidden.len() + self.researched.len()
    }

    /// Returns true if all three lists are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over every identifier, catalog first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.catalog
            .iter()
            .chain(&self.forbidden)
            .chain(&self.researched)
            .map(String::as_str)
    }

    /// Returns identifiers that occur more than once across the lists.
    pub fn overlaps(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut repeated = Vec::new();
        for id in self.iter() {
            if !seen.insert(id) && !repeated.contains(&id) {
                repeated.push(id);
            }
        }
        repeated
    }

    /// Moves `id` from the `from` list to the tail of the `to` list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if `id` is not in `from`. The
    /// partition is unchanged in that case.
    pub fn move_technology(&mut self, id: &str, from: TechList, to: TechList) -> Result<()> {
        let Some(index) = self.list(from).iter().position(|t| t == id) else {
            return Err(Error::InvalidTransition {
                id: id.to_string(),
                from,
                to,
            });
        };
        let moved = self.list_mut(from).remove(index);
        self.list_mut(to).push(moved);
        Ok(())
    }

    /// Moves the identifier at `index` of `from` to the tail of `to`.
    ///
    /// Returns the moved identifier.
    pub fn move_at(&mut self, index: usize, from: TechList, to: TechList) -> Result<String> {
        if index >= self.list(from).len() {
            return Err(Error::InvalidTransition {
                id: format!("#{}", index),
                from,
                to,
            });
        }
        let moved = self.list_mut(from).remove(index);
        self.list_mut(to).push(moved.clone());
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> TechnologyPartition {
        TechnologyPartition::from_catalog(["A", "B", "C"])
    }

    #[test]
    fn test_move_catalog_to_forbidden() {
        let mut techs = abc();
        techs.move_technology("B", TechList::Catalog, TechList::Forbidden).unwrap();
        assert_eq!(techs.catalog(), ["A", "C"]);
        assert_eq!(techs.forbidden(), ["B"]);
        assert!(techs.researched().is_empty());
    }

    #[test]
    fn test_move_forbidden_to_researched_is_allowed() {
        let mut techs = abc();
        techs.move_technology("B", TechList::Catalog, TechList::Forbidden).unwrap();
        techs.move_technology("B", TechList::Forbidden, TechList::Researched).unwrap();
        assert!(techs.forbidden().is_empty());
        assert_eq!(techs.researched(), ["B"]);
    }

    #[test]
    fn test_move_absent_fails_without_change() {
        let mut techs = abc();
        let before = techs.clone();
        for from in TechList::ALL {
            let err = techs.move_technology("Z", from, TechList::Catalog).unwrap_err();
            assert!(matches!(err, Error::InvalidTransition { .. }));
        }
        assert_eq!(techs, before);
    }

    #[test]
    fn test_move_from_wrong_list_fails() {
        let mut techs = abc();
        let err = techs
            .move_technology("A", TechList::Forbidden, TechList::Catalog)
            .unwrap_err();
        assert!(
            matches!(err, Error::InvalidTransition { ref id, from: TechList::Forbidden, .. } if id == "A")
        );
    }

    #[test]
    fn test_round_trip_appends_to_tail() {
        let mut techs = abc();
        techs.move_technology("A", TechList::Catalog, TechList::Forbidden).unwrap();
        techs.move_technology("A", TechList::Forbidden, TechList::Catalog).unwrap();
        assert_eq!(techs.catalog(), ["B", "C", "A"]);
        assert!(techs.forbidden().is_empty());
    }

    #[test]
    fn test_move_at() {
        let mut techs = abc();
        let moved = techs.move_at(2, TechList::Catalog, TechList::Researched).unwrap();
        assert_eq!(moved, "C");
        assert_eq!(techs.researched(), ["C"]);
        assert!(techs.move_at(5, TechList::Catalog, TechList::Researched).is_err());
    }

    #[test]
    fn test_location_and_overlaps() {
        let techs = TechnologyPartition::new(
            vec!["A".into(), "B".into()],
            vec!["B".into()],
            vec!["C".into()],
        );
        assert_eq!(techs.location("C"), Some(TechList::Researched));
        assert_eq!(techs.location("Q"), None);
        assert_eq!(techs.overlaps(), vec!["B"]);
        assert!(abc().overlaps().is_empty());
    }

    #[test]
    fn test_tech_list_parse() {
        assert_eq!("Forbidden".parse::<TechList>().unwrap(), TechList::Forbidden);
        assert!("nowhere".parse::<TechList>().is_err());
    }
}
