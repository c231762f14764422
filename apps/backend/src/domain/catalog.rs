//! Character catalogue: validated once at startup, immutable thereafter.

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::character::{CharacterClass, CharacterDef, CharacterId, Team};

/// A catalogue rejection. Raised at startup, before any game runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("character with empty id")]
    EmptyId,
    #[error("duplicate character id: {0}")]
    DuplicateId(CharacterId),
    #[error("character {id}: complexity {complexity} outside 1..=5")]
    ComplexityOutOfRange { id: CharacterId, complexity: u8 },
    #[error("character {id}: `requires` references unknown character {missing}")]
    UnknownRequirement {
        id: CharacterId,
        missing: CharacterId,
    },
    #[error("character {id}: `mutually_exclusive` references unknown character {missing}")]
    UnknownExclusion {
        id: CharacterId,
        missing: CharacterId,
    },
}

/// Immutable lookup over the loaded character definitions.
///
/// Built once from embedder-supplied definitions and then shared behind an
/// `Arc`; a changed catalogue requires a restart.
#[derive(Debug, Clone)]
pub struct CharacterCatalog {
    by_id: HashMap<CharacterId, CharacterDef>,
    /// Ids of `class = PRIMARY` cards, in load order. Every deck must
    /// contain all of them.
    primaries: Vec<CharacterId>,
}

impl CharacterCatalog {
    /// Validate and index the supplied definitions.
    pub fn from_definitions(defs: Vec<CharacterDef>) -> Result<Self, CatalogError> {
        let mut by_id: HashMap<CharacterId, CharacterDef> = HashMap::with_capacity(defs.len());
        let mut primaries = Vec::new();

        for def in defs {
            if def.id.as_str().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if !(1..=5).contains(&def.complexity) {
                return Err(CatalogError::ComplexityOutOfRange {
                    id: def.id.clone(),
                    complexity: def.complexity,
                });
            }
            if def.class == CharacterClass::Primary {
                primaries.push(def.id.clone());
            }
            if by_id.insert(def.id.clone(), def.clone()).is_some() {
                return Err(CatalogError::DuplicateId(def.id));
            }
        }

        // Cross-references are checked after the full index exists.
        for def in by_id.values() {
            for required in &def.requires {
                if !by_id.contains_key(required) {
                    return Err(CatalogError::UnknownRequirement {
                        id: def.id.clone(),
                        missing: required.clone(),
                    });
                }
            }
            for excluded in &def.mutually_exclusive {
                if !by_id.contains_key(excluded) {
                    return Err(CatalogError::UnknownExclusion {
                        id: def.id.clone(),
                        missing: excluded.clone(),
                    });
                }
            }
        }

        Ok(Self { by_id, primaries })
    }

    pub fn get(&self, id: &CharacterId) -> Option<&CharacterDef> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &CharacterId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Ids of all `class = PRIMARY` cards. Decks are valid only when all of
    /// them are present.
    pub fn primaries(&self) -> &[CharacterId] {
        &self.primaries
    }

    pub fn by_team(&self, team: Team) -> Vec<&CharacterDef> {
        self.by_id.values().filter(|d| d.team == team).collect()
    }

    pub fn with_max_complexity(&self, max: u8) -> Vec<&CharacterDef> {
        self.by_id
            .values()
            .filter(|d| d.complexity <= max)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn def(id: &str, team: Team, class: CharacterClass) -> CharacterDef {
        CharacterDef {
            id: id.into(),
            name: id.to_string(),
            team,
            class,
            description: String::new(),
            complexity: 1,
            requires: BTreeSet::new(),
            mutually_exclusive: BTreeSet::new(),
            abilities: Vec::new(),
            win_conditions: Vec::new(),
        }
    }

    #[test]
    fn builds_and_indexes_primaries() {
        let catalog = CharacterCatalog::from_definitions(vec![
            def("president", Team::Blue, CharacterClass::Primary),
            def("bomber", Team::Red, CharacterClass::Primary),
            def("doctor", Team::Blue, CharacterClass::Backup),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.primaries(),
            &["president".into(), "bomber".into()][..]
        );
        assert!(catalog.get(&"doctor".into()).is_some());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = CharacterCatalog::from_definitions(vec![
            def("spy", Team::Red, CharacterClass::Regular),
            def("spy", Team::Red, CharacterClass::Regular),
        ])
        .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId("spy".into()));
    }

    #[test]
    fn rejects_complexity_out_of_range() {
        let mut bad = def("spy", Team::Red, CharacterClass::Regular);
        bad.complexity = 6;
        let err = CharacterCatalog::from_definitions(vec![bad]).unwrap_err();
        assert!(matches!(err, CatalogError::ComplexityOutOfRange { .. }));
    }

    #[test]
    fn rejects_dangling_requires() {
        let mut dependent = def("engineer", Team::Red, CharacterClass::Regular);
        dependent.requires.insert("bomber".into());
        let err = CharacterCatalog::from_definitions(vec![dependent]).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownRequirement { .. }));
    }

    #[test]
    fn rejects_dangling_exclusions() {
        let mut lonely = def("hermit", Team::Grey, CharacterClass::Regular);
        lonely.mutually_exclusive.insert("ghost".into());
        let err = CharacterCatalog::from_definitions(vec![lonely]).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownExclusion { .. }));
    }

    #[test]
    fn filters_by_team_and_complexity() {
        let mut complex = def("mastermind", Team::Red, CharacterClass::Regular);
        complex.complexity = 5;
        let catalog = CharacterCatalog::from_definitions(vec![
            def("president", Team::Blue, CharacterClass::Primary),
            complex,
        ])
        .unwrap();

        assert_eq!(catalog.by_team(Team::Red).len(), 1);
        assert_eq!(catalog.with_max_complexity(2).len(), 1);
    }
}
