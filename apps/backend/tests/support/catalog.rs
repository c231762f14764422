//! Test catalogue fixtures.

use std::collections::BTreeSet;

use backend::domain::character::{
    CharacterClass, CharacterDef, CharacterId, Team, WinCondition, WinPredicate,
};
use backend::domain::CharacterCatalog;

fn def(id: &str, team: Team, class: CharacterClass) -> CharacterDef {
    CharacterDef {
        id: id.into(),
        name: id.to_string(),
        team,
        class,
        description: format!("test character {id}"),
        complexity: 1,
        requires: BTreeSet::new(),
        mutually_exclusive: BTreeSet::new(),
        abilities: Vec::new(),
        win_conditions: Vec::new(),
    }
}

/// A catalogue with the two primaries, their backups, and generic team
/// filler cards that may repeat in a deck.
pub fn standard_catalog() -> CharacterCatalog {
    let mut president = def("president", Team::Blue, CharacterClass::Primary);
    president.win_conditions.push(WinCondition {
        predicate: WinPredicate::DifferentRoomFrom {
            character: "bomber".into(),
        },
        priority: 10,
        overrides_team_victory: false,
    });

    let mut bomber = def("bomber", Team::Red, CharacterClass::Primary);
    bomber.win_conditions.push(WinCondition {
        predicate: WinPredicate::SameRoomAs {
            character: "president".into(),
        },
        priority: 0,
        overrides_team_victory: true,
    });

    CharacterCatalog::from_definitions(vec![
        president,
        bomber,
        def("doctor", Team::Blue, CharacterClass::Backup),
        def("martyr", Team::Red, CharacterClass::Backup),
        def("blue_team", Team::Blue, CharacterClass::Regular),
        def("red_team", Team::Red, CharacterClass::Regular),
        def("gambler", Team::Grey, CharacterClass::Regular),
        def("clown", Team::Grey, CharacterClass::Regular),
    ])
    .expect("standard test catalog is valid")
}

/// A deck with no repeated cards, for tests that scan events for leaked
/// character ids. Supports up to the full catalogue.
pub fn distinct_deck(size: usize) -> Vec<CharacterId> {
    let all = [
        "president", "bomber", "doctor", "martyr", "blue_team", "red_team", "gambler", "clown",
    ];
    assert!(size <= all.len(), "only {} distinct cards exist", all.len());
    all[..size].iter().map(|id| CharacterId::from(*id)).collect()
}

/// A balanced deck of `size` cards including both primaries.
pub fn standard_deck(size: usize) -> Vec<CharacterId> {
    assert!(size >= 2, "deck needs room for both primaries");
    let mut deck: Vec<CharacterId> = vec!["president".into(), "bomber".into()];
    for i in 2..size {
        if i % 2 == 0 {
            deck.push("blue_team".into());
        } else {
            deck.push("red_team".into());
        }
    }
    deck
}
