//! Property tests over the pure domain: partitions, rule tables, and
//! journal ordering.

use backend::domain::ids::PlayerId;
use backend::domain::roles::{deal_roles, split_rooms};
use backend::domain::rules::{hostage_count, usurp_threshold};
use backend::domain::CharacterId;
use backend::events::journal::{EventJournal, RETAINED_EVENTS};
use backend::events::{GameEvent, Scope};
use proptest::prelude::*;
use time::OffsetDateTime;

proptest! {
    /// Room split is always a disjoint partition with sizes within one.
    #[test]
    fn split_rooms_partitions_evenly(count in 6usize..=30) {
        let players: Vec<PlayerId> = (0..count).map(|_| PlayerId::new()).collect();
        let (room_a, room_b) = split_rooms(&players);

        prop_assert_eq!(room_a.len() + room_b.len(), count);
        prop_assert!(room_b.len().abs_diff(room_a.len()) <= 1);

        let mut all: Vec<PlayerId> = room_a.iter().chain(room_b.iter()).copied().collect();
        all.sort();
        let mut expected = players.clone();
        expected.sort();
        prop_assert_eq!(all, expected);
    }

    /// Every card is dealt exactly once; burying removes exactly one.
    #[test]
    fn deal_is_a_permutation(count in 6usize..=30, bury in proptest::bool::ANY) {
        let players: Vec<PlayerId> = (0..count).map(|_| PlayerId::new()).collect();
        let roles: Vec<CharacterId> = (0..count + usize::from(bury))
            .map(|i| CharacterId::new(format!("role{i}")))
            .collect();

        let deal = deal_roles(&players, &roles, bury).unwrap();
        prop_assert_eq!(deal.assignments.len(), count);
        prop_assert_eq!(deal.buried.is_some(), bury);

        let mut dealt: Vec<&CharacterId> = deal.assignments.iter().map(|(_, c)| c).collect();
        if let Some(buried) = &deal.buried {
            dealt.push(buried);
        }
        let mut dealt: Vec<String> = dealt.iter().map(|c| c.as_str().to_string()).collect();
        dealt.sort();
        let mut expected: Vec<String> = roles.iter().map(|c| c.as_str().to_string()).collect();
        expected.sort();
        prop_assert_eq!(dealt, expected);
    }

    /// The hostage table stays within the documented band and never grows
    /// as rounds progress.
    #[test]
    fn hostage_counts_shrink_over_rounds(count in 6usize..=30) {
        let mut previous = u8::MAX;
        for round in 1..=5u8 {
            let current = hostage_count(count, round);
            prop_assert!((1..=3).contains(&current));
            prop_assert!(current <= previous);
            previous = current;
        }
    }

    /// Usurpation always needs a strict majority.
    #[test]
    fn usurp_threshold_is_majority(size in 1usize..=30) {
        let threshold = usurp_threshold(size);
        prop_assert!(threshold * 2 > size);
        prop_assert!((threshold - 1) * 2 <= size);
    }

    /// Journal sequences are gapless from 1 regardless of volume, and
    /// truncation preserves the numbering of what remains.
    #[test]
    fn journal_sequences_are_gapless(count in 1usize..=(RETAINED_EVENTS + 100)) {
        let mut journal = EventJournal::new();
        let now = OffsetDateTime::now_utc();
        for _ in 0..count {
            journal.append(Scope::Public, GameEvent::ParlayEnded, now);
        }

        prop_assert_eq!(journal.head_seq(), count as u64);
        let seqs: Vec<u64> = journal.since(0).map(|r| r.sequence_number).collect();
        for window in seqs.windows(2) {
            prop_assert_eq!(window[1], window[0] + 1);
        }
        if let Some(last) = seqs.last() {
            prop_assert_eq!(*last, count as u64);
        }
        prop_assert!(journal.len() <= RETAINED_EVENTS);
    }
}
