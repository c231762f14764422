//! Closed rule tables for the game.
//!
//! Every layer (validator, round engine, views) reads these so there is a
//! single source of truth for player bounds, hostage counts, and timings.

use std::time::Duration;

/// Minimum players required to lock the lobby.
pub const MIN_PLAYERS: usize = 6;
/// Maximum players a game accepts.
pub const MAX_PLAYERS: usize = 30;

/// Supported values for the configured number of rounds.
pub const VALID_TOTAL_ROUNDS: [u8; 2] = [3, 5];

/// Length of the parlay window between leaders.
pub const PARLAY_DURATION: Duration = Duration::from_secs(30);

/// Consecutive tied polls before a leader is picked at random.
pub const MAX_TIE_COUNT: u8 = 3;

/// How many hostages each leader must send for a given player count and
/// 1-based round number.
pub fn hostage_count(player_count: usize, round: u8) -> u8 {
    match (player_count, round) {
        (0..=10, _) => 1,
        (11..=21, 1) => 2,
        (11..=21, _) => 1,
        (_, 1) => 3,
        (_, 2) => 2,
        (_, _) => 1,
    }
}

/// Votes needed to usurp a room leader.
pub fn usurp_threshold(room_size: usize) -> usize {
    room_size / 2 + 1
}

/// Default per-round durations for a given total: descending minutes so the
/// final round is the shortest.
pub fn default_round_durations(total_rounds: u8) -> Vec<Duration> {
    let minutes: &[u64] = match total_rounds {
        5 => &[5, 4, 3, 2, 1],
        _ => &[3, 2, 1],
    };
    minutes.iter().map(|m| Duration::from_secs(m * 60)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostage_table_small_games() {
        for round in 1..=5 {
            assert_eq!(hostage_count(6, round), 1);
            assert_eq!(hostage_count(10, round), 1);
        }
    }

    #[test]
    fn hostage_table_medium_games() {
        assert_eq!(hostage_count(11, 1), 2);
        assert_eq!(hostage_count(21, 1), 2);
        assert_eq!(hostage_count(11, 2), 1);
        assert_eq!(hostage_count(21, 3), 1);
    }

    #[test]
    fn hostage_table_large_games() {
        assert_eq!(hostage_count(22, 1), 3);
        assert_eq!(hostage_count(30, 1), 3);
        assert_eq!(hostage_count(22, 2), 2);
        assert_eq!(hostage_count(22, 3), 1);
        assert_eq!(hostage_count(22, 5), 1);
    }

    #[test]
    fn usurp_threshold_is_strict_majority() {
        assert_eq!(usurp_threshold(3), 2);
        assert_eq!(usurp_threshold(4), 3);
        assert_eq!(usurp_threshold(5), 3);
        assert_eq!(usurp_threshold(15), 8);
    }

    #[test]
    fn durations_match_round_count() {
        assert_eq!(default_round_durations(3).len(), 3);
        assert_eq!(default_round_durations(5).len(), 5);
        // Final round is always the shortest.
        let d = default_round_durations(5);
        assert!(d.windows(2).all(|w| w[0] > w[1]));
    }
}
