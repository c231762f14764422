//! Role distribution and room assignment.
//!
//! Shuffles use fresh OS randomness for every swap; the deal must not be
//! reproducible from anything that leaves the process.

use rand::rngs::OsRng;
use rand::Rng;

use crate::domain::character::CharacterId;
use crate::domain::ids::PlayerId;
use crate::errors::domain::DomainError;
use crate::errors::error_code::ErrorCode;

/// Fisher–Yates with a cryptographically strong uniform draw per swap.
pub fn crypto_shuffle<T>(items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = OsRng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Uniform random pick, used for breaking repeated election ties.
pub fn pick_random<T: Copy>(items: &[T]) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    Some(items[OsRng.gen_range(0..items.len())])
}

/// Outcome of dealing the selected deck to the players.
#[derive(Debug, Clone)]
pub struct RoleDeal {
    /// player -> character, one entry per player.
    pub assignments: Vec<(PlayerId, CharacterId)>,
    /// Set exactly when the deck carried one extra card to bury.
    pub buried: Option<CharacterId>,
    /// The full shuffled order, for private diagnostics.
    pub shuffled_deck: Vec<CharacterId>,
}

/// Shuffle `selected_roles` and assign one to each player.
///
/// `player_ids` must already be in a reproducible order; assignment is
/// positional after the shuffle. With `bury_card` the deck carries one
/// extra card, which ends up buried instead of assigned.
pub fn deal_roles(
    player_ids: &[PlayerId],
    selected_roles: &[CharacterId],
    bury_card: bool,
) -> Result<RoleDeal, DomainError> {
    let expected = player_ids.len() + usize::from(bury_card);
    if selected_roles.len() != expected {
        return Err(DomainError::validation(
            ErrorCode::RoleCountMismatch,
            format!(
                "deck has {} roles for {} players (bury_card = {bury_card})",
                selected_roles.len(),
                player_ids.len()
            ),
        ));
    }

    let mut deck = selected_roles.to_vec();
    crypto_shuffle(&mut deck);
    let shuffled_deck = deck.clone();

    let buried = if bury_card { deck.pop() } else { None };

    let assignments = player_ids
        .iter()
        .copied()
        .zip(deck.into_iter())
        .collect();

    Ok(RoleDeal {
        assignments,
        buried,
        shuffled_deck,
    })
}

/// Shuffle the players and split them down the middle: the first half to
/// room A, the rest to room B. With an odd count, room B is the larger.
pub fn split_rooms(player_ids: &[PlayerId]) -> (Vec<PlayerId>, Vec<PlayerId>) {
    let mut shuffled = player_ids.to_vec();
    crypto_shuffle(&mut shuffled);
    let mid = shuffled.len() / 2;
    let room_b = shuffled.split_off(mid);
    (shuffled, room_b)
}
