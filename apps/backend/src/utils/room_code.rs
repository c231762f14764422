//! Room code generation for games.
//!
//! Room codes are 6-character strings from a confusion-reduced alphabet
//! (no `I`, `O`, `0`, `1`), displayed uppercase and accepted
//! case-insensitively.

use rand::distributions::Uniform;
use rand::prelude::*;
use rand::rngs::OsRng;

const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789"; // no I, O, 0, 1

/// Length of every room code.
pub const CODE_LENGTH: usize = 6;

/// Generate a candidate room code.
///
/// Draws each character from the reduced alphabet using the OS's
/// cryptographically secure RNG. Uniqueness against live games is the
/// store's job; collisions there are retried.
pub fn generate_room_code() -> String {
    let mut rng = OsRng;
    let dist = Uniform::from(0..ALPHABET.len());

    let mut code = String::with_capacity(CODE_LENGTH);
    for _ in 0..CODE_LENGTH {
        code.push(ALPHABET[dist.sample(&mut rng)] as char);
    }
    code
}

/// Canonical form used for lookups: uppercase.
pub fn normalize_code(code: &str) -> String {
    code.to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_have_correct_length() {
        assert_eq!(generate_room_code().len(), CODE_LENGTH);
    }

    #[test]
    fn codes_use_only_the_reduced_alphabet() {
        for _ in 0..100 {
            let code = generate_room_code();
            for c in code.bytes() {
                assert!(ALPHABET.contains(&c), "unexpected character {}", c as char);
            }
        }
    }

    #[test]
    fn codes_never_contain_confusable_characters() {
        for _ in 0..100 {
            let code = generate_room_code();
            assert!(!code.contains(['I', 'O', '0', '1']));
        }
    }

    #[test]
    fn normalize_uppercases() {
        assert_eq!(normalize_code("abc234"), "ABC234");
        assert_eq!(normalize_code("ABC234"), "ABC234");
    }
}
