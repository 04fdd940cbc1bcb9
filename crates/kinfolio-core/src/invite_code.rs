//! Family invite codes (`ABC-123`).
//!
//! Generation only produces candidates. Uniqueness is owned by the storage
//! layer's unique index; see `kinfolio_db::issue_invite_code` for the retry loop.

use rand::{CryptoRng, Rng};
use regex::Regex;
use std::sync::OnceLock;

const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";

fn invite_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{3}-[0-9]{3}$").expect("invite code regex is valid"))
}

/// Generate a candidate code from the thread-local CSPRNG.
pub fn generate_invite_code() -> String {
    generate_invite_code_with(&mut rand::rng())
}

/// Generate a candidate code from the given cryptographically secure generator.
pub fn generate_invite_code_with<R: Rng + CryptoRng>(rng: &mut R) -> String {
    let mut code = String::with_capacity(7);
    for _ in 0..3 {
        code.push(LETTERS[rng.random_range(0..LETTERS.len())] as char);
    }
    code.push('-');
    for _ in 0..3 {
        code.push(DIGITS[rng.random_range(0..DIGITS.len())] as char);
    }
    code
}

/// Whether `code` has the exact `ABC-123` shape.
pub fn is_valid_invite_code(code: &str) -> bool {
    invite_code_regex().is_match(code)
}

/// Trim and uppercase user input; `None` if the result is not a valid code.
pub fn normalize_invite_code(input: &str) -> Option<String> {
    let code = input.trim().to_uppercase();
    is_valid_invite_code(&code).then_some(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_generated_codes_match_format() {
        for _ in 0..500 {
            let code = generate_invite_code();
            assert!(is_valid_invite_code(&code), "bad code {}", code);
        }
    }

    #[test]
    fn test_seeded_generator_is_deterministic() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(
            generate_invite_code_with(&mut a),
            generate_invite_code_with(&mut b)
        );
    }

    #[test]
    fn test_codes_spread_over_the_space() {
        let codes: HashSet<String> = (0..200).map(|_| generate_invite_code()).collect();
        // 26^3 * 10^3 candidates; 200 draws colliding more than a handful means a broken source.
        assert!(codes.len() > 190);
    }

    #[test]
    fn test_format_validation() {
        assert!(is_valid_invite_code("ABC-123"));
        assert!(!is_valid_invite_code("abc-123"));
        assert!(!is_valid_invite_code("AB-1234"));
        assert!(!is_valid_invite_code("ABC123"));
        assert!(!is_valid_invite_code("ABC-12A"));
        assert!(!is_valid_invite_code(" ABC-123"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_invite_code(" abc-123 "), Some("ABC-123".to_string()));
        assert_eq!(normalize_invite_code("abc 123"), None);
    }
}
