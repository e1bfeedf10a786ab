// --- FILE: treetrim-lib/src/ordering.rs ---

//! Finder-compatible name ordering.

use std::cmp::Ordering;

/// Leading characters with a fixed position in Finder's sort order.
/// Lower rank sorts first; anything not listed falls through to the digit
/// or "other" tiers.
const SPECIAL_CHAR_RANKS: &[(char, u8)] = &[
    ('_', 10),
    ('[', 11),
    (']', 12),
    ('.', 13),
    ('-', 14),
    ('~', 15),
    ('`', 20),
    ('!', 21),
    ('@', 22),
    ('#', 23),
    ('$', 24),
    ('%', 25),
    ('^', 26),
    ('&', 27),
    ('*', 28),
    ('(', 29),
    (')', 30),
    ('+', 31),
    ('{', 32),
    ('}', 33),
    ('|', 34),
    (':', 35),
    ('"', 36),
    ('<', 37),
    ('>', 38),
    ('?', 39),
    ('\\', 40),
    (';', 41),
    ('\'', 42),
    (',', 43),
    ('/', 44),
    (' ', 45),
];

fn special_rank(c: char) -> Option<u8> {
    SPECIAL_CHAR_RANKS
        .iter()
        .find(|(special, _)| *special == c)
        .map(|(_, rank)| *rank)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    Empty,
    Special,
    Digit,
    Other,
    Absent,
}

/// Sort key reproducing Finder's ordering of file and folder names.
///
/// Keys compare by tier (empty, special character, digit, everything else,
/// absent), then by special-character rank, then case-insensitively by the
/// full name. Names equal up to case are finally ordered by their raw bytes,
/// so the order is strict and independent of directory listing order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrderingKey {
    tier: Tier,
    rank: u8,
    folded: String,
    raw: String,
}

impl OrderingKey {
    pub fn of(name: &str) -> Self {
        let Some(first) = name.chars().next() else {
            return Self::with_tier(Tier::Empty, 0, "");
        };

        if let Some(rank) = special_rank(first) {
            Self::with_tier(Tier::Special, rank, name)
        } else if first.is_ascii_digit() {
            Self::with_tier(Tier::Digit, 0, name)
        } else {
            Self::with_tier(Tier::Other, 0, name)
        }
    }

    /// Key for a missing name; sorts after every present name.
    pub fn absent() -> Self {
        Self::with_tier(Tier::Absent, 0, "")
    }

    pub fn of_optional(name: Option<&str>) -> Self {
        name.map_or_else(Self::absent, Self::of)
    }

    fn with_tier(tier: Tier, rank: u8, name: &str) -> Self {
        Self {
            tier,
            rank,
            folded: name.to_lowercase(),
            raw: name.to_string(),
        }
    }
}

/// Compares two names in Finder order.
pub fn finder_cmp(a: &str, b: &str) -> Ordering {
    OrderingKey::of(a).cmp(&OrderingKey::of(b))
}

/// Sorts names in place in Finder order.
pub fn sort_names<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by_cached_key(|name| OrderingKey::of(name.as_ref()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut owned: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        sort_names(&mut owned);
        owned
    }

    #[test]
    fn special_characters_then_digits_then_letters() {
        let result = sorted(&["beta", "2nd", "_private", "Alpha", "[draft]", ".config", "10x"]);
        assert_eq!(
            result,
            vec!["_private", "[draft]", ".config", "10x", "2nd", "Alpha", "beta"]
        );
    }

    #[test]
    fn special_rank_table_order_is_respected() {
        let result = sorted(&[" space", "~tilde", "-dash", "]close", "!bang", "_under"]);
        assert_eq!(
            result,
            vec!["_under", "]close", "-dash", "~tilde", "!bang", " space"]
        );
    }

    #[test]
    fn letters_compare_case_insensitively() {
        let result = sorted(&["banana", "Apple", "cherry", "apricot"]);
        assert_eq!(result, vec!["Apple", "apricot", "banana", "cherry"]);
    }

    #[test]
    fn empty_sorts_first_and_absent_sorts_last() {
        assert!(OrderingKey::of("") < OrderingKey::of("_"));
        assert!(OrderingKey::of("zzz") < OrderingKey::absent());
        assert_eq!(OrderingKey::of_optional(None), OrderingKey::absent());
        assert_eq!(OrderingKey::of_optional(Some("a")), OrderingKey::of("a"));
    }

    #[test]
    fn sorting_is_deterministic_regardless_of_input_order() {
        let forward = sorted(&["Readme", "README", "readme", "a", "_b", "1"]);
        let backward = sorted(&["1", "_b", "a", "readme", "README", "Readme"]);
        assert_eq!(forward, backward);
        let mut again = forward.clone();
        sort_names(&mut again);
        assert_eq!(again, forward);
    }

    #[test]
    fn only_decimal_digits_open_the_digit_tier() {
        // Vulgar fractions and roman numerals are numeric but not digits.
        let result = sorted(&["\u{bd} cup", "\u{216b} chapter", "7 days", "apple"]);
        assert_eq!(
            result,
            vec!["7 days", "apple", "\u{bd} cup", "\u{216b} chapter"]
        );
    }

    #[test]
    fn unlisted_punctuation_falls_into_other_tier() {
        // '=' has no rank, so it sorts with letters by its folded name.
        assert_eq!(finder_cmp("=eq", "1one"), Ordering::Greater);
        assert_eq!(finder_cmp("=eq", "alpha"), Ordering::Less);
    }
}
