//! Common regex patterns and tokens for identity document extraction.

use lazy_static::lazy_static;
use regex::{Match, Regex};

lazy_static! {
    // 12-digit identifier, optionally grouped 4-4-4 by single spaces
    pub static ref IDENTIFIER: Regex = Regex::new(
        r"[0-9]{4} ?[0-9]{4} ?[0-9]{4}"
    ).unwrap();

    // Date of birth (DD/MM/YYYY)
    pub static ref DATE_DMY: Regex = Regex::new(
        r"[0-9]{2}/[0-9]{2}/[0-9]{4}"
    ).unwrap();

    // Postal (PIN) code
    pub static ref POSTAL_CODE: Regex = Regex::new(
        r"[0-9]{6}"
    ).unwrap();
}

// Gender tokens. "female" contains "male", so it must be tested first.
pub const FEMALE_TOKEN: &str = "female";
pub const MALE_TOKEN: &str = "male";
pub const DEVANAGARI_FEMALE_TOKEN: &str = "महिला";
pub const DEVANAGARI_MALE_TOKEN: &str = "पुरुष";

/// Find non-overlapping matches of `re` that are not adjacent to another digit.
///
/// A match rejected because of a neighbouring digit is retried one byte
/// further, so a valid run later in the same line is still found.
pub fn find_digit_bounded<'t>(re: &Regex, text: &'t str) -> Vec<Match<'t>> {
    let mut matches = Vec::new();
    let mut start = 0;

    while start <= text.len() {
        let Some(m) = re.find_at(text, start) else {
            break;
        };

        let digit_before = text[..m.start()]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_digit());
        let digit_after = text[m.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit());

        if !digit_before && !digit_after {
            start = m.end();
            matches.push(m);
        } else {
            // Matches always begin with an ASCII digit, so +1 is a char boundary.
            start = m.start() + 1;
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_rejects_longer_runs() {
        let found = find_digit_bounded(&POSTAL_CODE, "1234567");
        assert!(found.is_empty());
    }

    #[test]
    fn test_bounded_accepts_edges_and_separators() {
        let found: Vec<&str> = find_digit_bounded(&POSTAL_CODE, "560001 x 110011")
            .iter()
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["560001", "110011"]);
    }

    #[test]
    fn test_bounded_adjacent_runs_separated_by_one_char() {
        let found: Vec<&str> = find_digit_bounded(&POSTAL_CODE, "123456 654321")
            .iter()
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["123456", "654321"]);
    }

    #[test]
    fn test_bounded_handles_multibyte_neighbours() {
        let found = find_digit_bounded(&POSTAL_CODE, "पिन560001।");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].as_str(), "560001");
    }
}
