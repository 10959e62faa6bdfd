//! Name extraction by proximity to the date of birth.
//!
//! Identity cards print the holder's name on the line directly above the
//! birth date. This is a layout heuristic, not a labeled-field lookup.

use super::dates::DateExtractor;
use super::{ExtractionMatch, FieldExtractor};

/// Extracts the line above each recognized date.
#[derive(Debug, Default)]
pub struct NameExtractor {
    dates: DateExtractor,
}

impl NameExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FieldExtractor for NameExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let date = self.dates.extract(text)?;
        name_above(text, &date.value).map(|name| ExtractionMatch::new(name.clone(), name))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.dates
            .extract_all(text)
            .iter()
            .filter_map(|date| name_above(text, &date.value))
            .map(|name| ExtractionMatch::new(name.clone(), name))
            .collect()
    }
}

/// Extract the name printed above the first date of birth.
pub fn extract_name(text: &str) -> Option<String> {
    NameExtractor::new().extract(text).map(|m| m.value)
}

/// The non-blank line preceding the first line that contains `date`.
///
/// Lines are trimmed and blank lines skipped. Returns `None` when no line
/// contains the date or the date sits on the first non-blank line.
pub fn name_above(text: &str, date: &str) -> Option<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let index = lines.iter().position(|line| line.contains(date))?;
    index
        .checked_sub(1)
        .map(|previous| lines[previous].to_string())
}
