//! Postal (PIN) code extraction.

use super::patterns::{POSTAL_CODE, find_digit_bounded};
use super::{ExtractionMatch, FieldExtractor};

/// Standalone 6-digit run extractor. No regional validation.
#[derive(Debug, Default)]
pub struct PostalCodeExtractor;

impl PostalCodeExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for PostalCodeExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        find_digit_bounded(&POSTAL_CODE, text)
            .into_iter()
            .map(|m| {
                ExtractionMatch::new(m.as_str().to_string(), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Extract the first standalone 6-digit run.
pub fn extract_postal_code(text: &str) -> Option<String> {
    PostalCodeExtractor::new().extract(text).map(|m| m.value)
}
