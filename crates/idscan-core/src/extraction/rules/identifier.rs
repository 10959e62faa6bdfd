//! 12-digit identifier extraction.
//!
//! Matching is purely syntactic; no checksum is computed.

use super::patterns::IDENTIFIER;
use super::{ExtractionMatch, FieldExtractor};

/// Identifier field extractor.
#[derive(Debug, Default)]
pub struct IdentifierExtractor;

impl IdentifierExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for IdentifierExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        IDENTIFIER
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(normalize_identifier(m.as_str()), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Extract the first identifier from text, spaces removed.
pub fn extract_identifier(text: &str) -> Option<String> {
    IdentifierExtractor::new().extract(text).map(|m| m.value)
}

/// Drop grouping spaces from an identifier.
pub fn normalize_identifier(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}
