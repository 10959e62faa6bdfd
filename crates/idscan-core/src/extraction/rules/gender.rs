//! Gender token extraction.

use crate::models::record::Gender;

use super::patterns::{
    DEVANAGARI_FEMALE_TOKEN, DEVANAGARI_MALE_TOKEN, FEMALE_TOKEN, MALE_TOKEN,
};
use super::{ExtractionMatch, FieldExtractor};

/// Line-by-line gender classifier.
#[derive(Debug, Default)]
pub struct GenderExtractor;

impl GenderExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for GenderExtractor {
    type Output = ExtractionMatch<Gender>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        text.lines()
            .filter_map(|line| {
                classify_line(line).map(|gender| ExtractionMatch::new(gender, line.trim()))
            })
            .collect()
    }
}

/// Extract the gender from the first line that carries a gender token.
pub fn extract_gender(text: &str) -> Option<Gender> {
    GenderExtractor::new().extract(text).map(|m| m.value)
}

/// Classify a single line.
///
/// Latin tokens win over Devanagari ones on the same line, and "female" is
/// tested before "male" since it contains it.
pub fn classify_line(line: &str) -> Option<Gender> {
    let lower = line.to_lowercase();

    if lower.contains(FEMALE_TOKEN) {
        Some(Gender::Female)
    } else if lower.contains(MALE_TOKEN) {
        Some(Gender::Male)
    } else if line.contains(DEVANAGARI_FEMALE_TOKEN) {
        Some(Gender::Mahila)
    } else if line.contains(DEVANAGARI_MALE_TOKEN) {
        Some(Gender::Purush)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_female_not_misread_as_male() {
        assert_eq!(extract_gender("FEMALE"), Some(Gender::Female));
        assert_eq!(extract_gender("Female"), Some(Gender::Female));
    }

    #[test]
    fn test_male_case_insensitive() {
        assert_eq!(extract_gender("Sex: mAlE"), Some(Gender::Male));
    }

    #[test]
    fn test_first_line_wins() {
        let text = "Jane Doe\nMALE\nFEMALE";
        assert_eq!(extract_gender(text), Some(Gender::Male));
    }

    #[test]
    fn test_devanagari_tokens() {
        assert_eq!(extract_gender("लिंग: महिला"), Some(Gender::Mahila));
        assert_eq!(extract_gender("पुरुष"), Some(Gender::Purush));
    }

    #[test]
    fn test_bilingual_line_prefers_latin() {
        assert_eq!(extract_gender("पुरुष / MALE"), Some(Gender::Male));
        assert_eq!(extract_gender("महिला / FEMALE"), Some(Gender::Female));
    }

    #[test]
    fn test_devanagari_line_before_latin_line() {
        let text = "महिला\nMALE";
        assert_eq!(extract_gender(text), Some(Gender::Mahila));
    }

    #[test]
    fn test_no_token() {
        assert_eq!(extract_gender("Jane Doe\n12/05/1990"), None);
        assert_eq!(extract_gender(""), None);
    }
}
