//! Date of birth extraction.

use super::patterns::DATE_DMY;
use super::{ExtractionMatch, FieldExtractor};

/// DD/MM/YYYY extractor. Dates are not checked against the calendar.
#[derive(Debug, Default)]
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        DATE_DMY.find(text).map(|m| {
            ExtractionMatch::new(m.as_str().to_string(), m.as_str())
                .with_position(m.start(), m.end())
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DATE_DMY
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(m.as_str().to_string(), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Extract the first DD/MM/YYYY date from text.
pub fn extract_date_of_birth(text: &str) -> Option<String> {
    DateExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_labeled() {
        assert_eq!(
            extract_date_of_birth("DOB: 12/05/1990"),
            Some("12/05/1990".to_string())
        );
    }

    #[test]
    fn test_syntactic_only() {
        assert_eq!(
            extract_date_of_birth("99/99/9999"),
            Some("99/99/9999".to_string())
        );
    }

    #[test]
    fn test_other_separators_ignored() {
        assert_eq!(extract_date_of_birth("12.05.1990"), None);
        assert_eq!(extract_date_of_birth("12-05-1990"), None);
        assert_eq!(extract_date_of_birth("1/5/1990"), None);
    }

    #[test]
    fn test_first_date_wins() {
        let text = "Issue 01/01/2020\nDOB 12/05/1990";
        assert_eq!(extract_date_of_birth(text), Some("01/01/2020".to_string()));
        assert_eq!(DateExtractor::new().extract_all(text).len(), 2);
    }
}
