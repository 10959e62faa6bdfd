//! Identity parser combining the per-field rules.

use std::time::Instant;

use tracing::{debug, info};

use crate::models::record::ExtractionResult;

use super::rules::{
    FieldExtractor, dates::DateExtractor, gender::GenderExtractor,
    identifier::IdentifierExtractor, name::name_above, postal::PostalCodeExtractor,
};
use super::IdentityExtractor;

/// Names of the fields an extraction can report, in output order.
pub const OUTPUT_FIELDS: [&str; 5] = ["identifier", "name", "dob", "gender", "pin_code"];

/// Rule-based identity field parser.
///
/// Each field is found independently with first-match-wins over the whole
/// text; only the name depends on another field (the date of birth).
#[derive(Debug, Default)]
pub struct IdentityParser {
    identifiers: IdentifierExtractor,
    dates: DateExtractor,
    genders: GenderExtractor,
    postal_codes: PostalCodeExtractor,
}

impl IdentityParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityExtractor for IdentityParser {
    fn extract(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();

        info!("Parsing identity fields from {} characters of text", text.len());

        let identifier = self.identifiers.extract(text).map(|m| m.value);
        let date_of_birth = self.dates.extract(text).map(|m| m.value);
        let name = date_of_birth
            .as_deref()
            .and_then(|date| name_above(text, date));
        let gender = self.genders.extract(text).map(|m| m.value);
        let postal_code = self.postal_codes.extract(text).map(|m| m.value);

        let result = ExtractionResult {
            success: true,
            identifier,
            name,
            date_of_birth,
            gender,
            postal_code,
            raw_text: text.to_string(),
        };

        debug!(
            "Extracted {}/{} fields in {}us",
            result.field_count(),
            OUTPUT_FIELDS.len(),
            start.elapsed().as_micros()
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{Gender, PageOutcome};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_card() {
        let text = "Jane Doe\n12/05/1990\n1234 5678 9012\nFEMALE\n560001";
        let result = IdentityParser::new().extract(text);

        assert_eq!(
            result,
            ExtractionResult {
                success: true,
                identifier: Some("123456789012".to_string()),
                name: Some("Jane Doe".to_string()),
                date_of_birth: Some("12/05/1990".to_string()),
                gender: Some(Gender::Female),
                postal_code: Some("560001".to_string()),
                raw_text: text.to_string(),
            }
        );
    }

    #[test]
    fn test_parse_empty_text() {
        let result = IdentityParser::new().extract("");
        assert_eq!(result, ExtractionResult::empty(""));
        assert!(result.success);
    }

    #[test]
    fn test_parse_bilingual_card() {
        let text = r#"
            भारत सरकार
            Government of India
            राहुल कुमार
            Rahul Kumar
            जन्म तिथि / DOB : 01/01/1985
            पुरुष / MALE

            4321 8765 2109
            मेरा आधार, मेरी पहचान
        "#;

        let result = IdentityParser::new().extract(text);

        assert_eq!(result.identifier.as_deref(), Some("432187652109"));
        assert_eq!(result.name.as_deref(), Some("Rahul Kumar"));
        assert_eq!(result.date_of_birth.as_deref(), Some("01/01/1985"));
        assert_eq!(result.gender, Some(Gender::Male));
        assert_eq!(result.postal_code, None);
        assert_eq!(result.raw_text, text);
    }

    #[test]
    fn test_raw_text_is_preserved_verbatim() {
        let text = "  noisy \r\n\t|| OCR ~~ output \n\n";
        let result = IdentityParser::new().extract(text);
        assert_eq!(result.raw_text, text);
        assert_eq!(result.field_count(), 0);
    }

    #[test]
    fn test_identifier_digits_are_not_postal_code() {
        let result = IdentityParser::new().extract("123456789012");
        assert_eq!(result.identifier.as_deref(), Some("123456789012"));
        assert_eq!(result.postal_code, None);
    }

    #[test]
    fn test_identifier_found_next_to_stray_digits() {
        let parser = IdentityParser::new();
        assert_eq!(
            parser.extract("Aadhaar 12345678901234").identifier.as_deref(),
            Some("123456789012")
        );
        assert_eq!(
            parser.extract("1234 5678 90123").identifier.as_deref(),
            Some("123456789012")
        );
    }

    #[test]
    fn test_extract_bytes_rejects_invalid_utf8() {
        let outcome = IdentityParser::new().extract_bytes(&[b'J', b'a', 0xff, 0xfe]);
        match outcome {
            PageOutcome::Failed(failure) => {
                assert!(!failure.success);
                assert!(failure.error.contains("offset 2"));
            }
            PageOutcome::Extracted(_) => panic!("expected a failure record"),
        }
    }

    #[test]
    fn test_extract_bytes_accepts_utf8() {
        let outcome = IdentityParser::new().extract_bytes("महिला\n".as_bytes());
        let result = outcome.extraction().unwrap();
        assert_eq!(result.gender, Some(Gender::Mahila));
    }
}
