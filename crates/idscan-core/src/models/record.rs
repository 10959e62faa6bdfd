//! Extraction records emitted per page or image.

use serde::{Deserialize, Serialize};

/// Gender token recognized on the document.
///
/// Latin tokens are normalized to `Male`/`Female`; Devanagari tokens keep
/// their own labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "Male")]
    Male,
    #[serde(rename = "Female")]
    Female,
    #[serde(rename = "पुरुष")]
    Purush,
    #[serde(rename = "महिला")]
    Mahila,
}

impl Gender {
    /// Output label.
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Purush => "पुरुष",
            Gender::Mahila => "महिला",
        }
    }

    /// Whether the token denotes the female gender, in either script.
    pub fn is_female(&self) -> bool {
        matches!(self, Gender::Female | Gender::Mahila)
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Fields extracted from one page of recognized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Always true for a completed extraction, however many fields were found.
    pub success: bool,

    /// 12-digit identifier with interior spaces removed.
    pub identifier: Option<String>,

    /// Line directly above the date of birth.
    pub name: Option<String>,

    /// Date of birth as written (DD/MM/YYYY).
    #[serde(rename = "dob")]
    pub date_of_birth: Option<String>,

    pub gender: Option<Gender>,

    /// 6-digit postal (PIN) code.
    #[serde(rename = "pin_code")]
    pub postal_code: Option<String>,

    /// The recognized text the fields were extracted from.
    pub raw_text: String,
}

impl ExtractionResult {
    /// A result with no fields found.
    pub fn empty(raw_text: impl Into<String>) -> Self {
        Self {
            success: true,
            identifier: None,
            name: None,
            date_of_birth: None,
            gender: None,
            postal_code: None,
            raw_text: raw_text.into(),
        }
    }

    /// Number of fields that were found.
    pub fn field_count(&self) -> usize {
        [
            self.identifier.is_some(),
            self.name.is_some(),
            self.date_of_birth.is_some(),
            self.gender.is_some(),
            self.postal_code.is_some(),
        ]
        .iter()
        .filter(|found| **found)
        .count()
    }
}

/// A processing fault reported as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub success: bool,
    pub error: String,
}

impl FailureRecord {
    pub fn new(error: impl ToString) -> Self {
        Self {
            success: false,
            error: error.to_string(),
        }
    }
}

/// Outcome for a single page or image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PageOutcome {
    Extracted(ExtractionResult),
    Failed(FailureRecord),
}

impl PageOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PageOutcome::Extracted(_))
    }

    /// The extraction result, if the page succeeded.
    pub fn extraction(&self) -> Option<&ExtractionResult> {
        match self {
            PageOutcome::Extracted(result) => Some(result),
            PageOutcome::Failed(_) => None,
        }
    }
}

impl From<ExtractionResult> for PageOutcome {
    fn from(result: ExtractionResult) -> Self {
        PageOutcome::Extracted(result)
    }
}

impl From<FailureRecord> for PageOutcome {
    fn from(failure: FailureRecord) -> Self {
        PageOutcome::Failed(failure)
    }
}

/// A page outcome, tagged with its 1-based page number for PDF input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    #[serde(flatten)]
    pub outcome: PageOutcome,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl PageRecord {
    /// Record for a standalone image.
    pub fn untagged(outcome: impl Into<PageOutcome>) -> Self {
        Self {
            outcome: outcome.into(),
            page: None,
        }
    }

    /// Record for a PDF page.
    pub fn for_page(page: u32, outcome: impl Into<PageOutcome>) -> Self {
        Self {
            outcome: outcome.into(),
            page: Some(page),
        }
    }
}

/// Everything produced for one input file.
///
/// Serializes as a bare record for single-page input and as an array for
/// multi-page PDFs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Single(PageRecord),
    Pages(Vec<PageRecord>),
}

impl Report {
    /// Collapse per-page records: one record is emitted directly.
    pub fn from_pages(mut pages: Vec<PageRecord>) -> Self {
        if pages.len() == 1 {
            Report::Single(pages.remove(0))
        } else {
            Report::Pages(pages)
        }
    }

    /// Report for a fault that stopped processing before any page was read.
    pub fn failure(error: impl ToString) -> Self {
        Report::Single(PageRecord::untagged(FailureRecord::new(error)))
    }

    pub fn records(&self) -> &[PageRecord] {
        match self {
            Report::Single(record) => std::slice::from_ref(record),
            Report::Pages(records) => records,
        }
    }

    /// True when every page succeeded.
    pub fn is_success(&self) -> bool {
        self.records().iter().all(|r| r.outcome.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> ExtractionResult {
        ExtractionResult {
            success: true,
            identifier: Some("123456789012".to_string()),
            name: Some("Jane Doe".to_string()),
            date_of_birth: Some("12/05/1990".to_string()),
            gender: Some(Gender::Female),
            postal_code: Some("560001".to_string()),
            raw_text: "raw".to_string(),
        }
    }

    #[test]
    fn test_extraction_json_keys() {
        let value = serde_json::to_value(PageRecord::untagged(sample())).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "identifier": "123456789012",
                "name": "Jane Doe",
                "dob": "12/05/1990",
                "gender": "Female",
                "pin_code": "560001",
                "raw_text": "raw",
            })
        );
    }

    #[test]
    fn test_absent_fields_are_null() {
        let value = serde_json::to_value(ExtractionResult::empty("")).unwrap();
        assert_eq!(value["identifier"], serde_json::Value::Null);
        assert_eq!(value["gender"], serde_json::Value::Null);
        assert_eq!(value["raw_text"], "");
        assert_eq!(value["success"], true);
    }

    #[test]
    fn test_devanagari_gender_label() {
        let value = serde_json::to_value(Gender::Mahila).unwrap();
        assert_eq!(value, json!("महिला"));
        assert!(Gender::Mahila.is_female());
        assert!(!Gender::Purush.is_female());
    }

    #[test]
    fn test_failure_record_has_no_fields() {
        let value = serde_json::to_value(Report::failure("File not found: x.pdf")).unwrap();
        assert_eq!(value, json!({"success": false, "error": "File not found: x.pdf"}));
    }

    #[test]
    fn test_single_page_is_not_wrapped() {
        let report = Report::from_pages(vec![PageRecord::for_page(1, sample())]);
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.is_object());
        assert_eq!(value["page"], 1);
    }

    #[test]
    fn test_multi_page_is_array() {
        let report = Report::from_pages(vec![
            PageRecord::for_page(1, sample()),
            PageRecord::for_page(2, FailureRecord::new("OCR error")),
        ]);
        let value = serde_json::to_value(&report).unwrap();
        let pages = value.as_array().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0]["page"], 1);
        assert_eq!(pages[1]["page"], 2);
        assert_eq!(pages[1]["success"], false);
        assert!(!report.is_success());
    }

    #[test]
    fn test_field_count() {
        assert_eq!(sample().field_count(), 5);
        assert_eq!(ExtractionResult::empty("x").field_count(), 0);
    }
}
