//! Rule-based field extractors for identity documents.

pub mod dates;
pub mod gender;
pub mod identifier;
pub mod name;
pub mod patterns;
pub mod postal;

pub use dates::{DateExtractor, extract_date_of_birth};
pub use gender::{GenderExtractor, classify_line, extract_gender};
pub use identifier::{IdentifierExtractor, extract_identifier, normalize_identifier};
pub use name::{NameExtractor, extract_name, name_above};
pub use postal::{PostalCodeExtractor, extract_postal_code};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field, in document order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A field value together with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte span in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
