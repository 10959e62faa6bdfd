//! WASM bindings for identity document field extraction.
//!
//! OCR runs on the JavaScript side; these bindings extract fields from the
//! recognized text in browsers and Node.js.

use wasm_bindgen::prelude::*;

use idscan_core::extraction::rules;
use idscan_core::{IdentityExtractor, IdentityParser, PageRecord};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Extract identity fields from recognized text.
///
/// Returns an object with `success`, `identifier`, `name`, `dob`, `gender`,
/// `pin_code` and `raw_text`.
#[wasm_bindgen]
pub fn extract_fields(text: &str) -> Result<JsValue, JsValue> {
    let result = IdentityParser::new().extract(text);
    serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract identity fields and return them as a JSON string.
#[wasm_bindgen]
pub fn extract_fields_json(text: &str) -> Result<String, JsValue> {
    fields_json(text).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn fields_json(text: &str) -> serde_json::Result<String> {
    let record = PageRecord::untagged(IdentityParser::new().extract(text));
    serde_json::to_string(&record)
}

/// Find the 12-digit identifier, without interior spaces.
#[wasm_bindgen]
pub fn find_identifier(text: &str) -> Option<String> {
    rules::extract_identifier(text)
}

/// Find the 6-digit PIN code.
#[wasm_bindgen]
pub fn find_pin_code(text: &str) -> Option<String> {
    rules::extract_postal_code(text)
}

/// Identity extractor class for browser use.
#[wasm_bindgen]
pub struct IdentityExtractorJs {
    parser: IdentityParser,
    lines: Vec<String>,
}

#[wasm_bindgen]
impl IdentityExtractorJs {
    /// Create a new extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: IdentityParser::new(),
            lines: Vec::new(),
        }
    }

    /// Append a recognized line, e.g. one text box from a browser OCR engine.
    #[wasm_bindgen]
    pub fn add_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    /// Drop all collected lines.
    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Collected lines joined with newlines.
    #[wasm_bindgen]
    pub fn get_text(&self) -> String {
        self.lines.join("\n")
    }

    /// Extract fields from the collected lines.
    #[wasm_bindgen]
    pub fn extract(&self) -> Result<JsValue, JsValue> {
        let result = self.parser.extract(&self.get_text());
        serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Extract fields from raw recognizer output bytes.
    ///
    /// Bytes that are not UTF-8 text produce a `{success: false, error}` object.
    #[wasm_bindgen]
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<JsValue, JsValue> {
        let outcome = self.parser.extract_bytes(bytes);
        serde_wasm_bindgen::to_value(&outcome).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for IdentityExtractorJs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_find_identifier() {
        assert_eq!(
            find_identifier("Aadhaar 1234 5678 9012").as_deref(),
            Some("123456789012")
        );
        assert_eq!(find_identifier("no number"), None);
    }

    #[wasm_bindgen_test]
    fn test_fields_json() {
        let json = fields_json("Jane Doe\n12/05/1990\nFEMALE").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "Jane Doe");
        assert_eq!(value["gender"], "Female");
        assert_eq!(value["pin_code"], serde_json::Value::Null);
    }

    #[wasm_bindgen_test]
    fn test_collected_lines() {
        let mut extractor = IdentityExtractorJs::new();
        extractor.add_line("Jane Doe");
        extractor.add_line("12/05/1990");
        assert_eq!(extractor.get_text(), "Jane Doe\n12/05/1990");
        extractor.clear();
        assert_eq!(extractor.get_text(), "");
    }
}
