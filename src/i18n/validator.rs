//! Engine output validation module.
//!
//! Checks the text an inference engine hands back before it is allowed into
//! the cache. Errors mark the output as malformed, which the translation
//! client treats exactly like a failed inference call. Warnings flag content
//! that probably did not survive translation (quantities, URLs) and are only
//! logged.

use regex::Regex;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that make the output unusable
    pub errors: Vec<String>,

    /// Non-critical warnings about potential issues
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Create a new empty validation report
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if the report has any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for engine output.
pub struct OutputValidator;

// Regex patterns for extraction (cached for performance)
static LANGUAGE_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();

impl OutputValidator {
    /// Validate engine output against the text that was sent.
    ///
    /// Errors:
    /// - output is empty or whitespace only
    /// - output is nothing but a FLORES-200 language tag (e.g. `tel_Telu`)
    ///
    /// Warnings:
    /// - numbers in the original are missing from the output
    /// - URLs in the original are missing from the output
    pub fn validate(original: &str, translated: &str) -> ValidationReport {
        let mut report = ValidationReport::new();

        if translated.trim().is_empty() {
            report.errors.push("Engine returned empty output".to_string());
            return report;
        }

        if Self::is_bare_language_tag(translated) {
            report.errors.push(format!(
                "Engine returned a bare language tag: {:?}",
                translated.trim()
            ));
            return report;
        }

        // Quantities ("250 kcal", "2 cups") must come through untouched
        let orig_numbers = Self::extract_numbers(original);
        let trans_numbers = Self::extract_numbers(translated);
        if orig_numbers != trans_numbers {
            report.warnings.push(format!(
                "Number mismatch: original has {:?}, translation has {:?}",
                orig_numbers, trans_numbers
            ));
        }

        let orig_urls = Self::extract_urls(original);
        let trans_urls = Self::extract_urls(translated);
        if orig_urls != trans_urls {
            report.warnings.push(format!(
                "URL mismatch: original has {} URLs, translation has {} URLs",
                orig_urls.len(),
                trans_urls.len()
            ));
        }

        report
    }

    fn is_bare_language_tag(text: &str) -> bool {
        let regex =
            LANGUAGE_TAG_REGEX.get_or_init(|| Regex::new(r"^[a-z]{3}_[A-Z][a-z]{3}$").unwrap());
        regex.is_match(text.trim())
    }

    /// Extract all numbers from text, sorted so reordering is not flagged
    fn extract_numbers(text: &str) -> Vec<String> {
        let regex = NUMBER_REGEX.get_or_init(|| Regex::new(r"\d+(?:[.,]\d+)?").unwrap());

        let mut numbers: Vec<String> = regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();
        numbers.sort();
        numbers
    }

    /// Extract all URLs from text
    fn extract_urls(text: &str) -> Vec<String> {
        let regex = URL_REGEX.get_or_init(|| Regex::new(r"https?://[^\s)\]]+").unwrap());

        regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Error Tests ====================

    #[test]
    fn test_empty_output_is_error() {
        let report = OutputValidator::validate("Recipes", "");
        assert!(report.has_errors());
        assert!(report.errors[0].contains("empty"));
    }

    #[test]
    fn test_whitespace_output_is_error() {
        let report = OutputValidator::validate("Recipes", "   \n");
        assert!(report.has_errors());
    }

    #[test]
    fn test_bare_language_tag_is_error() {
        let report = OutputValidator::validate("Recipes", "tel_Telu");
        assert!(report.has_errors());
        assert!(report.errors[0].contains("language tag"));
    }

    #[test]
    fn test_language_tag_inside_sentence_is_not_error() {
        let report = OutputValidator::validate("code eng_Latn", "కోడ్ eng_Latn");
        assert!(!report.has_errors());
    }

    // ==================== Number Tests ====================

    #[test]
    fn test_extract_numbers_sorted() {
        let numbers = OutputValidator::extract_numbers("12g protein, 250 kcal, 3.5g fat");
        assert_eq!(numbers, vec!["12", "250", "3.5"]);
    }

    #[test]
    fn test_missing_number_is_warning() {
        let report = OutputValidator::validate("250 kcal per serving", "ఒక్కో సర్వింగ్‌కు కేలరీలు");
        assert!(!report.has_errors());
        assert!(report.has_warnings());
        assert!(report.warnings[0].contains("Number mismatch"));
    }

    #[test]
    fn test_reordered_numbers_are_clean() {
        let report = OutputValidator::validate("2 cups rice, 3 cups water", "3 కప్పుల నీరు, 2 కప్పుల బియ్యం");
        assert!(report.is_clean());
    }

    // ==================== URL Tests ====================

    #[test]
    fn test_extract_urls_multiple() {
        let urls = OutputValidator::extract_urls("Check https://example.com and http://test.org");
        assert_eq!(urls, vec!["https://example.com", "http://test.org"]);
    }

    #[test]
    fn test_missing_url_is_warning() {
        let report = OutputValidator::validate("Recipe at https://example.com", "వంటకం");
        assert!(report.has_warnings());
        assert!(report.warnings.iter().any(|w| w.contains("URL mismatch")));
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_clean_translation() {
        let report = OutputValidator::validate("Trending Dishes", "ట్రెండింగ్ వంటకాలు");
        assert!(report.is_clean());
    }

    #[test]
    fn test_validation_report_with_error() {
        let mut report = ValidationReport::new();
        report.errors.push("Test error".to_string());

        assert!(!report.is_clean());
        assert!(report.has_errors());
        assert!(!report.has_warnings());
    }
}
