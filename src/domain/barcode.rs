use std::sync::LazyLock;

use regex::Regex;

use super::ComponentId;

/// The longest run of ASCII digits at the very end of the text.
static TRAILING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+$").expect("trailing digit pattern is valid"));

/// Error returned when scanned text carries no component identifier.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("scanned code '{0}' does not contain a valid component ID")]
pub struct InvalidCodeError(String);

impl InvalidCodeError {
    /// The text that was scanned.
    #[must_use]
    pub fn scanned(&self) -> &str {
        &self.0
    }
}

/// Extracts the component identifier from scanned QR code text.
///
/// The identifier is the trailing run of decimal digits, leading zeros
/// included. Trailing whitespace (scanners often append a newline) is
/// ignored.
///
/// # Examples
///
/// ```
/// use labinv::domain::extract_component_id;
///
/// let id = extract_component_id("LAB-QR-000123").unwrap();
/// assert_eq!(id.as_str(), "000123");
///
/// assert!(extract_component_id("NO-DIGITS-HERE").is_err());
/// ```
///
/// # Errors
///
/// Returns `InvalidCodeError` if the text does not end in a digit.
pub fn extract_component_id(scanned: &str) -> Result<ComponentId, InvalidCodeError> {
    TRAILING_DIGITS
        .find(scanned.trim_end())
        .and_then(|digits| ComponentId::new(digits.as_str()).ok())
        .ok_or_else(|| InvalidCodeError(scanned.to_string()))
}
