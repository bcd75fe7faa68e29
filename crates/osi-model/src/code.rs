//! Diagnostic code normalization.

/// SQL LIKE style multi-character wildcard used in definition codes.
pub const WILDCARD: char = '%';

/// Separator characters removed during normalization.
const SEPARATORS: &[char] = &['.'];

/// Normalize a diagnostic code for comparison.
///
/// Codes are trimmed, upper-cased and stripped of separators so that
/// `"a92.9"` and `"A929"` compare equal.
///
/// ```
/// use osi_model::normalize_code;
///
/// assert_eq!(normalize_code(" a92.9 "), "A929");
/// assert_eq!(normalize_code("J1%"), "J1%");
/// ```
pub fn normalize_code(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|ch| !SEPARATORS.contains(ch))
        .flat_map(char::to_uppercase)
        .collect()
}

/// Returns true when the code carries a `%` wildcard.
pub fn is_wildcard(code: &str) -> bool {
    code.contains(WILDCARD)
}
