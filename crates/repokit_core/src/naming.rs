//! Identifier naming conventions shared by schema mapping and SQL assembly.
//!
//! # Responsibility
//! - Convert declared field names (camelCase/PascalCase) to snake_case columns.
//! - Check that table identifiers are safe to interpolate into SQL.
//!
//! # Invariants
//! - `to_snake_case` is idempotent for names that are already snake_case.
//! - Only ASCII letters participate in word-boundary detection.

use once_cell::sync::Lazy;
use regex::Regex;

static SQL_IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Converts a declared field name into its snake_case column name.
///
/// A word boundary is placed before an uppercase letter when either:
/// - it is not the first character and the previous character is not uppercase
///   (`createdAt` -> `created_at`), or
/// - it is not the first character and it starts a capitalized word
///   (`HTTPServer` -> `http_server`).
pub fn to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut result = String::with_capacity(input.len() + 4);

    for (index, current) in chars.iter().enumerate() {
        if index > 0 && current.is_ascii_uppercase() {
            let previous = chars[index - 1];
            let starts_word = chars
                .get(index + 1)
                .is_some_and(|next| next.is_ascii_lowercase());
            if !previous.is_ascii_uppercase() || starts_word {
                result.push('_');
            }
        }
        result.extend(current.to_lowercase());
    }

    result
}

/// Returns whether `name` is a plain SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_valid_identifier(name: &str) -> bool {
    SQL_IDENTIFIER_RE.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::{is_valid_identifier, to_snake_case};

    #[test]
    fn camel_case_splits_on_each_capital() {
        assert_eq!(to_snake_case("createdAt"), "created_at");
        assert_eq!(to_snake_case("firstNameInitial"), "first_name_initial");
    }

    #[test]
    fn acronyms_stay_together() {
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("userID"), "user_id");
        assert_eq!(to_snake_case("parseXMLDocument"), "parse_xml_document");
    }

    #[test]
    fn leading_capital_and_plain_names() {
        assert_eq!(to_snake_case("Name"), "name");
        assert_eq!(to_snake_case("title"), "title");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn digits_do_not_open_words() {
        assert_eq!(to_snake_case("address2"), "address2");
        assert_eq!(to_snake_case("line2Text"), "line2_text");
    }

    #[test]
    fn identifier_check_rejects_sql_fragments() {
        assert!(is_valid_identifier("books"));
        assert!(is_valid_identifier("_audit_log2"));
        assert!(!is_valid_identifier("2books"));
        assert!(!is_valid_identifier("books; DROP TABLE users"));
        assert!(!is_valid_identifier(""));
    }
}
