//! Identifier sanitization.

use regex::Regex;
use std::sync::LazyLock;

static NON_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap_or_else(|_| unreachable!()));

/// Removes every character outside `[A-Za-z0-9_]`.
///
/// Applied to every table or column name before it is interpolated into
/// SQL text. Never fails; empty input yields empty output.
///
/// # Examples
///
/// ```
/// use tablegrid::query::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("users; DROP TABLE x"), "usersDROPTABLEx");
/// assert_eq!(sanitize_identifier("created_at"), "created_at");
/// ```
#[must_use]
pub fn sanitize_identifier(name: &str) -> String {
    NON_IDENTIFIER.replace_all(name, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("", "" ; "empty")]
    #[test_case("user_name", "user_name" ; "already clean")]
    #[test_case("Col9", "Col9" ; "mixed case digits")]
    #[test_case("name--", "name" ; "sql comment")]
    #[test_case("a.b", "ab" ; "qualified name")]
    #[test_case("`id`", "id" ; "backticks")]
    #[test_case("\"id\"", "id" ; "double quotes")]
    #[test_case("id) OR (1=1", "idOR11" ; "boolean injection")]
    #[test_case("naïve", "nave" ; "non ascii letter")]
    #[test_case("名前", "" ; "only non ascii")]
    #[test_case(" spaced name ", "spacedname" ; "whitespace")]
    fn test_sanitize_identifier(input: &str, expected: &str) {
        assert_eq!(sanitize_identifier(input), expected);
    }
}
