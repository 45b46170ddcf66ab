//! Heuristic field matching
//!
//! Source records are treated as loosely-typed maps. Canonical attributes are
//! resolved from ordered candidate key lists, and labeled fields are
//! classified by name so renamed or missing fields across exporter versions
//! degrade instead of failing.

use serde_json::{Map, Value};

/// Candidate keys for archive records, in priority order
pub const TITLE_KEYS: &[&str] = &["title", "name"];
pub const VAULT_KEYS: &[&str] = &["vault", "vaultName"];
pub const CATEGORY_KEYS: &[&str] = &["category", "type"];
pub const USERNAME_KEYS: &[&str] = &["username", "user", "login", "loginUsername"];
pub const PASSWORD_KEYS: &[&str] = &["password", "loginPassword"];
pub const NOTES_KEYS: &[&str] = &["notes", "notesPlain", "note"];
pub const OTP_KEYS: &[&str] = &["totp", "otp", "oneTimePassword"];
pub const URL_KEYS: &[&str] = &["url", "website"];

/// Return the first candidate whose value is a non-blank string, together
/// with the key it was found under
pub fn first_match<'r, 'k>(
    record: &'r Map<String, Value>,
    candidates: &[&'k str],
) -> Option<(&'k str, &'r str)> {
    candidates.iter().find_map(|key| match record.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some((*key, s.as_str())),
        _ => None,
    })
}

/// Render a JSON value as text: strings verbatim, numbers in their default
/// form, anything else as compact JSON.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Where a labeled detail field ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTarget {
    Username,
    Password,
    Otp,
    Extra,
}

/// Classify a detail field by label and type tag.
///
/// Rules are checked in order and the first match wins:
/// 1. label is "username" or contains "user"
/// 2. label is "password" or the type tag is `CONCEALED`
/// 3. label contains "otp" (which covers "totp")
/// 4. anything else is an extra field
pub fn classify_field(label: &str, field_type: &str) -> FieldTarget {
    let label = label.trim().to_lowercase();
    let field_type = field_type.trim();

    if label == "username" || label.contains("user") {
        FieldTarget::Username
    } else if label == "password" || field_type.eq_ignore_ascii_case("CONCEALED") {
        FieldTarget::Password
    } else if label.contains("otp") || label.contains("totp") {
        FieldTarget::Otp
    } else {
        FieldTarget::Extra
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_first_match_respects_order() {
        let rec = record(json!({"user": "bob", "username": "alice"}));
        assert_eq!(first_match(&rec, USERNAME_KEYS), Some(("username", "alice")));
    }

    #[test]
    fn test_first_match_skips_blank_and_non_strings() {
        let rec = record(json!({"username": "  ", "user": 42, "login": "carol"}));
        assert_eq!(first_match(&rec, USERNAME_KEYS), Some(("login", "carol")));
        assert_eq!(first_match(&rec, PASSWORD_KEYS), None);
    }

    #[test]
    fn test_stringify_value() {
        assert_eq!(stringify_value(&json!("abc")), "abc");
        assert_eq!(stringify_value(&json!(42)), "42");
        assert_eq!(stringify_value(&json!(1.5)), "1.5");
        assert_eq!(stringify_value(&json!(true)), "true");
        assert_eq!(stringify_value(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(stringify_value(&json!(["x"])), r#"["x"]"#);
    }

    #[test]
    fn test_classify_field() {
        assert_eq!(classify_field("Username", "STRING"), FieldTarget::Username);
        assert_eq!(classify_field("user_name", "STRING"), FieldTarget::Username);
        assert_eq!(classify_field("Password", "STRING"), FieldTarget::Password);
        assert_eq!(classify_field("PIN", "CONCEALED"), FieldTarget::Password);
        assert_eq!(classify_field("TOTP", "OTP"), FieldTarget::Otp);
        assert_eq!(classify_field("website", "URL"), FieldTarget::Extra);
    }

    #[test]
    fn test_user_rule_beats_concealed_type() {
        assert_eq!(classify_field("user secret", "CONCEALED"), FieldTarget::Username);
    }

    #[test]
    fn test_first_match_reports_the_key_used() {
        let rec = record(json!({"title": " ", "name": "Mail", "loginUsername": "me"}));
        assert_eq!(first_match(&rec, TITLE_KEYS), Some(("name", "Mail")));
        assert_eq!(first_match(&rec, USERNAME_KEYS), Some(("loginUsername", "me")));
        assert_eq!(first_match(&rec, OTP_KEYS), None);
    }
}
