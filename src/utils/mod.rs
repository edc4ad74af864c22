pub mod dates;

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in partial-update payloads.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Trim a string and collapse empty values to `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        notes: Option<Option<String>>,
    }

    #[test]
    fn test_double_option_distinguishes_null_from_missing() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.notes, None);

        let null: Patch = serde_json::from_str(r#"{"notes": null}"#).unwrap();
        assert_eq!(null.notes, Some(None));

        let set: Patch = serde_json::from_str(r#"{"notes": "hi"}"#).unwrap();
        assert_eq!(set.notes, Some(Some("hi".to_string())));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" Desk ".into())), Some("Desk".into()));
        assert_eq!(non_blank(None), None);
    }
}
