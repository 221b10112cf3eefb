pub mod checklist;
pub mod folder;
pub mod note;
pub mod premium_request;
pub mod project;
pub mod smart_note;
pub mod snippet;
pub mod tag;
pub mod user;

pub use checklist::*;
pub use folder::*;
pub use note::*;
pub use premium_request::*;
pub use project::*;
pub use smart_note::*;
pub use snippet::*;
pub use tag::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent PATCH field from an explicit JSON `null`: absent
/// stays `None` (via `#[serde(default)]`), `null` becomes `Some(None)` and a
/// value becomes `Some(Some(v))`, so a provided null can flatten into
/// `SET col = NULL`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Tag arrays are persisted as JSON text and must round-trip losslessly
/// between the database column and the client-facing `Vec<String>`.
pub fn encode_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

/// Rows written by older clients may hold malformed JSON; those decode to an
/// empty list instead of failing the whole request.
pub fn decode_tags(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Common list filters for the four content types.
#[derive(Debug, Default, Deserialize)]
pub struct ContentListQuery {
    pub folder_id: Option<String>,
    pub project_id: Option<String>,
    pub tag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        let tags = vec!["rust".to_string(), "sqlx".to_string()];
        let encoded = encode_tags(&tags);
        assert_eq!(encoded, r#"["rust","sqlx"]"#);
        assert_eq!(decode_tags(&encoded), tags);
    }

    #[test]
    fn test_empty_tags() {
        assert_eq!(encode_tags(&[]), "[]");
        assert!(decode_tags("[]").is_empty());
    }

    #[test]
    fn test_malformed_tags_decode_to_empty() {
        assert!(decode_tags("not json").is_empty());
        assert!(decode_tags(r#"{"a":1}"#).is_empty());
    }

    #[test]
    fn test_tags_with_special_characters() {
        let tags = vec!["c++".to_string(), "emoji 🚀".to_string(), "with \"quotes\"".to_string()];
        assert_eq!(decode_tags(&encode_tags(&tags)), tags);
    }
}
