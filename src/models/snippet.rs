use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite};

use super::{decode_tags, double_option, encode_tags};

/// Code snippet row. `tags` holds the JSON-encoded array as stored.
#[derive(Debug, Clone, FromRow)]
pub struct Snippet {
    pub id: String,
    pub user_id: String,
    pub folder_id: Option<String>,
    pub project_id: Option<String>,
    pub title: String,
    pub code: String,
    pub language: String,
    pub tags: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateSnippetRequest {
    pub title: String,
    pub code: String,
    pub language: Option<String>,
    pub folder_id: Option<String>,
    pub project_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update. `folder_id`/`project_id` use a double `Option` so an
/// explicit `"folder_id": null` (clear the assignment) is distinguishable
/// from an absent field (leave it alone).
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateSnippetRequest {
    pub title: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub folder_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub project_id: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

impl UpdateSnippetRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.code.is_none()
            && self.language.is_none()
            && self.folder_id.is_none()
            && self.project_id.is_none()
            && self.tags.is_none()
    }

    /// Flattens the provided fields into an `UPDATE ... SET` statement.
    /// `updated_at` is always refreshed; ownership is enforced in the WHERE.
    pub fn to_update_query(&self, id: &str, user_id: &str, now: i64) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("UPDATE snippets SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(title) = &self.title {
                set.push("title = ").push_bind_unseparated(title.clone());
            }
            if let Some(code) = &self.code {
                set.push("code = ").push_bind_unseparated(code.clone());
            }
            if let Some(language) = &self.language {
                set.push("language = ").push_bind_unseparated(language.clone());
            }
            if let Some(folder_id) = &self.folder_id {
                set.push("folder_id = ").push_bind_unseparated(folder_id.clone());
            }
            if let Some(project_id) = &self.project_id {
                set.push("project_id = ").push_bind_unseparated(project_id.clone());
            }
            if let Some(tags) = &self.tags {
                set.push("tags = ").push_bind_unseparated(encode_tags(tags));
            }
            set.push("updated_at = ").push_bind_unseparated(now);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id.to_string());
        qb.push(" AND user_id = ");
        qb.push_bind(user_id.to_string());
        qb
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SnippetResponse {
    pub id: String,
    pub user_id: String,
    pub folder_id: Option<String>,
    pub project_id: Option<String>,
    pub title: String,
    pub code: String,
    pub language: String,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Snippet> for SnippetResponse {
    fn from(s: Snippet) -> Self {
        SnippetResponse {
            id: s.id,
            user_id: s.user_id,
            folder_id: s.folder_id,
            project_id: s.project_id,
            title: s.title,
            code: s.code,
            language: s.language,
            tags: decode_tags(&s.tags),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_query_flattens_only_provided_fields() {
        let update = UpdateSnippetRequest {
            title: Some("New title".into()),
            language: Some("rust".into()),
            ..Default::default()
        };
        let qb = update.to_update_query("s1", "u1", 1700000000);
        assert_eq!(
            qb.sql(),
            "UPDATE snippets SET title = ?, language = ?, updated_at = ? WHERE id = ? AND user_id = ?"
        );
    }

    #[test]
    fn test_update_query_includes_encoded_tags() {
        let update = UpdateSnippetRequest {
            tags: Some(vec!["rust".into()]),
            ..Default::default()
        };
        let qb = update.to_update_query("s1", "u1", 0);
        assert_eq!(
            qb.sql(),
            "UPDATE snippets SET tags = ?, updated_at = ? WHERE id = ? AND user_id = ?"
        );
    }

    #[test]
    fn test_null_folder_clears_assignment() {
        // An explicit null is a provided field and must flatten to a NULL bind
        let update: UpdateSnippetRequest = serde_json::from_str(r#"{"folder_id": null}"#).unwrap();
        assert!(!update.is_empty());
        assert_eq!(update.folder_id, Some(None));
        let qb = update.to_update_query("s1", "u1", 9);
        assert_eq!(
            qb.sql(),
            "UPDATE snippets SET folder_id = ?, updated_at = ? WHERE id = ? AND user_id = ?"
        );
    }

    #[test]
    fn test_absent_fields_are_not_provided() {
        let update: UpdateSnippetRequest = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
        assert_eq!(update.folder_id, None);

        let update: UpdateSnippetRequest =
            serde_json::from_str(r#"{"project_id": "p1"}"#).unwrap();
        assert_eq!(update.project_id, Some(Some("p1".to_string())));
    }

    #[test]
    fn test_is_empty() {
        assert!(UpdateSnippetRequest::default().is_empty());
        let update = UpdateSnippetRequest {
            code: Some("fn main() {}".into()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_response_decodes_tags() {
        let snippet = Snippet {
            id: "s1".into(),
            user_id: "u1".into(),
            folder_id: None,
            project_id: None,
            title: "t".into(),
            code: "c".into(),
            language: "rust".into(),
            tags: r#"["a","b"]"#.into(),
            created_at: 1,
            updated_at: 2,
        };
        let response = SnippetResponse::from(snippet);
        assert_eq!(response.tags, vec!["a".to_string(), "b".to_string()]);
    }
}
