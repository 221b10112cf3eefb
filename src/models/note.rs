use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite};

use super::{decode_tags, double_option, encode_tags};

/// Free-text note row.
#[derive(Debug, Clone, FromRow)]
pub struct Note {
    pub id: String,
    pub user_id: String,
    pub folder_id: Option<String>,
    pub project_id: Option<String>,
    pub title: String,
    pub content: String,
    pub tags: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub folder_id: Option<String>,
    pub project_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update. An explicit `null` for `folder_id`/`project_id` clears the
/// assignment; an absent field leaves it alone.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub folder_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub project_id: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

impl UpdateNoteRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.folder_id.is_none()
            && self.project_id.is_none()
            && self.tags.is_none()
    }

    pub fn to_update_query(&self, id: &str, user_id: &str, now: i64) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("UPDATE notes SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(title) = &self.title {
                set.push("title = ").push_bind_unseparated(title.clone());
            }
            if let Some(content) = &self.content {
                set.push("content = ").push_bind_unseparated(content.clone());
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

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub id: String,
    pub user_id: String,
    pub folder_id: Option<String>,
    pub project_id: Option<String>,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Note> for NoteResponse {
    fn from(n: Note) -> Self {
        NoteResponse {
            id: n.id,
            user_id: n.user_id,
            folder_id: n.folder_id,
            project_id: n.project_id,
            title: n.title,
            content: n.content,
            tags: decode_tags(&n.tags),
            created_at: n.created_at,
            updated_at: n.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_query_shape() {
        let update = UpdateNoteRequest {
            content: Some("body".into()),
            ..Default::default()
        };
        let qb = update.to_update_query("n1", "u1", 10);
        assert_eq!(
            qb.sql(),
            "UPDATE notes SET content = ?, updated_at = ? WHERE id = ? AND user_id = ?"
        );
    }

    #[test]
    fn test_null_project_clears_assignment() {
        let update: UpdateNoteRequest = serde_json::from_str(r#"{"project_id": null}"#).unwrap();
        assert!(!update.is_empty());
        assert_eq!(update.project_id, Some(None));
        let qb = update.to_update_query("n1", "u1", 10);
        assert_eq!(
            qb.sql(),
            "UPDATE notes SET project_id = ?, updated_at = ? WHERE id = ? AND user_id = ?"
        );
    }
}
