use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite};

use super::{decode_tags, double_option, encode_tags};

/// Rich-text note row. `html` is client-rendered markup stored verbatim.
#[derive(Debug, Clone, FromRow)]
pub struct SmartNote {
    pub id: String,
    pub user_id: String,
    pub folder_id: Option<String>,
    pub project_id: Option<String>,
    pub title: String,
    pub html: String,
    pub tags: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateSmartNoteRequest {
    pub title: String,
    #[serde(default)]
    pub html: String,
    pub folder_id: Option<String>,
    pub project_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update. An explicit `null` for `folder_id`/`project_id` clears the
/// assignment; an absent field leaves it alone.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSmartNoteRequest {
    pub title: Option<String>,
    pub html: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub folder_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub project_id: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

impl UpdateSmartNoteRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.html.is_none()
            && self.folder_id.is_none()
            && self.project_id.is_none()
            && self.tags.is_none()
    }

    pub fn to_update_query(&self, id: &str, user_id: &str, now: i64) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("UPDATE smart_notes SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(title) = &self.title {
                set.push("title = ").push_bind_unseparated(title.clone());
            }
            if let Some(html) = &self.html {
                set.push("html = ").push_bind_unseparated(html.clone());
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
pub struct SmartNoteResponse {
    pub id: String,
    pub user_id: String,
    pub folder_id: Option<String>,
    pub project_id: Option<String>,
    pub title: String,
    pub html: String,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<SmartNote> for SmartNoteResponse {
    fn from(n: SmartNote) -> Self {
        SmartNoteResponse {
            id: n.id,
            user_id: n.user_id,
            folder_id: n.folder_id,
            project_id: n.project_id,
            title: n.title,
            html: n.html,
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
        let update = UpdateSmartNoteRequest {
            html: Some("<p>hi</p>".into()),
            ..Default::default()
        };
        let qb = update.to_update_query("sn1", "u1", 7);
        assert_eq!(
            qb.sql(),
            "UPDATE smart_notes SET html = ?, updated_at = ? WHERE id = ? AND user_id = ?"
        );
    }

    #[test]
    fn test_null_folder_clears_assignment() {
        let update: UpdateSmartNoteRequest =
            serde_json::from_str(r#"{"folder_id": null}"#).unwrap();
        assert!(!update.is_empty());
        assert_eq!(update.folder_id, Some(None));
        let qb = update.to_update_query("sn1", "u1", 7);
        assert_eq!(
            qb.sql(),
            "UPDATE smart_notes SET folder_id = ?, updated_at = ? WHERE id = ? AND user_id = ?"
        );
    }
}
