use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite};

use super::{decode_tags, double_option, encode_tags};

/// Checklist row. `items` is the JSON-encoded item array as stored.
#[derive(Debug, Clone, FromRow)]
pub struct Checklist {
    pub id: String,
    pub user_id: String,
    pub folder_id: Option<String>,
    pub project_id: Option<String>,
    pub title: String,
    pub items: String,
    pub tags: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

pub fn encode_items(items: &[ChecklistItem]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

pub fn decode_items(raw: &str) -> Vec<ChecklistItem> {
    serde_json::from_str(raw).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
pub struct CreateChecklistRequest {
    pub title: String,
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
    pub folder_id: Option<String>,
    pub project_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update. An explicit `null` for `folder_id`/`project_id` clears the
/// assignment; an absent field leaves it alone.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateChecklistRequest {
    pub title: Option<String>,
    pub items: Option<Vec<ChecklistItem>>,
    #[serde(default, deserialize_with = "double_option")]
    pub folder_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub project_id: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

impl UpdateChecklistRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.items.is_none()
            && self.folder_id.is_none()
            && self.project_id.is_none()
            && self.tags.is_none()
    }

    pub fn to_update_query(&self, id: &str, user_id: &str, now: i64) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("UPDATE checklists SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(title) = &self.title {
                set.push("title = ").push_bind_unseparated(title.clone());
            }
            if let Some(items) = &self.items {
                set.push("items = ").push_bind_unseparated(encode_items(items));
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
pub struct ChecklistResponse {
    pub id: String,
    pub user_id: String,
    pub folder_id: Option<String>,
    pub project_id: Option<String>,
    pub title: String,
    pub items: Vec<ChecklistItem>,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Checklist> for ChecklistResponse {
    fn from(c: Checklist) -> Self {
        ChecklistResponse {
            id: c.id,
            user_id: c.user_id,
            folder_id: c.folder_id,
            project_id: c.project_id,
            title: c.title,
            items: decode_items(&c.items),
            tags: decode_tags(&c.tags),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_round_trip() {
        let items = vec![
            ChecklistItem { id: "i1".into(), text: "buy milk".into(), done: false },
            ChecklistItem { id: "i2".into(), text: "ship release".into(), done: true },
        ];
        assert_eq!(decode_items(&encode_items(&items)), items);
    }

    #[test]
    fn test_item_done_defaults_to_false() {
        let items = decode_items(r#"[{"id":"i1","text":"x"}]"#);
        assert_eq!(items.len(), 1);
        assert!(!items[0].done);
    }

    #[test]
    fn test_update_query_shape() {
        let update = UpdateChecklistRequest {
            items: Some(vec![]),
            tags: Some(vec!["home".into()]),
            ..Default::default()
        };
        let qb = update.to_update_query("c1", "u1", 5);
        assert_eq!(
            qb.sql(),
            "UPDATE checklists SET items = ?, tags = ?, updated_at = ? WHERE id = ? AND user_id = ?"
        );
    }

    #[test]
    fn test_null_folder_clears_assignment() {
        let update: UpdateChecklistRequest =
            serde_json::from_str(r#"{"folder_id": null}"#).unwrap();
        assert!(!update.is_empty());
        assert_eq!(update.folder_id, Some(None));
        let qb = update.to_update_query("c1", "u1", 5);
        assert_eq!(
            qb.sql(),
            "UPDATE checklists SET folder_id = ?, updated_at = ? WHERE id = ? AND user_id = ?"
        );
    }
}
