use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Folder {
    pub id: String,
    pub user_id: String,
    pub project_id: Option<String>,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
    pub project_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateFolderRequest {
    pub name: Option<String>,
    pub project_id: Option<String>,
}

impl UpdateFolderRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.project_id.is_none()
    }

    pub fn to_update_query(&self, id: &str, user_id: &str, now: i64) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("UPDATE folders SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(name) = &self.name {
                set.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(project_id) = &self.project_id {
                set.push("project_id = ").push_bind_unseparated(project_id.clone());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_query_shape() {
        let update = UpdateFolderRequest {
            name: Some("Archive".into()),
            ..Default::default()
        };
        let qb = update.to_update_query("f1", "u1", 9);
        assert_eq!(
            qb.sql(),
            "UPDATE folders SET name = ?, updated_at = ? WHERE id = ? AND user_id = ?"
        );
    }
}
