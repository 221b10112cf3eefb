use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl UpdateProjectRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.color.is_none()
    }

    pub fn to_update_query(&self, id: &str, user_id: &str, now: i64) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("UPDATE projects SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(name) = &self.name {
                set.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(description) = &self.description {
                set.push("description = ").push_bind_unseparated(description.clone());
            }
            if let Some(color) = &self.color {
                set.push("color = ").push_bind_unseparated(color.clone());
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
        let update = UpdateProjectRequest {
            name: Some("Renamed".into()),
            color: Some("#10b981".into()),
            ..Default::default()
        };
        let qb = update.to_update_query("p1", "u1", 3);
        assert_eq!(
            qb.sql(),
            "UPDATE projects SET name = ?, color = ?, updated_at = ? WHERE id = ? AND user_id = ?"
        );
    }
}
