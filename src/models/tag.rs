use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tag {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub color: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl UpdateTagRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }

    pub fn to_update_query(&self, id: &str, user_id: &str) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("UPDATE tags SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(name) = &self.name {
                set.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(color) = &self.color {
                set.push("color = ").push_bind_unseparated(color.clone());
            }
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
        let update = UpdateTagRequest {
            color: Some("#f59e0b".into()),
            ..Default::default()
        };
        let qb = update.to_update_query("t1", "u1");
        assert_eq!(qb.sql(), "UPDATE tags SET color = ? WHERE id = ? AND user_id = ?");
    }
}
