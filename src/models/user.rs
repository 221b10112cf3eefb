use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite};

use super::{decode_tags, double_option};

/// User row. `roles` holds a JSON-encoded array, same codec as content tags.
/// `password` is a bcrypt hash and never leaves the model layer.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password: Option<String>,
    pub name: Option<String>,
    pub roles: String,
    pub is_active: bool,
    pub premium_until: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_login: Option<i64>,
}

impl User {
    pub fn role_list(&self) -> Vec<String> {
        let roles = decode_tags(&self.roles);
        if roles.is_empty() {
            vec!["user".to_string()]
        } else {
            roles
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role_list().iter().any(|r| r == "admin")
    }

    /// Premium is a time window, not a flag: active while `premium_until`
    /// lies in the future.
    pub fn has_premium(&self, now: i64) -> bool {
        self.premium_until.map(|until| until > now).unwrap_or(false)
    }
}

/// Client-facing user info. No password hash.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub roles: Vec<String>,
    pub is_active: bool,
    pub premium: bool,
    pub premium_until: Option<i64>,
    pub created_at: i64,
    pub last_login: Option<i64>,
}

impl UserInfo {
    pub fn from_user(user: &User, now: i64) -> Self {
        UserInfo {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            roles: user.role_list(),
            is_active: user.is_active,
            premium: user.has_premium(now),
            premium_until: user.premium_until,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

/// Admin-side user update. Role and activity changes only; passwords and
/// emails are not editable through the admin surface. An explicit
/// `"premium_until": null` revokes the grant; an absent field leaves it alone.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub roles: Option<Vec<String>>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub premium_until: Option<Option<i64>>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.roles.is_none()
            && self.is_active.is_none()
            && self.premium_until.is_none()
    }

    pub fn to_update_query(&self, id: &str, now: i64) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("UPDATE users SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(name) = &self.name {
                set.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(roles) = &self.roles {
                set.push("roles = ").push_bind_unseparated(super::encode_tags(roles));
            }
            if let Some(is_active) = self.is_active {
                set.push("is_active = ").push_bind_unseparated(is_active);
            }
            if let Some(premium_until) = self.premium_until {
                set.push("premium_until = ").push_bind_unseparated(premium_until);
            }
            set.push("updated_at = ").push_bind_unseparated(now);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id.to_string());
        qb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "u1".into(),
            email: "a@b.c".into(),
            password: None,
            name: None,
            roles: r#"["user"]"#.into(),
            is_active: true,
            premium_until: None,
            created_at: 0,
            updated_at: 0,
            last_login: None,
        }
    }

    #[test]
    fn test_role_list_falls_back_to_user() {
        let mut user = sample_user();
        user.roles = "garbage".into();
        assert_eq!(user.role_list(), vec!["user".to_string()]);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_is_admin() {
        let mut user = sample_user();
        user.roles = r#"["user","admin"]"#.into();
        assert!(user.is_admin());
    }

    #[test]
    fn test_premium_window() {
        let mut user = sample_user();
        assert!(!user.has_premium(100));
        user.premium_until = Some(200);
        assert!(user.has_premium(100));
        assert!(!user.has_premium(200));
        assert!(!user.has_premium(300));
    }

    #[test]
    fn test_update_query_shape() {
        let update = UpdateUserRequest {
            roles: Some(vec!["user".into(), "admin".into()]),
            is_active: Some(false),
            ..Default::default()
        };
        let qb = update.to_update_query("u1", 50);
        assert_eq!(
            qb.sql(),
            "UPDATE users SET roles = ?, is_active = ?, updated_at = ? WHERE id = ?"
        );
    }

    #[test]
    fn test_null_premium_until_revokes_grant() {
        let update: UpdateUserRequest =
            serde_json::from_str(r#"{"premium_until": null}"#).unwrap();
        assert!(!update.is_empty());
        assert_eq!(update.premium_until, Some(None));
        let qb = update.to_update_query("u1", 50);
        assert_eq!(
            qb.sql(),
            "UPDATE users SET premium_until = ?, updated_at = ? WHERE id = ?"
        );
    }
}
