use actix_web::{delete, get, patch, web, HttpResponse};
use chrono::Utc;

use crate::database::Database;
use crate::middleware::auth::Claims;
use crate::models::{UpdateUserRequest, User, UserInfo};
use crate::services::auth_service;
use crate::utils::AppError;

fn require_admin(user: &Claims) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin role required".to_string()))
    }
}

/// Admins cannot strip their own access: a self-targeted update that drops
/// the admin role or deactivates the account is rejected.
fn check_self_update(admin_id: &str, target_id: &str, request: &UpdateUserRequest) -> Result<(), AppError> {
    if target_id != admin_id {
        return Ok(());
    }
    let demoting = request
        .roles
        .as_ref()
        .map(|roles| !roles.iter().any(|r| r == "admin"))
        .unwrap_or(false);
    if demoting || request.is_active == Some(false) {
        return Err(AppError::Forbidden(
            "Admins cannot demote or deactivate themselves".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/users - admin only; password hashes never leave the model layer.
#[get("")]
pub async fn list_users(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
) -> Result<HttpResponse, AppError> {
    require_admin(&user)?;

    let rows = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(db.pool())
        .await?;

    let now = Utc::now().timestamp();
    let users: Vec<UserInfo> = rows.iter().map(|u| UserInfo::from_user(u, now)).collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "users": users,
        "total": users.len()
    })))
}

/// GET /api/users/{id} - admin only.
#[get("/{id}")]
pub async fn get_user(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_admin(&user)?;

    let id = path.into_inner();
    let target = auth_service::find_user_by_id(&db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": UserInfo::from_user(&target, Utc::now().timestamp())
    })))
}

/// PATCH /api/users/{id} - admin role/activity management. Admins cannot
/// demote or deactivate themselves.
#[patch("/{id}")]
pub async fn update_user(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
    request: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    require_admin(&user)?;

    let id = path.into_inner();

    if request.is_empty() {
        return Err(AppError::InvalidRequest("No fields to update".to_string()));
    }

    check_self_update(&user.sub, &id, &request)?;

    let now = Utc::now().timestamp();
    let mut query = request.to_update_query(&id, now);
    let result = query.build().execute(db.pool()).await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let target = auth_service::find_user_by_id(&db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    log::info!("👤 User updated: {} by admin {}", id, user.sub);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": UserInfo::from_user(&target, now)
    })))
}

/// DELETE /api/users/{id} - admin only, cascades over owned data, never self.
#[delete("/{id}")]
pub async fn delete_user(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_admin(&user)?;

    let id = path.into_inner();
    if id == user.sub {
        return Err(AppError::Forbidden(
            "Admins cannot delete their own account here; use /api/auth/delete-account".to_string(),
        ));
    }

    auth_service::delete_user_account(&db, &id).await?;

    log::info!("🗑️  User deleted: {} by admin {}", id, user.sub);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "User deleted"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_demotion_rejected() {
        let update = UpdateUserRequest {
            roles: Some(vec!["user".into()]),
            ..Default::default()
        };
        let err = check_self_update("a1", "a1", &update).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_self_deactivation_rejected() {
        let update = UpdateUserRequest {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(matches!(
            check_self_update("a1", "a1", &update),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_self_rename_keeping_admin_allowed() {
        let update = UpdateUserRequest {
            name: Some("New Name".into()),
            roles: Some(vec!["user".into(), "admin".into()]),
            ..Default::default()
        };
        assert!(check_self_update("a1", "a1", &update).is_ok());
    }

    #[test]
    fn test_demoting_another_user_allowed() {
        let update = UpdateUserRequest {
            roles: Some(vec!["user".into()]),
            is_active: Some(false),
            ..Default::default()
        };
        assert!(check_self_update("a1", "u2", &update).is_ok());
    }
}
