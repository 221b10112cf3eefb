use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::Deserialize;

use crate::database::Database;
use crate::middleware::auth::Claims;
use crate::models::{CreatePremiumRequestBody, PremiumRequest, ReviewPremiumRequestBody};
use crate::services::premium_service;
use crate::utils::AppError;

#[derive(Debug, Deserialize)]
pub struct PremiumListQuery {
    pub status: Option<String>,
}

/// Owners may withdraw their own request only while it is still pending;
/// admins may delete any. Non-owners get a 404, not a 403, so request ids do
/// not leak across users.
fn check_delete(user: &Claims, request: &PremiumRequest) -> Result<(), AppError> {
    if user.is_admin() {
        return Ok(());
    }
    if request.user_id != user.sub {
        return Err(AppError::NotFound("Premium request not found".to_string()));
    }
    if !request.is_pending() {
        return Err(AppError::Conflict(
            "Only pending requests can be withdrawn".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/premium-requests - any user may file one pending request.
#[post("")]
pub async fn create_premium_request(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    body: web::Json<CreatePremiumRequestBody>,
) -> Result<HttpResponse, AppError> {
    log::info!("⭐ POST /premium-requests - user {}", user.sub);

    let request = premium_service::create_request(&db, &user.sub, &body).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "premium_request": request
    })))
}

/// GET /api/premium-requests - admins see all, users see their own.
#[get("")]
pub async fn list_premium_requests(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    query: web::Query<PremiumListQuery>,
) -> Result<HttpResponse, AppError> {
    let requests = if user.is_admin() {
        premium_service::list_all(&db, query.status.as_deref()).await?
    } else {
        premium_service::list_for_user(&db, &user.sub).await?
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "premium_requests": requests,
        "total": requests.len()
    })))
}

/// GET /api/premium-requests/{id} - owner or admin.
#[get("/{id}")]
pub async fn get_premium_request(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let request = premium_service::find_request(&db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Premium request not found".to_string()))?;

    if request.user_id != user.sub && !user.is_admin() {
        // Hidden rather than forbidden: no existence leak across users
        return Err(AppError::NotFound("Premium request not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "premium_request": request
    })))
}

/// PATCH /api/premium-requests/{id} - admin review; approval grants the
/// time-boxed premium window to the request owner.
#[patch("/{id}")]
pub async fn review_premium_request(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
    body: web::Json<ReviewPremiumRequestBody>,
) -> Result<HttpResponse, AppError> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("Admin role required".to_string()));
    }

    let id = path.into_inner();
    log::info!("⭐ PATCH /premium-requests/{} - reviewer {}", id, user.sub);

    let request = premium_service::review_request(&db, &id, &user.sub, body.action).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "premium_request": request
    })))
}

/// DELETE /api/premium-requests/{id} - owner may withdraw while pending,
/// admin may delete any.
#[delete("/{id}")]
pub async fn delete_premium_request(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let request = premium_service::find_request(&db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Premium request not found".to_string()))?;

    check_delete(&user, &request)?;

    premium_service::delete_request(&db, &id).await?;

    log::info!("🗑️  Premium request deleted: {} by {}", id, user.sub);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Premium request deleted"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{STATUS_DENIED, STATUS_PENDING};

    fn claims(sub: &str, roles: &[&str]) -> Claims {
        Claims {
            sub: sub.to_string(),
            email: String::new(),
            name: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            is_active: true,
            iat: 0,
            exp: 0,
            jti: String::new(),
            aud: String::new(),
            iss: String::new(),
            token_use: "access".to_string(),
        }
    }

    fn request(owner: &str, status: &str) -> PremiumRequest {
        PremiumRequest {
            id: "r1".to_string(),
            user_id: owner.to_string(),
            reason: "reason".to_string(),
            duration_days: 7,
            status: status.to_string(),
            reviewed_by: None,
            reviewed_at: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_owner_may_withdraw_pending() {
        let user = claims("u1", &["user"]);
        assert!(check_delete(&user, &request("u1", STATUS_PENDING)).is_ok());
    }

    #[test]
    fn test_owner_cannot_withdraw_reviewed() {
        let user = claims("u1", &["user"]);
        let err = check_delete(&user, &request("u1", STATUS_DENIED)).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_non_owner_sees_not_found() {
        let user = claims("u2", &["user"]);
        let err = check_delete(&user, &request("u1", STATUS_PENDING)).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_admin_may_delete_any() {
        let admin = claims("a1", &["user", "admin"]);
        assert!(check_delete(&admin, &request("u1", STATUS_DENIED)).is_ok());
    }
}
