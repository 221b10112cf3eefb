use actix_web::{web, HttpRequest, HttpResponse};

use crate::database::Database;
use crate::services::auth_service;
use crate::services::auth_service::{AuthResponse, LoginRequest, RegisterRequest};
use crate::utils::AppError;

fn bearer_token(req: &HttpRequest) -> Result<&str, AppError> {
    req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("No valid Authorization header".to_string()))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    db: web::Data<Database>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /auth/login - email: {}", request.email);

    let response = auth_service::login(&db, &request).await.map_err(|e| {
        log::warn!("❌ Login failed: {} - {}", request.email, e);
        e
    })?;

    log::info!("✅ Login successful: {}", request.email);
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "User already exists")
    )
)]
pub async fn register(
    db: web::Data<Database>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /auth/register - email: {}", request.email);

    let response = auth_service::register(&db, &request).await.map_err(|e| {
        log::warn!("❌ Registration failed: {} - {}", request.email, e);
        e
    })?;

    log::info!("✅ Registration successful: {}", request.email);
    Ok(HttpResponse::Created().json(response))
}

pub async fn refresh_token(
    db: web::Data<Database>,
    request: web::Json<auth_service::RefreshTokenRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔄 POST /auth/refresh");

    let response = auth_service::refresh_token(&db, &request).await?;

    log::info!("✅ Token refreshed for user {}", response.user.id);
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/api/auth/verify",
    tag = "Auth",
    responses(
        (status = 200, description = "Token is valid"),
        (status = 401, description = "Invalid or expired token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn verify_token(req: HttpRequest) -> Result<HttpResponse, AppError> {
    log::info!("✓ GET /auth/verify");

    let token = bearer_token(&req)?;
    let claims = auth_service::verify_token(token)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "valid": true,
        "user_id": claims.sub,
        "email": claims.email,
        "roles": claims.roles,
        "exp": claims.exp
    })))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "User information retrieved"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(db: web::Data<Database>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    log::info!("👤 GET /auth/me");

    let token = bearer_token(&req)?;
    let claims = auth_service::verify_token(token)?;
    let user = auth_service::get_current_user(&db, &claims.sub).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": user
    })))
}

/// Deletes the caller's account and all owned content.
pub async fn delete_account(
    db: web::Data<Database>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️  DELETE /auth/delete-account");

    let token = bearer_token(&req)?;
    let claims = auth_service::verify_token(token)?;

    auth_service::delete_user_account(&db, &claims.sub).await?;

    log::info!("✅ Account deleted: {}", claims.sub);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Account deleted successfully"
    })))
}
