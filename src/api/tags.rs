use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use uuid::Uuid;

use crate::database::Database;
use crate::middleware::auth::Claims;
use crate::models::{CreateTagRequest, Tag, UpdateTagRequest};
use crate::utils::AppError;

/// GET /api/tags - name-ordered.
#[get("")]
pub async fn list_tags(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
) -> Result<HttpResponse, AppError> {
    let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE user_id = ? ORDER BY name")
        .bind(&user.sub)
        .fetch_all(db.pool())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "tags": tags,
        "total": tags.len()
    })))
}

/// POST /api/tags
#[post("")]
pub async fn create_tag(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    request: web::Json<CreateTagRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidRequest("Name is required".to_string()));
    }

    let tag = Tag {
        id: Uuid::new_v4().to_string(),
        user_id: user.sub.clone(),
        name: request.name.trim().to_string(),
        color: request.color,
        created_at: Utc::now().timestamp(),
    };

    sqlx::query("INSERT INTO tags (id, user_id, name, color, created_at) VALUES (?, ?, ?, ?, ?)")
        .bind(&tag.id)
        .bind(&tag.user_id)
        .bind(&tag.name)
        .bind(&tag.color)
        .bind(tag.created_at)
        .execute(db.pool())
        .await?;

    log::info!("🏷️  Tag created: {} by user {}", tag.name, user.sub);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "tag": tag
    })))
}

/// GET /api/tags/{id}
#[get("/{id}")]
pub async fn get_tag(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&user.sub)
        .fetch_optional(db.pool())
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "tag": tag
    })))
}

/// PATCH /api/tags/{id}
#[patch("/{id}")]
pub async fn update_tag(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
    request: web::Json<UpdateTagRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    if request.is_empty() {
        return Err(AppError::InvalidRequest("No fields to update".to_string()));
    }

    let mut query = request.to_update_query(&id, &user.sub);
    let result = query.build().execute(db.pool()).await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Tag not found".to_string()));
    }

    let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&user.sub)
        .fetch_one(db.pool())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "tag": tag
    })))
}

/// DELETE /api/tags/{id} - content rows keep their embedded tag arrays; tag
/// records are only lookup metadata for the UI.
#[delete("/{id}")]
pub async fn delete_tag(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM tags WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&user.sub)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Tag not found".to_string()));
    }

    log::info!("🗑️  Tag deleted: {} by user {}", id, user.sub);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Tag deleted"
    })))
}
