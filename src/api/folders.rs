use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::Database;
use crate::middleware::auth::Claims;
use crate::models::{CreateFolderRequest, Folder, UpdateFolderRequest};
use crate::utils::AppError;

#[derive(Debug, Deserialize)]
pub struct FolderListQuery {
    pub project_id: Option<String>,
}

/// GET /api/folders - optionally filtered by project.
#[get("")]
pub async fn list_folders(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    query: web::Query<FolderListQuery>,
) -> Result<HttpResponse, AppError> {
    let folders = match &query.project_id {
        Some(project_id) => {
            sqlx::query_as::<_, Folder>(
                "SELECT * FROM folders WHERE user_id = ? AND project_id = ? ORDER BY name",
            )
            .bind(&user.sub)
            .bind(project_id)
            .fetch_all(db.pool())
            .await?
        }
        None => {
            sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE user_id = ? ORDER BY name")
                .bind(&user.sub)
                .fetch_all(db.pool())
                .await?
        }
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "folders": folders,
        "total": folders.len()
    })))
}

/// POST /api/folders
#[post("")]
pub async fn create_folder(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    request: web::Json<CreateFolderRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidRequest("Name is required".to_string()));
    }

    let now = Utc::now().timestamp();
    let folder = Folder {
        id: Uuid::new_v4().to_string(),
        user_id: user.sub.clone(),
        project_id: request.project_id,
        name: request.name,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO folders (id, user_id, project_id, name, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&folder.id)
    .bind(&folder.user_id)
    .bind(&folder.project_id)
    .bind(&folder.name)
    .bind(folder.created_at)
    .bind(folder.updated_at)
    .execute(db.pool())
    .await?;

    log::info!("📁 Folder created: {} by user {}", folder.id, user.sub);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "folder": folder
    })))
}

/// GET /api/folders/{id}
#[get("/{id}")]
pub async fn get_folder(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let folder = sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&user.sub)
        .fetch_optional(db.pool())
        .await?
        .ok_or_else(|| AppError::NotFound("Folder not found".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "folder": folder
    })))
}

/// PATCH /api/folders/{id}
#[patch("/{id}")]
pub async fn update_folder(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
    request: web::Json<UpdateFolderRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    if request.is_empty() {
        return Err(AppError::InvalidRequest("No fields to update".to_string()));
    }

    let now = Utc::now().timestamp();
    let mut query = request.to_update_query(&id, &user.sub, now);
    let result = query.build().execute(db.pool()).await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Folder not found".to_string()));
    }

    let folder = sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&user.sub)
        .fetch_one(db.pool())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "folder": folder
    })))
}

/// DELETE /api/folders/{id} - contained content survives with a nulled
/// folder_id (ON DELETE SET NULL).
#[delete("/{id}")]
pub async fn delete_folder(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM folders WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&user.sub)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Folder not found".to_string()));
    }

    log::info!("🗑️  Folder deleted: {} by user {}", id, user.sub);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Folder deleted"
    })))
}
