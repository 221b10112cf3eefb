use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use uuid::Uuid;

use crate::database::Database;
use crate::middleware::auth::Claims;
use crate::models::{CreateProjectRequest, Project, UpdateProjectRequest};
use crate::utils::AppError;

/// GET /api/projects
#[get("")]
pub async fn list_projects(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
) -> Result<HttpResponse, AppError> {
    let projects = sqlx::query_as::<_, Project>(
        "SELECT * FROM projects WHERE user_id = ? ORDER BY updated_at DESC",
    )
    .bind(&user.sub)
    .fetch_all(db.pool())
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "projects": projects,
        "total": projects.len()
    })))
}

/// POST /api/projects
#[post("")]
pub async fn create_project(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    request: web::Json<CreateProjectRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidRequest("Name is required".to_string()));
    }

    let now = Utc::now().timestamp();
    let project = Project {
        id: Uuid::new_v4().to_string(),
        user_id: user.sub.clone(),
        name: request.name,
        description: request.description,
        color: request.color,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO projects (id, user_id, name, description, color, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&project.id)
    .bind(&project.user_id)
    .bind(&project.name)
    .bind(&project.description)
    .bind(&project.color)
    .bind(project.created_at)
    .bind(project.updated_at)
    .execute(db.pool())
    .await?;

    log::info!("📁 Project created: {} by user {}", project.id, user.sub);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "project": project
    })))
}

/// GET /api/projects/{id}
#[get("/{id}")]
pub async fn get_project(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let project =
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ? AND user_id = ?")
            .bind(&id)
            .bind(&user.sub)
            .fetch_optional(db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "project": project
    })))
}

/// PATCH /api/projects/{id}
#[patch("/{id}")]
pub async fn update_project(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
    request: web::Json<UpdateProjectRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    if request.is_empty() {
        return Err(AppError::InvalidRequest("No fields to update".to_string()));
    }

    let now = Utc::now().timestamp();
    let mut query = request.to_update_query(&id, &user.sub, now);
    let result = query.build().execute(db.pool()).await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Project not found".to_string()));
    }

    let project =
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ? AND user_id = ?")
            .bind(&id)
            .bind(&user.sub)
            .fetch_one(db.pool())
            .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "project": project
    })))
}

/// DELETE /api/projects/{id} - content in the project survives with a nulled
/// project_id (ON DELETE SET NULL).
#[delete("/{id}")]
pub async fn delete_project(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM projects WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&user.sub)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Project not found".to_string()));
    }

    log::info!("🗑️  Project deleted: {} by user {}", id, user.sub);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Project deleted"
    })))
}
