use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::database::Database;
use crate::middleware::auth::Claims;
use crate::models::{
    encode_tags, ContentListQuery, CreateSmartNoteRequest, SmartNote, SmartNoteResponse,
    UpdateSmartNoteRequest,
};
use crate::utils::AppError;

/// GET /api/smart-notes
#[get("")]
pub async fn list_smart_notes(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    query: web::Query<ContentListQuery>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM smart_notes WHERE user_id = ");
    qb.push_bind(user_id.clone());
    if let Some(folder_id) = &query.folder_id {
        qb.push(" AND folder_id = ");
        qb.push_bind(folder_id.clone());
    }
    if let Some(project_id) = &query.project_id {
        qb.push(" AND project_id = ");
        qb.push_bind(project_id.clone());
    }
    qb.push(" ORDER BY updated_at DESC");

    let rows: Vec<SmartNote> = qb.build_query_as().fetch_all(db.pool()).await?;

    let mut smart_notes: Vec<SmartNoteResponse> = rows.into_iter().map(Into::into).collect();
    if let Some(tag) = &query.tag {
        smart_notes.retain(|n| n.tags.iter().any(|t| t == tag));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "smart_notes": smart_notes,
        "total": smart_notes.len()
    })))
}

/// POST /api/smart-notes
#[post("")]
pub async fn create_smart_note(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    request: web::Json<CreateSmartNoteRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;
    let request = request.into_inner();

    if request.title.trim().is_empty() {
        return Err(AppError::InvalidRequest("Title is required".to_string()));
    }

    let now = Utc::now().timestamp();
    let smart_note = SmartNote {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.clone(),
        folder_id: request.folder_id,
        project_id: request.project_id,
        title: request.title,
        html: request.html,
        tags: encode_tags(&request.tags),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO smart_notes (id, user_id, folder_id, project_id, title, html, tags, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&smart_note.id)
    .bind(&smart_note.user_id)
    .bind(&smart_note.folder_id)
    .bind(&smart_note.project_id)
    .bind(&smart_note.title)
    .bind(&smart_note.html)
    .bind(&smart_note.tags)
    .bind(smart_note.created_at)
    .bind(smart_note.updated_at)
    .execute(db.pool())
    .await?;

    log::info!("📝 Smart note created: {} by user {}", smart_note.id, user_id);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "smart_note": SmartNoteResponse::from(smart_note)
    })))
}

/// GET /api/smart-notes/{id}
#[get("/{id}")]
pub async fn get_smart_note(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;
    let id = path.into_inner();

    let smart_note =
        sqlx::query_as::<_, SmartNote>("SELECT * FROM smart_notes WHERE id = ? AND user_id = ?")
            .bind(&id)
            .bind(user_id)
            .fetch_optional(db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("Smart note not found".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "smart_note": SmartNoteResponse::from(smart_note)
    })))
}

/// PATCH /api/smart-notes/{id}
#[patch("/{id}")]
pub async fn update_smart_note(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
    request: web::Json<UpdateSmartNoteRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;
    let id = path.into_inner();

    if request.is_empty() {
        return Err(AppError::InvalidRequest("No fields to update".to_string()));
    }

    let now = Utc::now().timestamp();
    let mut query = request.to_update_query(&id, user_id, now);
    let result = query.build().execute(db.pool()).await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Smart note not found".to_string()));
    }

    let smart_note =
        sqlx::query_as::<_, SmartNote>("SELECT * FROM smart_notes WHERE id = ? AND user_id = ?")
            .bind(&id)
            .bind(user_id)
            .fetch_one(db.pool())
            .await?;

    log::info!("🔧 Smart note updated: {} by user {}", id, user_id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "smart_note": SmartNoteResponse::from(smart_note)
    })))
}

/// DELETE /api/smart-notes/{id}
#[delete("/{id}")]
pub async fn delete_smart_note(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM smart_notes WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(user_id)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Smart note not found".to_string()));
    }

    log::info!("🗑️  Smart note deleted: {} by user {}", id, user_id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Smart note deleted"
    })))
}
