use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::database::Database;
use crate::middleware::auth::Claims;
use crate::models::{
    encode_tags, ContentListQuery, CreateNoteRequest, Note, NoteResponse, UpdateNoteRequest,
};
use crate::utils::AppError;

/// GET /api/notes - lists the caller's notes, newest-updated first.
#[get("")]
pub async fn list_notes(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    query: web::Query<ContentListQuery>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM notes WHERE user_id = ");
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

    let rows: Vec<Note> = qb.build_query_as().fetch_all(db.pool()).await?;

    let mut notes: Vec<NoteResponse> = rows.into_iter().map(Into::into).collect();
    if let Some(tag) = &query.tag {
        notes.retain(|n| n.tags.iter().any(|t| t == tag));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "notes": notes,
        "total": notes.len()
    })))
}

/// POST /api/notes
#[post("")]
pub async fn create_note(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    request: web::Json<CreateNoteRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;
    let request = request.into_inner();

    if request.title.trim().is_empty() {
        return Err(AppError::InvalidRequest("Title is required".to_string()));
    }

    let now = Utc::now().timestamp();
    let note = Note {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.clone(),
        folder_id: request.folder_id,
        project_id: request.project_id,
        title: request.title,
        content: request.content,
        tags: encode_tags(&request.tags),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO notes (id, user_id, folder_id, project_id, title, content, tags, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&note.id)
    .bind(&note.user_id)
    .bind(&note.folder_id)
    .bind(&note.project_id)
    .bind(&note.title)
    .bind(&note.content)
    .bind(&note.tags)
    .bind(note.created_at)
    .bind(note.updated_at)
    .execute(db.pool())
    .await?;

    log::info!("📝 Note created: {} by user {}", note.id, user_id);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "note": NoteResponse::from(note)
    })))
}

/// GET /api/notes/{id}
#[get("/{id}")]
pub async fn get_note(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;
    let id = path.into_inner();

    let note = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(user_id)
        .fetch_optional(db.pool())
        .await?
        .ok_or_else(|| AppError::NotFound("Note not found".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "note": NoteResponse::from(note)
    })))
}

/// PATCH /api/notes/{id}
#[patch("/{id}")]
pub async fn update_note(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
    request: web::Json<UpdateNoteRequest>,
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
        return Err(AppError::NotFound("Note not found".to_string()));
    }

    let note = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(user_id)
        .fetch_one(db.pool())
        .await?;

    log::info!("🔧 Note updated: {} by user {}", id, user_id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "note": NoteResponse::from(note)
    })))
}

/// DELETE /api/notes/{id}
#[delete("/{id}")]
pub async fn delete_note(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(user_id)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Note not found".to_string()));
    }

    log::info!("🗑️  Note deleted: {} by user {}", id, user_id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Note deleted"
    })))
}
