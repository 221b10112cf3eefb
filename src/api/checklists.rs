use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::database::Database;
use crate::middleware::auth::Claims;
use crate::models::{
    checklist::encode_items, encode_tags, Checklist, ChecklistResponse, ContentListQuery,
    CreateChecklistRequest, UpdateChecklistRequest,
};
use crate::utils::AppError;

/// GET /api/checklists
#[get("")]
pub async fn list_checklists(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    query: web::Query<ContentListQuery>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM checklists WHERE user_id = ");
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

    let rows: Vec<Checklist> = qb.build_query_as().fetch_all(db.pool()).await?;

    let mut checklists: Vec<ChecklistResponse> = rows.into_iter().map(Into::into).collect();
    if let Some(tag) = &query.tag {
        checklists.retain(|c| c.tags.iter().any(|t| t == tag));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "checklists": checklists,
        "total": checklists.len()
    })))
}

/// POST /api/checklists
#[post("")]
pub async fn create_checklist(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    request: web::Json<CreateChecklistRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;
    let request = request.into_inner();

    if request.title.trim().is_empty() {
        return Err(AppError::InvalidRequest("Title is required".to_string()));
    }

    let now = Utc::now().timestamp();
    let checklist = Checklist {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.clone(),
        folder_id: request.folder_id,
        project_id: request.project_id,
        title: request.title,
        items: encode_items(&request.items),
        tags: encode_tags(&request.tags),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO checklists (id, user_id, folder_id, project_id, title, items, tags, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&checklist.id)
    .bind(&checklist.user_id)
    .bind(&checklist.folder_id)
    .bind(&checklist.project_id)
    .bind(&checklist.title)
    .bind(&checklist.items)
    .bind(&checklist.tags)
    .bind(checklist.created_at)
    .bind(checklist.updated_at)
    .execute(db.pool())
    .await?;

    log::info!("📝 Checklist created: {} by user {}", checklist.id, user_id);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "checklist": ChecklistResponse::from(checklist)
    })))
}

/// GET /api/checklists/{id}
#[get("/{id}")]
pub async fn get_checklist(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;
    let id = path.into_inner();

    let checklist =
        sqlx::query_as::<_, Checklist>("SELECT * FROM checklists WHERE id = ? AND user_id = ?")
            .bind(&id)
            .bind(user_id)
            .fetch_optional(db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("Checklist not found".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "checklist": ChecklistResponse::from(checklist)
    })))
}

/// PATCH /api/checklists/{id}
#[patch("/{id}")]
pub async fn update_checklist(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
    request: web::Json<UpdateChecklistRequest>,
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
        return Err(AppError::NotFound("Checklist not found".to_string()));
    }

    let checklist =
        sqlx::query_as::<_, Checklist>("SELECT * FROM checklists WHERE id = ? AND user_id = ?")
            .bind(&id)
            .bind(user_id)
            .fetch_one(db.pool())
            .await?;

    log::info!("🔧 Checklist updated: {} by user {}", id, user_id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "checklist": ChecklistResponse::from(checklist)
    })))
}

/// DELETE /api/checklists/{id}
#[delete("/{id}")]
pub async fn delete_checklist(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM checklists WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(user_id)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Checklist not found".to_string()));
    }

    log::info!("🗑️  Checklist deleted: {} by user {}", id, user_id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Checklist deleted"
    })))
}
