use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::database::Database;
use crate::middleware::auth::Claims;
use crate::models::{
    encode_tags, ContentListQuery, CreateSnippetRequest, Snippet, SnippetResponse,
    UpdateSnippetRequest,
};
use crate::utils::AppError;

/// GET /api/snippets - lists the caller's snippets, newest-updated first.
/// Optional folder_id / project_id / tag filters.
#[utoipa::path(
    get,
    path = "/api/snippets",
    tag = "Snippets",
    responses((status = 200, description = "Snippet list", body = [SnippetResponse])),
    security(("bearer_auth" = []))
)]
#[get("")]
pub async fn list_snippets(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    query: web::Query<ContentListQuery>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM snippets WHERE user_id = ");
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

    let rows: Vec<Snippet> = qb.build_query_as().fetch_all(db.pool()).await?;

    let mut snippets: Vec<SnippetResponse> = rows.into_iter().map(Into::into).collect();
    // Tag membership is checked against the decoded array, not the raw JSON
    if let Some(tag) = &query.tag {
        snippets.retain(|s| s.tags.iter().any(|t| t == tag));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "snippets": snippets,
        "total": snippets.len()
    })))
}

/// POST /api/snippets - creates a snippet for the caller.
#[utoipa::path(
    post,
    path = "/api/snippets",
    tag = "Snippets",
    request_body = CreateSnippetRequest,
    responses((status = 201, description = "Snippet created", body = SnippetResponse)),
    security(("bearer_auth" = []))
)]
#[post("")]
pub async fn create_snippet(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    request: web::Json<CreateSnippetRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;
    let request = request.into_inner();

    if request.title.trim().is_empty() {
        return Err(AppError::InvalidRequest("Title is required".to_string()));
    }

    let now = Utc::now().timestamp();
    let snippet = Snippet {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.clone(),
        folder_id: request.folder_id,
        project_id: request.project_id,
        title: request.title,
        code: request.code,
        language: request.language.unwrap_or_else(|| "plaintext".to_string()),
        tags: encode_tags(&request.tags),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO snippets (id, user_id, folder_id, project_id, title, code, language, tags, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&snippet.id)
    .bind(&snippet.user_id)
    .bind(&snippet.folder_id)
    .bind(&snippet.project_id)
    .bind(&snippet.title)
    .bind(&snippet.code)
    .bind(&snippet.language)
    .bind(&snippet.tags)
    .bind(snippet.created_at)
    .bind(snippet.updated_at)
    .execute(db.pool())
    .await?;

    log::info!("📝 Snippet created: {} by user {}", snippet.id, user_id);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "snippet": SnippetResponse::from(snippet)
    })))
}

/// GET /api/snippets/{id} - 404 when absent or owned by someone else.
#[utoipa::path(
    get,
    path = "/api/snippets/{id}",
    tag = "Snippets",
    responses(
        (status = 200, description = "Snippet found", body = SnippetResponse),
        (status = 404, description = "Snippet not found")
    ),
    security(("bearer_auth" = []))
)]
#[get("/{id}")]
pub async fn get_snippet(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;
    let id = path.into_inner();

    let snippet = sqlx::query_as::<_, Snippet>(
        "SELECT * FROM snippets WHERE id = ? AND user_id = ?",
    )
    .bind(&id)
    .bind(user_id)
    .fetch_optional(db.pool())
    .await?
    .ok_or_else(|| AppError::NotFound("Snippet not found".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "snippet": SnippetResponse::from(snippet)
    })))
}

/// PATCH /api/snippets/{id} - partial update; only provided fields change.
#[patch("/{id}")]
pub async fn update_snippet(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
    request: web::Json<UpdateSnippetRequest>,
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
        return Err(AppError::NotFound("Snippet not found".to_string()));
    }

    let snippet = sqlx::query_as::<_, Snippet>(
        "SELECT * FROM snippets WHERE id = ? AND user_id = ?",
    )
    .bind(&id)
    .bind(user_id)
    .fetch_one(db.pool())
    .await?;

    log::info!("🔧 Snippet updated: {} by user {}", id, user_id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "snippet": SnippetResponse::from(snippet)
    })))
}

/// DELETE /api/snippets/{id}
#[delete("/{id}")]
pub async fn delete_snippet(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = &user.sub;
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM snippets WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(user_id)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Snippet not found".to_string()));
    }

    log::info!("🗑️  Snippet deleted: {} by user {}", id, user_id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Snippet deleted"
    })))
}
