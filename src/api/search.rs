use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::database::Database;
use crate::middleware::auth::Claims;
use crate::services::search_service;
use crate::utils::AppError;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/search?q= - parallel substring scans over the caller's content.
pub async fn search(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔍 GET /search - user {} q={:?}", user.sub, query.q);

    let results = search_service::search(&db, &user.sub, &query.q).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "query": query.q,
        "total": results.total(),
        "results": results
    })))
}
