mod api;
mod database;
mod middleware;
mod models;
mod seeds;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3002".to_string());
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://notebox.db".to_string());
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    log::info!("🚀 Starting NoteBox Service...");
    log::info!("📊 Database: {}", database_url);

    // Connect pool + run idempotent schema migration
    let db = database::Database::new(&database_url)
        .await
        .expect("Failed to open database");

    let db_data = web::Data::new(db.clone());

    log::info!("✅ Database connected");

    // 🌱 Seed default admin account (skipped when one exists)
    seeds::admin_seed::seed_default_admin(&db).await;

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://127.0.0.1:3000")
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Metrics
            .route("/metrics", web::get().to(api::metrics::get_metrics))
            // Auth endpoints (public scope; verify/me/delete parse the bearer
            // header themselves)
            .service(
                web::scope("/api/auth")
                    .route("/login", web::post().to(api::auth::login))
                    .route("/register", web::post().to(api::auth::register))
                    .route("/refresh", web::post().to(api::auth::refresh_token))
                    .route("/verify", web::get().to(api::auth::verify_token))
                    .route("/me", web::get().to(api::auth::get_me))
                    .route("/delete-account", web::delete().to(api::auth::delete_account)),
            )
            // ==================== CONTENT RESOURCES ====================
            // All owner-scoped CRUD behind the JWT middleware
            .service(
                web::scope("/api/snippets")
                    .wrap(middleware::auth::AuthMiddleware)
                    .service(api::snippets::list_snippets)
                    .service(api::snippets::create_snippet)
                    .service(api::snippets::get_snippet)
                    .service(api::snippets::update_snippet)
                    .service(api::snippets::delete_snippet),
            )
            .service(
                web::scope("/api/notes")
                    .wrap(middleware::auth::AuthMiddleware)
                    .service(api::notes::list_notes)
                    .service(api::notes::create_note)
                    .service(api::notes::get_note)
                    .service(api::notes::update_note)
                    .service(api::notes::delete_note),
            )
            .service(
                web::scope("/api/checklists")
                    .wrap(middleware::auth::AuthMiddleware)
                    .service(api::checklists::list_checklists)
                    .service(api::checklists::create_checklist)
                    .service(api::checklists::get_checklist)
                    .service(api::checklists::update_checklist)
                    .service(api::checklists::delete_checklist),
            )
            .service(
                web::scope("/api/smart-notes")
                    .wrap(middleware::auth::AuthMiddleware)
                    .service(api::smart_notes::list_smart_notes)
                    .service(api::smart_notes::create_smart_note)
                    .service(api::smart_notes::get_smart_note)
                    .service(api::smart_notes::update_smart_note)
                    .service(api::smart_notes::delete_smart_note),
            )
            // ==================== GROUPINGS ====================
            .service(
                web::scope("/api/projects")
                    .wrap(middleware::auth::AuthMiddleware)
                    .service(api::projects::list_projects)
                    .service(api::projects::create_project)
                    .service(api::projects::get_project)
                    .service(api::projects::update_project)
                    .service(api::projects::delete_project),
            )
            .service(
                web::scope("/api/folders")
                    .wrap(middleware::auth::AuthMiddleware)
                    .service(api::folders::list_folders)
                    .service(api::folders::create_folder)
                    .service(api::folders::get_folder)
                    .service(api::folders::update_folder)
                    .service(api::folders::delete_folder),
            )
            .service(
                web::scope("/api/tags")
                    .wrap(middleware::auth::AuthMiddleware)
                    .service(api::tags::list_tags)
                    .service(api::tags::create_tag)
                    .service(api::tags::get_tag)
                    .service(api::tags::update_tag)
                    .service(api::tags::delete_tag),
            )
            // ==================== SEARCH ====================
            .service(
                web::scope("/api/search")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("", web::get().to(api::search::search)),
            )
            // ==================== PREMIUM WORKFLOW ====================
            .service(
                web::scope("/api/premium-requests")
                    .wrap(middleware::auth::AuthMiddleware)
                    .service(api::premium_requests::list_premium_requests)
                    .service(api::premium_requests::create_premium_request)
                    .service(api::premium_requests::get_premium_request)
                    .service(api::premium_requests::review_premium_request)
                    .service(api::premium_requests::delete_premium_request),
            )
            // ==================== ADMIN: USER MANAGEMENT ====================
            .service(
                web::scope("/api/users")
                    .wrap(middleware::auth::AuthMiddleware)
                    .service(api::users::list_users)
                    .service(api::users::get_user)
                    .service(api::users::update_user)
                    .service(api::users::delete_user),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
