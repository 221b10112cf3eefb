use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "NoteBox Service API",
        version = "1.0.0",
        description = "Personal productivity backend: code snippets, notes, checklists, and smart notes organized into projects, folders, and tags.\n\n**Authentication:** All resource endpoints require a JWT Bearer token.\n\n**Admin surface:** user management and the premium request approval workflow require the `admin` role."
    ),
    paths(
        // Auth endpoints
        crate::api::auth::login,
        crate::api::auth::register,
        crate::api::auth::verify_token,
        crate::api::auth::get_me,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,

        // Snippets (representative content resource; notes, checklists and
        // smart notes share the same shape)
        crate::api::snippets::list_snippets,
        crate::api::snippets::create_snippet,
        crate::api::snippets::get_snippet,
    ),
    components(
        schemas(
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::AuthResponse,
            crate::models::UserInfo,
            crate::api::health::HealthResponse,
            crate::models::CreateSnippetRequest,
            crate::models::UpdateSnippetRequest,
            crate::models::SnippetResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Authentication and account endpoints (email + password)."),
        (name = "Health", description = "Health check and metrics endpoints for monitoring."),
        (name = "Snippets", description = "Code snippet CRUD. Owner-scoped; tags round-trip as JSON arrays."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}
