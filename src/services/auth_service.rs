use crate::database::Database;
use crate::models::{User, UserInfo};
use crate::utils::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

const TOKEN_USE_ACCESS: &str = "access";
const TOKEN_USE_REFRESH: &str = "refresh";

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub name: Option<String>,
    pub roles: Vec<String>,
    pub is_active: bool,
    pub iat: usize, // issued at
    pub exp: usize, // expiration
    pub jti: String, // JWT ID
    pub aud: String, // audience
    pub iss: String, // issuer
    pub token_use: String, // "access" or "refresh"
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == "admin")
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub refresh_token: Option<String>,
    pub user: UserInfo,
}

fn get_jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "notebox-dev-secret-change-me".to_string())
}

fn get_jwt_issuer() -> String {
    std::env::var("JWT_ISSUER").unwrap_or_else(|_| "notebox-service".to_string())
}

fn get_jwt_audience() -> String {
    std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "notebox-api".to_string())
}

// Generate JWT token (24h expiry)
pub fn generate_jwt(user: &User) -> Result<String, AppError> {
    let iat = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + Duration::hours(24)).timestamp() as usize;
    let jti = Uuid::new_v4().to_string();

    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
        roles: user.role_list(),
        is_active: user.is_active,
        iat,
        exp,
        jti,
        aud: get_jwt_audience(),
        iss: get_jwt_issuer(),
        token_use: TOKEN_USE_ACCESS.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_jwt_secret().as_ref()),
    )
    .map_err(|e| AppError::Database(format!("Failed to generate token: {}", e)))
}

// Generate refresh token (30 day expiry)
pub fn generate_refresh_token(user_id: &str) -> Result<String, AppError> {
    let iat = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + Duration::days(30)).timestamp() as usize;
    let jti = Uuid::new_v4().to_string();

    let claims = Claims {
        sub: user_id.to_string(),
        email: String::new(),
        name: None,
        roles: vec![],
        is_active: true,
        iat,
        exp,
        jti,
        aud: get_jwt_audience(),
        iss: get_jwt_issuer(),
        token_use: TOKEN_USE_REFRESH.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_jwt_secret().as_ref()),
    )
    .map_err(|e| AppError::Database(format!("Failed to generate refresh token: {}", e)))
}

fn decode_claims(token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[get_jwt_audience()]);

    let mut issuers = HashSet::new();
    issuers.insert(get_jwt_issuer());
    validation.iss = Some(issuers);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(get_jwt_secret().as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

// Verify access token (audience + issuer checked). Refresh tokens share the
// signing key but carry a different `token_use` and are rejected here, so a
// 30-day refresh token cannot be replayed as a bearer token.
pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    let claims = decode_claims(token)?;
    if claims.token_use != TOKEN_USE_ACCESS {
        return Err(AppError::Unauthorized("Not an access token".to_string()));
    }
    Ok(claims)
}

pub fn verify_refresh_token(token: &str) -> Result<Claims, AppError> {
    let claims = decode_claims(token)?;
    if claims.token_use != TOKEN_USE_REFRESH {
        return Err(AppError::Unauthorized("Not a refresh token".to_string()));
    }
    Ok(claims)
}

async fn find_user_by_email(db: &Database, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(db.pool())
        .await?;
    Ok(user)
}

pub async fn find_user_by_id(db: &Database, user_id: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(db.pool())
        .await?;
    Ok(user)
}

// User registration (local email + password only)
pub async fn register(db: &Database, request: &RegisterRequest) -> Result<AuthResponse, AppError> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::InvalidRequest("A valid email is required".to_string()));
    }
    if request.password.len() < 8 {
        return Err(AppError::InvalidRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let hashed = hash(&request.password, DEFAULT_COST)
        .map_err(|e| AppError::Database(format!("Failed to hash password: {}", e)))?;

    let now = Utc::now().timestamp();
    let user = User {
        id: Uuid::new_v4().to_string(),
        email,
        password: Some(hashed),
        name: request.name.clone(),
        roles: r#"["user"]"#.to_string(),
        is_active: true,
        premium_until: None,
        created_at: now,
        updated_at: now,
        last_login: Some(now),
    };

    let result = sqlx::query(
        "INSERT INTO users (id, email, password, name, roles, is_active, premium_until, created_at, updated_at, last_login) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.password)
    .bind(&user.name)
    .bind(&user.roles)
    .bind(user.is_active)
    .bind(user.premium_until)
    .bind(user.created_at)
    .bind(user.updated_at)
    .bind(user.last_login)
    .execute(db.pool())
    .await;

    match result {
        Ok(_) => {}
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(AppError::Conflict("User already exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    log::info!("✅ User registered: {}", user.email);

    let token = generate_jwt(&user)?;
    let refresh_token = generate_refresh_token(&user.id)?;

    Ok(AuthResponse {
        success: true,
        token,
        refresh_token: Some(refresh_token),
        user: UserInfo::from_user(&user, now),
    })
}

// User login
pub async fn login(db: &Database, request: &LoginRequest) -> Result<AuthResponse, AppError> {
    let email = request.email.trim().to_lowercase();
    let user = find_user_by_email(db, &email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let stored = user
        .password
        .as_ref()
        .ok_or_else(|| AppError::Unauthorized("This account has no password set".to_string()))?;

    let valid = verify(&request.password, stored)
        .map_err(|e| AppError::Database(format!("Password verification error: {}", e)))?;

    if !valid {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    if !user.is_active {
        return Err(AppError::Forbidden("Account is inactive".to_string()));
    }

    let now = Utc::now().timestamp();
    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(now)
        .bind(&user.id)
        .execute(db.pool())
        .await?;

    let token = generate_jwt(&user)?;
    let refresh_token = generate_refresh_token(&user.id)?;

    Ok(AuthResponse {
        success: true,
        token,
        refresh_token: Some(refresh_token),
        user: UserInfo::from_user(&user, now),
    })
}

// Refresh token: exchanges a valid refresh token for a new pair
pub async fn refresh_token(
    db: &Database,
    request: &RefreshTokenRequest,
) -> Result<AuthResponse, AppError> {
    let claims = verify_refresh_token(&request.refresh_token)?;

    let user = find_user_by_id(db, &claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    if !user.is_active {
        return Err(AppError::Forbidden("Account is inactive".to_string()));
    }

    let token = generate_jwt(&user)?;
    let new_refresh_token = generate_refresh_token(&user.id)?;

    Ok(AuthResponse {
        success: true,
        token,
        refresh_token: Some(new_refresh_token),
        user: UserInfo::from_user(&user, Utc::now().timestamp()),
    })
}

// Get current user info
pub async fn get_current_user(db: &Database, user_id: &str) -> Result<UserInfo, AppError> {
    let user = find_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(UserInfo::from_user(&user, Utc::now().timestamp()))
}

/// Deletes the user and every owned row in one transaction. The foreign keys
/// cascade as well; the explicit deletes keep the per-table counts loggable.
pub async fn delete_user_account(db: &Database, user_id: &str) -> Result<(), AppError> {
    let mut tx = db.pool().begin().await?;

    for table in [
        "snippets",
        "notes",
        "checklists",
        "smart_notes",
        "folders",
        "projects",
        "tags",
        "premium_requests",
    ] {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE user_id = ?", table))
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() > 0 {
            log::info!("🗑️  Deleted {} rows from {} for user {}", result.rows_affected(), table, user_id);
        }
    }

    let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }

    tx.commit().await?;

    log::info!("🎉 Account and all data deleted for user {}", user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "u1".into(),
            email: "test@example.com".into(),
            password: None,
            name: Some("Test".into()),
            roles: r#"["user","admin"]"#.into(),
            is_active: true,
            premium_until: None,
            created_at: 0,
            updated_at: 0,
            last_login: None,
        }
    }

    #[test]
    fn test_jwt_round_trip() {
        let user = sample_user();
        let token = generate_jwt(&user).unwrap();
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "test@example.com");
        assert!(claims.is_admin());
    }

    #[test]
    fn test_expired_token_rejected() {
        let iat = (Utc::now() - Duration::hours(48)).timestamp() as usize;
        let exp = (Utc::now() - Duration::hours(24)).timestamp() as usize;
        let claims = Claims {
            sub: "u1".into(),
            email: String::new(),
            name: None,
            roles: vec![],
            is_active: true,
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
            aud: get_jwt_audience(),
            iss: get_jwt_issuer(),
            token_use: TOKEN_USE_ACCESS.to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(get_jwt_secret().as_ref()),
        )
        .unwrap();
        assert!(verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify_token("not.a.jwt").is_err());
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let token = generate_refresh_token("u1").unwrap();
        assert!(verify_token(&token).is_err());
        assert!(verify_refresh_token(&token).is_ok());
    }

    #[test]
    fn test_access_token_is_not_a_refresh_token() {
        let token = generate_jwt(&sample_user()).unwrap();
        assert!(verify_refresh_token(&token).is_err());
        assert!(verify_token(&token).is_ok());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let request = RegisterRequest {
            email: "Alice@Example.com".into(),
            password: "correct horse".into(),
            name: Some("Alice".into()),
        };
        let registered = register(&db, &request).await.unwrap();
        // Email is normalized on the way in
        assert_eq!(registered.user.email, "alice@example.com");
        assert_eq!(registered.user.roles, vec!["user".to_string()]);

        let login_response = login(
            &db,
            &LoginRequest {
                email: "alice@example.com".into(),
                password: "correct horse".into(),
            },
        )
        .await
        .unwrap();
        assert!(login_response.success);
        assert_eq!(login_response.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password_rejected() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        register(
            &db,
            &RegisterRequest {
                email: "bob@example.com".into(),
                password: "hunter2hunter2".into(),
                name: None,
            },
        )
        .await
        .unwrap();

        let err = login(
            &db,
            &LoginRequest {
                email: "bob@example.com".into(),
                password: "wrong password".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let request = RegisterRequest {
            email: "dup@example.com".into(),
            password: "password123".into(),
            name: None,
        };
        register(&db, &request).await.unwrap();
        let err = register(&db, &request).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let err = register(
            &db,
            &RegisterRequest {
                email: "short@example.com".into(),
                password: "short".into(),
                name: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_delete_account_removes_owned_content() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let registered = register(
            &db,
            &RegisterRequest {
                email: "gone@example.com".into(),
                password: "password123".into(),
                name: None,
            },
        )
        .await
        .unwrap();
        let user_id = registered.user.id.clone();

        sqlx::query(
            "INSERT INTO snippets (id, user_id, title, code, created_at, updated_at) VALUES ('s1', ?, 't', 'c', 0, 0)",
        )
        .bind(&user_id)
        .execute(db.pool())
        .await
        .unwrap();

        delete_user_account(&db, &user_id).await.unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM snippets WHERE user_id = ?")
            .bind(&user_id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(remaining, 0);
        assert!(find_user_by_id(&db, &user_id).await.unwrap().is_none());
    }
}
