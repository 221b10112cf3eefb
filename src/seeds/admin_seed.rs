use crate::database::Database;
use bcrypt::{hash, DEFAULT_COST};
use chrono::Utc;
use uuid::Uuid;

/// Seeds the default admin account at startup. Skipped as soon as any admin
/// exists, so a renamed or re-credentialed admin is never recreated. Failures
/// are logged and never abort startup.
pub async fn seed_default_admin(db: &Database) {
    let admins: i64 = match sqlx::query_scalar(
        r#"SELECT COUNT(*) FROM users WHERE roles LIKE '%"admin"%'"#,
    )
    .fetch_one(db.pool())
    .await
    {
        Ok(count) => count,
        Err(e) => {
            log::error!("❌ Admin seed: failed to count admins: {}", e);
            return;
        }
    };

    if admins > 0 {
        log::info!("👤 Admin seed: {} admin(s) already present, skipping", admins);
        return;
    }

    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@notebox.local".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin-change-me".to_string());

    let hashed = match hash(&password, DEFAULT_COST) {
        Ok(h) => h,
        Err(e) => {
            log::error!("❌ Admin seed: failed to hash password: {}", e);
            return;
        }
    };

    let now = Utc::now().timestamp();
    let result = sqlx::query(
        "INSERT INTO users (id, email, password, name, roles, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, 'Administrator', '[\"user\",\"admin\"]', 1, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&email)
    .bind(&hashed)
    .bind(now)
    .bind(now)
    .execute(db.pool())
    .await;

    match result {
        Ok(_) => log::info!("   ✅ Seeded default admin: {}", email),
        Err(e) => log::error!("   ❌ Failed to seed default admin: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_creates_single_admin() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        seed_default_admin(&db).await;
        // Idempotent on a second run
        seed_default_admin(&db).await;

        let admins: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM users WHERE roles LIKE '%"admin"%'"#)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(admins, 1);
    }
}
