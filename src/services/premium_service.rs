use crate::database::Database;
use crate::models::{
    CreatePremiumRequestBody, PremiumRequest, ReviewAction, MAX_DURATION_DAYS, MIN_DURATION_DAYS,
    STATUS_APPROVED, STATUS_DENIED, STATUS_PENDING,
};
use crate::utils::AppError;
use chrono::Utc;
use uuid::Uuid;

const SECONDS_PER_DAY: i64 = 86_400;

/// Approval grants a window of `days` from now. When a grant is still active
/// the new window extends from the current expiry, so back-to-back approvals
/// are additive.
pub fn compute_premium_until(current: Option<i64>, now: i64, days: i64) -> i64 {
    let start = match current {
        Some(until) if until > now => until,
        _ => now,
    };
    start + days * SECONDS_PER_DAY
}

pub async fn create_request(
    db: &Database,
    user_id: &str,
    body: &CreatePremiumRequestBody,
) -> Result<PremiumRequest, AppError> {
    if body.reason.trim().is_empty() {
        return Err(AppError::InvalidRequest("A reason is required".to_string()));
    }
    if !(MIN_DURATION_DAYS..=MAX_DURATION_DAYS).contains(&body.duration_days) {
        return Err(AppError::InvalidRequest(format!(
            "duration_days must be between {} and {}",
            MIN_DURATION_DAYS, MAX_DURATION_DAYS
        )));
    }

    let pending: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM premium_requests WHERE user_id = ? AND status = ?",
    )
    .bind(user_id)
    .bind(STATUS_PENDING)
    .fetch_one(db.pool())
    .await?;

    if pending > 0 {
        return Err(AppError::Conflict(
            "A pending premium request already exists".to_string(),
        ));
    }

    let now = Utc::now().timestamp();
    let request = PremiumRequest {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        reason: body.reason.trim().to_string(),
        duration_days: body.duration_days,
        status: STATUS_PENDING.to_string(),
        reviewed_by: None,
        reviewed_at: None,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO premium_requests (id, user_id, reason, duration_days, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&request.id)
    .bind(&request.user_id)
    .bind(&request.reason)
    .bind(request.duration_days)
    .bind(&request.status)
    .bind(request.created_at)
    .bind(request.updated_at)
    .execute(db.pool())
    .await?;

    Ok(request)
}

pub async fn find_request(db: &Database, id: &str) -> Result<Option<PremiumRequest>, AppError> {
    let request = sqlx::query_as::<_, PremiumRequest>("SELECT * FROM premium_requests WHERE id = ?")
        .bind(id)
        .fetch_optional(db.pool())
        .await?;
    Ok(request)
}

pub async fn list_all(db: &Database, status: Option<&str>) -> Result<Vec<PremiumRequest>, AppError> {
    let requests = match status {
        Some(status) => {
            sqlx::query_as::<_, PremiumRequest>(
                "SELECT * FROM premium_requests WHERE status = ? ORDER BY created_at DESC",
            )
            .bind(status)
            .fetch_all(db.pool())
            .await?
        }
        None => {
            sqlx::query_as::<_, PremiumRequest>(
                "SELECT * FROM premium_requests ORDER BY created_at DESC",
            )
            .fetch_all(db.pool())
            .await?
        }
    };
    Ok(requests)
}

pub async fn list_for_user(db: &Database, user_id: &str) -> Result<Vec<PremiumRequest>, AppError> {
    let requests = sqlx::query_as::<_, PremiumRequest>(
        "SELECT * FROM premium_requests WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db.pool())
    .await?;
    Ok(requests)
}

/// Admin review. Approval stamps the reviewer and grants the request owner a
/// premium window; both writes commit together.
pub async fn review_request(
    db: &Database,
    request_id: &str,
    reviewer_id: &str,
    action: ReviewAction,
) -> Result<PremiumRequest, AppError> {
    let mut request = find_request(db, request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Premium request not found".to_string()))?;

    if !request.is_pending() {
        return Err(AppError::Conflict(format!(
            "Request has already been {}",
            request.status
        )));
    }

    let now = Utc::now().timestamp();
    let new_status = match action {
        ReviewAction::Approve => STATUS_APPROVED,
        ReviewAction::Deny => STATUS_DENIED,
    };

    let mut tx = db.pool().begin().await?;

    sqlx::query(
        "UPDATE premium_requests SET status = ?, reviewed_by = ?, reviewed_at = ?, updated_at = ? WHERE id = ?",
    )
    .bind(new_status)
    .bind(reviewer_id)
    .bind(now)
    .bind(now)
    .bind(request_id)
    .execute(&mut *tx)
    .await?;

    if action == ReviewAction::Approve {
        let current: Option<i64> =
            sqlx::query_scalar("SELECT premium_until FROM users WHERE id = ?")
                .bind(&request.user_id)
                .fetch_one(&mut *tx)
                .await?;

        let until = compute_premium_until(current, now, request.duration_days);
        sqlx::query("UPDATE users SET premium_until = ?, updated_at = ? WHERE id = ?")
            .bind(until)
            .bind(now)
            .bind(&request.user_id)
            .execute(&mut *tx)
            .await?;

        log::info!(
            "⭐ Premium granted to user {} until {} ({} days)",
            request.user_id,
            until,
            request.duration_days
        );
    }

    tx.commit().await?;

    request.status = new_status.to_string();
    request.reviewed_by = Some(reviewer_id.to_string());
    request.reviewed_at = Some(now);
    request.updated_at = now;
    Ok(request)
}

pub async fn delete_request(db: &Database, id: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM premium_requests WHERE id = ?")
        .bind(id)
        .execute(db.pool())
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Premium request not found".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth_service::{register, RegisterRequest};

    #[test]
    fn test_compute_window_without_active_grant() {
        assert_eq!(compute_premium_until(None, 1_000, 7), 1_000 + 7 * 86_400);
        // An expired grant does not extend
        assert_eq!(compute_premium_until(Some(500), 1_000, 7), 1_000 + 7 * 86_400);
    }

    #[test]
    fn test_compute_window_extends_active_grant() {
        let active_until = 1_000 + 86_400;
        assert_eq!(
            compute_premium_until(Some(active_until), 1_000, 2),
            active_until + 2 * 86_400
        );
    }

    async fn seed_user(db: &Database, email: &str) -> String {
        register(
            db,
            &RegisterRequest {
                email: email.into(),
                password: "password123".into(),
                name: None,
            },
        )
        .await
        .unwrap()
        .user
        .id
    }

    #[tokio::test]
    async fn test_approve_grants_premium_window() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let user_id = seed_user(&db, "premium@example.com").await;

        let request = create_request(
            &db,
            &user_id,
            &CreatePremiumRequestBody { reason: "need it".into(), duration_days: 30 },
        )
        .await
        .unwrap();

        let before = Utc::now().timestamp();
        let reviewed = review_request(&db, &request.id, "admin-1", ReviewAction::Approve)
            .await
            .unwrap();
        assert_eq!(reviewed.status, STATUS_APPROVED);
        assert_eq!(reviewed.reviewed_by.as_deref(), Some("admin-1"));

        let until: Option<i64> = sqlx::query_scalar("SELECT premium_until FROM users WHERE id = ?")
            .bind(&user_id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        let until = until.expect("premium_until should be set");
        assert!(until >= before + 30 * 86_400);
        assert!(until <= Utc::now().timestamp() + 30 * 86_400 + 5);
    }

    #[tokio::test]
    async fn test_deny_grants_nothing() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let user_id = seed_user(&db, "denied@example.com").await;

        let request = create_request(
            &db,
            &user_id,
            &CreatePremiumRequestBody { reason: "please".into(), duration_days: 10 },
        )
        .await
        .unwrap();
        review_request(&db, &request.id, "admin-1", ReviewAction::Deny)
            .await
            .unwrap();

        let until: Option<i64> = sqlx::query_scalar("SELECT premium_until FROM users WHERE id = ?")
            .bind(&user_id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert!(until.is_none());
    }

    #[tokio::test]
    async fn test_second_pending_request_conflicts() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let user_id = seed_user(&db, "eager@example.com").await;
        let body = CreatePremiumRequestBody { reason: "first".into(), duration_days: 5 };

        create_request(&db, &user_id, &body).await.unwrap();
        let err = create_request(&db, &user_id, &body).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_reviewing_reviewed_request_conflicts() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let user_id = seed_user(&db, "twice@example.com").await;

        let request = create_request(
            &db,
            &user_id,
            &CreatePremiumRequestBody { reason: "once".into(), duration_days: 5 },
        )
        .await
        .unwrap();
        review_request(&db, &request.id, "admin-1", ReviewAction::Deny)
            .await
            .unwrap();
        let err = review_request(&db, &request.id, "admin-1", ReviewAction::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_duration_out_of_range_rejected() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let user_id = seed_user(&db, "range@example.com").await;
        for days in [0, 366, -5] {
            let err = create_request(
                &db,
                &user_id,
                &CreatePremiumRequestBody { reason: "x".into(), duration_days: days },
            )
            .await
            .unwrap_err();
            assert!(matches!(err, AppError::InvalidRequest(_)));
        }
    }
}
