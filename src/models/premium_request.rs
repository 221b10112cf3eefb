use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_DENIED: &str = "denied";

pub const MIN_DURATION_DAYS: i64 = 1;
pub const MAX_DURATION_DAYS: i64 = 365;

/// Premium access request. Reviewed by an admin; approval grants the owner a
/// time-boxed `premium_until` window.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PremiumRequest {
    pub id: String,
    pub user_id: String,
    pub reason: String,
    pub duration_days: i64,
    pub status: String,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl PremiumRequest {
    pub fn is_pending(&self) -> bool {
        self.status == STATUS_PENDING
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePremiumRequestBody {
    pub reason: String,
    pub duration_days: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReviewPremiumRequestBody {
    pub action: ReviewAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Deny,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_action_parses_lowercase() {
        let body: ReviewPremiumRequestBody = serde_json::from_str(r#"{"action":"approve"}"#).unwrap();
        assert_eq!(body.action, ReviewAction::Approve);
        let body: ReviewPremiumRequestBody = serde_json::from_str(r#"{"action":"deny"}"#).unwrap();
        assert_eq!(body.action, ReviewAction::Deny);
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(serde_json::from_str::<ReviewPremiumRequestBody>(r#"{"action":"maybe"}"#).is_err());
    }
}
