pub mod auth_service;
pub mod premium_service;
pub mod search_service;
