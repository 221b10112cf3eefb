pub mod auth;
pub mod checklists;
pub mod folders;
pub mod health;
pub mod metrics;
pub mod notes;
pub mod premium_requests;
pub mod projects;
pub mod search;
pub mod smart_notes;
pub mod snippets;
pub mod swagger;
pub mod tags;
pub mod users;
