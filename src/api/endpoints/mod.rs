pub mod auth;
pub mod box_status;
pub mod health;
pub mod history;
pub mod medications;
pub mod notifications;
