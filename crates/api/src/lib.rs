//! HTTP surface for the notification registry.
//!
//! Endpoints:
//! - POST /set_notification — Register a notification
//! - GET  /list_notifications — List registered notifications
//! - GET  /notifications/{id} — Fetch one notification
//! - POST /send_notifications — Dispatch a notification to email recipients
//! - GET  /health — Liveness and store size

pub mod routes;
pub mod state;
