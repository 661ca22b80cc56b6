//! Real-time chat hub.
//!
//! Accepts WebSocket connections, keeps a live registry of participants,
//! broadcasts chat messages to everyone connected and persists them to SQLite
//! so that newcomers receive the recent backlog.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
