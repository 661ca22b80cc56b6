//! HTTP and WebSocket handlers.

pub mod http;
pub mod session;
pub mod websocket;

pub use http::{admin_state, health_check, list_messages, list_participants};
pub use websocket::websocket_handler;
