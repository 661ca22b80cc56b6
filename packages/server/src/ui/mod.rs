//! WebSocket chat hub server: axum router, handlers and the per-connection session.

mod handler;
mod server;
mod signal;
pub mod state;

pub use handler::session::{ChatSession, SessionState};
pub use server::{Server, router};
pub use state::{AppState, SessionConfig};
