//! Veranda chat hub: WebSocket broadcast with SQLite-backed history.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin veranda-server
//! cargo run --bin veranda-server -- --host 0.0.0.0 --port 3000 --db-path /var/lib/veranda/chat.db
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use veranda_server::{
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{ConnectionTable, InMemoryParticipantRegistry, SqliteMessageRepository},
    },
    ui::{AppState, Server, SessionConfig},
};
use veranda_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "veranda-server")]
#[command(about = "WebSocket chat hub with persistent history", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8000")]
    port: u16,

    /// SQLite database file holding the message history
    #[arg(long, default_value = "chat.db")]
    db_path: PathBuf,

    /// Seconds between server-sent WebSocket pings
    #[arg(long, default_value = "25", value_parser = clap::value_parser!(u64).range(1..))]
    heartbeat_secs: u64,

    /// Close connections silent for this many seconds
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
    idle_timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger("veranda_server", env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Message store
    // 2. Connection table shared by registry and pusher
    // 3. AppState (use cases)
    // 4. Server
    let clock = Arc::new(SystemClock);

    // 1. Message store (SQLite)
    let repository = match SqliteMessageRepository::open(&args.db_path, clock.clone()).await {
        Ok(repository) => repository,
        Err(e) => {
            tracing::error!("Failed to open '{}': {}", args.db_path.display(), e);
            std::process::exit(1);
        }
    };
    tracing::info!("Message store opened at '{}'", args.db_path.display());

    // 2. Registry and MessagePusher over one connection table
    let table = ConnectionTable::shared();
    let registry = Arc::new(InMemoryParticipantRegistry::new(table.clone(), clock));
    let message_pusher = Arc::new(WebSocketMessagePusher::new(table));

    // 3. AppState
    let session_config = SessionConfig {
        heartbeat_interval: Duration::from_secs(args.heartbeat_secs),
        idle_timeout: Duration::from_secs(args.idle_timeout_secs),
    };
    let app_state = AppState::new(
        registry,
        Arc::new(repository),
        message_pusher,
        session_config,
    );

    // 4. Create and run the server
    let server = Server::new(app_state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
