//! echo-server: a thread-per-connection TCP echo server.
//!
//! Accepts TCP connections and echoes one message per connection: a single
//! read of up to 1024 bytes, a single write of the same bytes, then the
//! connection is closed.
//!
//! Features:
//! - Unbounded accept loop with one tokio task per connection
//! - SO_REUSEADDR so a restarted server can rebind its port immediately
//! - Configuration via CLI arguments or TOML file

use echo_server::config::Config;
use echo_server::server::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        host = %config.host,
        port = config.port,
        "Starting echo-server"
    );

    let server = Server::bind(&config)?;
    server.run().await;

    Ok(())
}
