//! echo-client: send one message to an echo server and print the reply.
//!
//! Resolves the target host, connects, sends a single newline-terminated
//! message, reads the echo, prints it to stdout, and exits. Any setup or
//! I/O failure exits with a non-zero status.

use clap::Parser;
use echo_server::client;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the echo client
#[derive(Parser, Debug)]
#[command(name = "echo-client")]
#[command(version = "0.1.0")]
#[command(about = "Send one message to an echo server and print the reply", long_about = None)]
struct CliArgs {
    /// Host to connect to
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port to connect to
    #[arg(short, long, default_value_t = 9000)]
    port: u16,

    /// Message to send (a trailing newline is appended if missing)
    #[arg(short, long, default_value = "Hello from client")]
    message: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let reply = client::fetch_echo(&args.host, args.port, &args.message).await?;
    print!("{}", String::from_utf8_lossy(&reply));

    Ok(())
}
