/// Server Entry Point
///
/// Builds the immutable server configuration from the environment, installs
/// the tracing subscriber, and starts the configured transport(s). See
/// core::config for the recognized environment variables.

mod core;
mod tools;

use tracing_subscriber::EnvFilter;

use crate::core::config::{ServerConfig, TransportMode};
use crate::core::server;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Logs go to stderr; in STDIO mode stdout carries the JSON-RPC stream.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match config.transport {
        TransportMode::Stdio => server::run_server_stdio(config).await,
        TransportMode::Http => server::run_server_http(config).await,
        TransportMode::Both => {
            // STDIO in a background task, HTTP in the foreground
            let stdio_config = config.clone();
            let stdio_handle = tokio::spawn(async move {
                if let Err(e) = server::run_server_stdio(stdio_config).await {
                    tracing::error!(error = %e, "STDIO transport error");
                }
            });

            let http_result = server::run_server_http(config).await;

            // The process is done once the HTTP server exits
            stdio_handle.abort();

            http_result
        }
    }
}
