/// Server Configuration
///
/// Immutable configuration built once from the environment at process start
/// and passed by reference everywhere else. No module-level mutable state.
///
/// Environment Variables:
/// - SERVER_NAME: Name reported in MCP initialize responses (default: "friendly-octo-lamp-mcp-server")
/// - SERVER_VERSION: Version string (default: "1.0.0")
/// - MCP_TRANSPORT_MODE: "stdio", "http", or "both" (default: "both")
/// - HOST: Bind address for HTTP mode (default: "0.0.0.0")
/// - PORT: Port number for HTTP mode (default: 3000)
/// - WORKER_THREADS: HTTP worker count override (default: CPU count, capped at 16)
/// - APP_ENV: Environment name reported by /security/status (default: "development")

use std::env;
use std::str::FromStr;

use thiserror::Error;

/// Which transport(s) the process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Stdio,
    Http,
    /// Stdio in a background task, HTTP in the foreground.
    Both,
}

#[derive(Debug, Error)]
#[error("invalid transport mode '{0}': must be 'stdio', 'http', or 'both'")]
pub struct InvalidTransportMode(String);

impl FromStr for TransportMode {
    type Err = InvalidTransportMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(TransportMode::Stdio),
            "http" => Ok(TransportMode::Http),
            "both" => Ok(TransportMode::Both),
            other => Err(InvalidTransportMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server name as reported in MCP initialize responses
    pub name: String,
    /// Server version string as reported in MCP initialize responses
    pub version: String,
    pub transport: TransportMode,
    /// Bind address for HTTP mode
    pub host: String,
    pub port: u16,
    /// HTTP worker count override; sized from the CPU count when absent
    pub workers: Option<usize>,
    /// Environment name surfaced by the demo app
    pub environment: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, InvalidTransportMode> {
        let transport = env_or("MCP_TRANSPORT_MODE", "both").parse()?;
        Ok(Self {
            name: env_or("SERVER_NAME", "friendly-octo-lamp-mcp-server"),
            version: env_or("SERVER_VERSION", "1.0.0"),
            transport,
            host: env_or("HOST", "0.0.0.0"),
            port: env_or("PORT", "3000").parse().unwrap_or(3000),
            workers: env::var("WORKER_THREADS").ok().and_then(|s| s.parse().ok()),
            environment: env_or("APP_ENV", "development"),
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            name: "friendly-octo-lamp-mcp-server".to_string(),
            version: "1.0.0".to_string(),
            transport: TransportMode::Both,
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: None,
            environment: "test".to_string(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
