/// Core Server Framework Module
///
/// This module contains the core server implementation:
/// - config.rs: immutable environment-derived server configuration
/// - dispatch.rs: tool registry and validated dispatch
/// - rpc.rs: JSON-RPC 2.0 structures and method routing
/// - server.rs: STDIO and HTTP transports

pub mod config;
pub mod dispatch;
pub mod rpc;
pub mod server;
