//! Configuration for Hearth
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::{IpAddr, SocketAddr};

/// Hearth - social events, check-ins, goals and groups
#[derive(Parser, Debug, Clone)]
#[command(name = "hearth")]
#[command(about = "HTTP service for events, check-ins, achievements, friendships and groups")]
pub struct Args {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// MongoDB connection string (required unless dev mode is enabled)
    #[arg(long, env = "MONGO_URI")]
    pub mongo_uri: Option<String>,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "hearth")]
    pub mongodb_db: String,

    /// Enable development mode (falls back to in-memory storage)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Largest accepted request body in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "65536")]
    pub max_body_bytes: usize,
}

impl Args {
    /// Socket address the HTTP server binds to
    pub fn listen(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.mongo_uri.as_deref().map_or(true, str::is_empty) {
            return Err("MONGO_URI is required unless DEV_MODE is enabled".to_string());
        }

        if self.mongodb_db.is_empty() {
            return Err("MONGODB_DB must not be empty".to_string());
        }

        if self.max_body_bytes == 0 {
            return Err("MAX_BODY_BYTES must be greater than zero".to_string());
        }

        Ok(())
    }
}
