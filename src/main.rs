//! Hearth - social events, check-ins, goals and groups

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hearth::{
    config::Args,
    db::{schemas, DocumentStore, MemoryStore, MongoStore},
    server::{self, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("hearth={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Hearth");
    info!("======================================");
    info!("Listen: {}", args.listen());
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("Database: {}", args.mongodb_db);
    info!("Max body: {} bytes", args.max_body_bytes);
    info!("======================================");

    let store = connect_store(&args).await;
    let state = Arc::new(AppState::new(args, store));

    server::run(state).await?;

    Ok(())
}

/// MongoDB when configured and reachable; in dev mode, memory otherwise
async fn connect_store(args: &Args) -> Arc<dyn DocumentStore> {
    let Some(uri) = args.mongo_uri.as_deref().filter(|uri| !uri.is_empty()) else {
        warn!("No MONGO_URI set (dev mode), using in-memory storage");
        return Arc::new(MemoryStore::new());
    };

    let connected = match MongoStore::new(uri, &args.mongodb_db).await {
        Ok(store) => schemas::ensure_indexes(&store).await.map(|_| store),
        Err(e) => Err(e),
    };

    match connected {
        Ok(store) => {
            info!("MongoDB connected successfully (database '{}')", store.db_name());
            Arc::new(store)
        }
        Err(e) if args.dev_mode => {
            warn!("MongoDB connection failed (dev mode, using in-memory storage): {}", e);
            Arc::new(MemoryStore::new())
        }
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    }
}
