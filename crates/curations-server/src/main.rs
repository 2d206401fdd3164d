use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use curations_api::AppState;
use curations_forum::{FORUM_INSTANCE, ForumRegistry};
use curations_kv::KvStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "curations_server=debug,curations_api=debug,curations_forum=debug,curations_kv=debug,tower_http=debug"
                    .into()
            }),
        )
        .init();

    // Config
    let host = std::env::var("CURATIONS_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("CURATIONS_PORT")
        .unwrap_or_else(|_| "8791".into())
        .parse()?;
    let db_path: PathBuf = std::env::var("CURATIONS_DB_PATH")
        .unwrap_or_else(|_| "curations.db".into())
        .into();
    let forum_enabled = std::env::var("CURATIONS_FORUM_ENABLED")
        .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "off"))
        .unwrap_or(true);

    // Storage
    let store = Arc::new(KvStore::open(&db_path)?);

    // Forum: one fixed logical instance behind a serialized actor
    let registry = ForumRegistry::new(store.clone());
    let forum = forum_enabled.then(|| registry.get_or_spawn(FORUM_INSTANCE));
    if forum.is_none() {
        info!("Forum feature disabled by CURATIONS_FORUM_ENABLED");
    }

    let state = AppState {
        votes: store.namespace("votes"),
        ideas: store.namespace("ideas"),
        forum,
    };

    let app = curations_api::app(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Curations API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
