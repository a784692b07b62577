use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::store::SnapshotStore;
use crate::sync::SyncService;

mod handlers;
mod models;

use handlers::{
    get_projects, get_socials, health, not_found, refresh, regenerate, reset_summary,
    save_projects,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SnapshotStore>,
    pub sync: Arc<SyncService>,
    pub data_dir: PathBuf,
    pub admin_token: Option<String>,
    pub started_at: std::time::SystemTime,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/projects", get(get_projects).post(save_projects))
        .route("/api/refresh", post(refresh))
        .route("/api/regenerate", post(regenerate))
        .route("/api/summary/reset", get(reset_summary))
        .route("/api/socials", get(get_socials))
        .fallback(not_found)
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    state: AppState,
    shutdown: tokio_util::sync::CancellationToken,
) -> anyhow::Result<()> {
    log::info!("🌐 REST service on http://{}", addr);

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            log::info!("🛑 REST shutdown requested");
        })
        .await?;
    log::info!("👋 REST server exited");
    Ok(())
}
