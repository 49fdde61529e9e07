//! HTTP surface for milestoned.
//!
//! This module wires the milestone API onto an axum router: the three
//! collection operations, static serving of stored uploads, and the server
//! runtime with graceful shutdown.

pub mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::store::files::UPLOAD_ROUTE;
use crate::store::{FileStore, RecordStore};

/// Shared state handed to every request handler.
///
/// The record store sits behind a single async mutex: every read-modify-write
/// of the collection runs to completion before the next one starts, so
/// concurrent creates and deletes cannot lose each other's updates. Uploads
/// are written outside that lock.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The milestone collection, serialized behind one mutex.
    pub records: Arc<Mutex<RecordStore>>,
    /// The upload sink.
    pub files: Arc<FileStore>,
}

impl AppState {
    /// Bundle the stores into shared state.
    #[must_use]
    pub fn new(records: RecordStore, files: FileStore) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            files: Arc::new(files),
        }
    }
}

/// Build the application router.
///
/// Routes:
/// - `GET  /milestones` — full collection
/// - `POST /milestones` — multipart create
/// - `DELETE /milestones/:id` — delete by id
/// - `GET  /uploads/<name>` — stored files, no access control
#[must_use]
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let uploads = ServeDir::new(state.files.root());

    Router::new()
        .route(
            "/milestones",
            get(handlers::list_milestones).post(handlers::create_milestone),
        )
        .route("/milestones/:id", delete(handlers::delete_milestone))
        .nest_service(UPLOAD_ROUTE, uploads)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Open the stores and run the HTTP server until shutdown.
///
/// # Errors
///
/// Returns an error if a store cannot be opened, the bind address is
/// invalid, or the listener fails.
pub async fn serve(config: &Config) -> Result<()> {
    let records = RecordStore::open(config.db_path())?;
    let files = FileStore::open(config.upload_dir())?;

    info!("milestone store at {}", records.path().display());
    info!("uploads stored under {}", files.root().display());

    let state = AppState::new(records, files);
    let app = build_router(state, config.upload.max_body_bytes);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!("milestoned listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolve when the process receives an interrupt.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received; draining connections");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().expect("tempdir");
        let records = RecordStore::open(dir.path().join("milestones_db.json")).expect("records");
        let files = FileStore::open(dir.path().join("uploads")).expect("files");
        (dir, AppState::new(records, files))
    }

    #[test]
    fn test_state_is_cheaply_cloneable() {
        let (_dir, state) = temp_state();
        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.records, &clone.records));
        assert!(Arc::ptr_eq(&state.files, &clone.files));
    }

    #[test]
    fn test_build_router_accepts_state() {
        let (_dir, state) = temp_state();
        let _router = build_router(state, 1024);
    }
}
