//! HTTP surface of the control plane: backup job registration plus the
//! minimal read/delete endpoints around it.

use crate::errors::BackhaulError;
use crate::registration::{self, RegisterBackupRequest, RegistrationOutcome};
use crate::settings::Settings;
use crate::storage;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use miette::IntoDiagnostic;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: DatabaseConnection,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/api/v1/backup",
            get(list_backups).post(register_backup),
        )
        .route(
            "/api/v1/backup/{id}",
            axum::routing::delete(delete_backup),
        )
        .with_state(state)
}

pub async fn serve(settings: Settings, db: DatabaseConnection) -> miette::Result<()> {
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .into_diagnostic()?;

    let state = AppState {
        settings: Arc::new(settings),
        db,
    };

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.into_diagnostic()?;
    axum::serve(listener, router(state)).await.into_diagnostic()?;
    Ok(())
}

async fn healthz() -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
    }))
}

async fn register_backup(
    State(state): State<AppState>,
    Json(request): Json<RegisterBackupRequest>,
) -> Result<Json<Vec<RegistrationOutcome>>, BackhaulError> {
    let outcomes = registration::register_backup(&state.db, &request).await?;
    Ok(Json(outcomes))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    server: Option<String>,
    status: Option<String>,
}

async fn list_backups(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<storage::JobSummary>>, BackhaulError> {
    let jobs = storage::list_jobs(
        &state.db,
        query.server.as_deref(),
        query.status.as_deref(),
    )
    .await?;
    Ok(Json(jobs))
}

async fn delete_backup(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, BackhaulError> {
    storage::delete_job(&state.db, id).await?;
    Ok(Json(json!({ "deleted": id })))
}
