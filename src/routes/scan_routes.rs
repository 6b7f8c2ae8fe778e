//! Endpoints de scan QR para entrada y salida

use axum::{extract::State, routing::post, Json, Router};

use crate::controllers::scan_controller::ScanController;
use crate::dto::scan_dto::{EntryScanRequest, ExitScanRequest, ScanResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_scan_router() -> Router<AppState> {
    Router::new()
        .route("/entry", post(entry_scan))
        .route("/exit", post(exit_scan))
}

async fn entry_scan(
    State(state): State<AppState>,
    Json(request): Json<EntryScanRequest>,
) -> Result<Json<ScanResponse>, AppError> {
    let controller = ScanController::new(&state);
    let response = controller.entry_scan(request).await?;
    Ok(Json(response))
}

async fn exit_scan(
    State(state): State<AppState>,
    Json(request): Json<ExitScanRequest>,
) -> Result<Json<ScanResponse>, AppError> {
    let controller = ScanController::new(&state);
    let response = controller.exit_scan(request).await?;
    Ok(Json(response))
}
