//! Endpoints de las proyecciones de cola
//!
//! Estos endpoints son el camino de poll: cualquier viewer puede rearmar su
//! estado completo acá aunque se haya perdido un push del WebSocket.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::controllers::queue_controller::QueueController;
use crate::dto::queue_dto::{QueueDisplaySettingsResponse, QueueStateResponse, TvStateResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    /// Id de ruta, o "all" para el estado completo
    pub route: Option<String>,
}

pub fn create_queue_router() -> Router<AppState> {
    Router::new()
        .route("/", get(queue_projection))
        .route("/tv", get(tv_projection))
        .route("/settings", get(queue_settings))
}

async fn queue_projection(
    State(state): State<AppState>,
    Query(params): Query<QueueQuery>,
) -> Result<Json<QueueStateResponse>, AppError> {
    let controller = QueueController::new(&state);
    let projection = controller.full_projection(params.route).await?;
    Ok(Json(projection))
}

async fn tv_projection(
    State(state): State<AppState>,
    Query(params): Query<QueueQuery>,
) -> Result<Json<TvStateResponse>, AppError> {
    let controller = QueueController::new(&state);
    let projection = controller.tv_projection(params.route).await?;
    Ok(Json(projection))
}

async fn queue_settings(
    State(state): State<AppState>,
) -> Result<Json<QueueDisplaySettingsResponse>, AppError> {
    let controller = QueueController::new(&state);
    Ok(Json(controller.display_settings().await))
}
