//! Endpoints de administración de settings

use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};

use crate::controllers::settings_controller::SettingsController;
use crate::dto::common::ApiResponse;
use crate::dto::settings_dto::UpdateSettingsRequest;
use crate::models::settings::SystemSettings;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_settings_router() -> Router<AppState> {
    Router::new()
        .route("/", get(current_settings))
        .route("/", put(update_settings))
}

async fn current_settings(State(state): State<AppState>) -> Json<SystemSettings> {
    let controller = SettingsController::new(&state);
    Json(controller.current().await)
}

async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<ApiResponse<SystemSettings>>, AppError> {
    let controller = SettingsController::new(&state);
    let response = controller.update(request).await?;
    Ok(Json(response))
}
