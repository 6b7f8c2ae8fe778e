//! Endpoints de depósitos y saldos

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::wallet_controller::WalletController;
use crate::dto::common::ApiResponse;
use crate::dto::wallet_dto::{DepositRequest, WalletBalanceResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_wallet_router() -> Router<AppState> {
    Router::new()
        .route("/deposit", post(deposit))
        .route("/balance/:vehicle_id", get(balance))
}

async fn deposit(
    State(state): State<AppState>,
    Json(request): Json<DepositRequest>,
) -> Result<Json<ApiResponse<WalletBalanceResponse>>, AppError> {
    let controller = WalletController::new(&state);
    let response = controller.deposit(request).await?;
    Ok(Json(response))
}

async fn balance(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> Result<Json<WalletBalanceResponse>, AppError> {
    let controller = WalletController::new(&state);
    let response = controller.balance(vehicle_id).await?;
    Ok(Json(response))
}
