//! Controller de la superficie de depósitos
//!
//! Cobertura mínima sobre el ledger: el staff carga efectivo contra el QR
//! del vehículo y consulta saldos. El detalle contable vive en otra
//! superficie.

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::wallet_dto::{DepositRequest, WalletBalanceResponse};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::repositories::wallet_repository::WalletRepository;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub struct WalletController {
    vehicles: VehicleRepository,
    wallets: WalletRepository,
}

impl WalletController {
    pub fn new(state: &AppState) -> Self {
        Self {
            vehicles: VehicleRepository::new(state.pool.clone()),
            wallets: WalletRepository::new(state.pool.clone()),
        }
    }

    pub async fn deposit(
        &self,
        request: DepositRequest,
    ) -> AppResult<ApiResponse<WalletBalanceResponse>> {
        request.validate()?;

        if request.amount <= Decimal::ZERO {
            return Err(AppError::BadRequest(
                "Deposit amount must be greater than zero".to_string(),
            ));
        }

        let Some(vehicle) = self
            .vehicles
            .find_details_by_qr(request.qr_code.trim())
            .await?
        else {
            return Err(AppError::NotFound("Vehicle not found".to_string()));
        };

        let wallet = self.wallets.deposit(vehicle.id, request.amount).await?;

        Ok(ApiResponse::success_with_message(
            WalletBalanceResponse {
                vehicle_id: vehicle.id,
                license_plate: vehicle.license_plate,
                balance: wallet.balance,
            },
            format!("💵 Deposit of ₱{} recorded.", request.amount),
        ))
    }

    pub async fn balance(&self, vehicle_id: Uuid) -> AppResult<WalletBalanceResponse> {
        let Some(vehicle) = self.vehicles.find_details_by_id(vehicle_id).await? else {
            return Err(AppError::NotFound("Vehicle not found".to_string()));
        };

        let wallet = self.wallets.get_or_create(vehicle.id).await?;

        Ok(WalletBalanceResponse {
            vehicle_id: vehicle.id,
            license_plate: vehicle.license_plate,
            balance: wallet.balance,
        })
    }
}
