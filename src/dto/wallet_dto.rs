//! DTOs de la superficie de depósitos del staff

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// Request de depósito: el staff escanea el QR del vehículo y carga efectivo
#[derive(Debug, Deserialize, Validate)]
pub struct DepositRequest {
    #[validate(length(min = 1, max = 100))]
    pub qr_code: String,

    pub amount: Decimal,
}

// Response con el saldo resultante
#[derive(Debug, Clone, Serialize)]
pub struct WalletBalanceResponse {
    pub vehicle_id: Uuid,
    pub license_plate: String,
    pub balance: Decimal,
}
