//! DTOs de los endpoints de scan QR

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// Request del scan de entrada
#[derive(Debug, Deserialize, Validate)]
pub struct EntryScanRequest {
    #[validate(length(min = 1, max = 100))]
    pub qr_code: String,

    /// Staff que operó el scanner; la autenticación vive en otra superficie
    pub operator_id: Option<Uuid>,

    /// Un segundo scan de un vehículo ya en cola puede confirmar el reset de
    /// su posición en vez de rechazarse como redundante
    #[serde(default)]
    pub confirm_reset: bool,
}

// Request del scan de salida
#[derive(Debug, Deserialize, Validate)]
pub struct ExitScanRequest {
    #[validate(length(min = 1, max = 100))]
    pub qr_code: String,
}

// Response de ambos scans: status serializado como string para el UI
#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
}

impl ScanResponse {
    pub fn success(message: String, balance: Option<Decimal>) -> Self {
        Self {
            status: "success".to_string(),
            message,
            balance,
        }
    }

    pub fn error(message: String, balance: Option<Decimal>) -> Self {
        Self {
            status: "error".to_string(),
            message,
            balance,
        }
    }

    pub fn queued(message: String, balance: Option<Decimal>) -> Self {
        Self {
            status: "queued".to_string(),
            message,
            balance,
        }
    }
}
