//! Controller de los scans de QR
//!
//! Traduce los resultados tipados del control de admisión a los mensajes
//! que ve el staff en el scanner. Un QR vacío o desconocido es un resultado
//! informativo, nunca un error de servidor.

use validator::Validate;

use crate::dto::scan_dto::{EntryScanRequest, ExitScanRequest, ScanResponse};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::admission_service::{AdmissionService, EntryOutcome, ExitOutcome};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct ScanController {
    vehicles: VehicleRepository,
    admission: AdmissionService,
}

impl ScanController {
    pub fn new(state: &AppState) -> Self {
        Self {
            vehicles: VehicleRepository::new(state.pool.clone()),
            admission: state.admission_service(),
        }
    }

    /// Scan de entrada: valida el código, resuelve el vehículo y ejecuta la
    /// admisión. Cada rechazo llega al scanner con su mensaje específico.
    pub async fn entry_scan(&self, request: EntryScanRequest) -> AppResult<ScanResponse> {
        request.validate()?;

        let qr_code = request.qr_code.trim();
        if qr_code.is_empty() {
            return Ok(ScanResponse::error("QR code is empty.".to_string(), None));
        }

        let Some(vehicle) = self.vehicles.find_details_by_qr(qr_code).await? else {
            return Ok(ScanResponse::error("❌ Invalid QR code.".to_string(), None));
        };

        let outcome = self
            .admission
            .process_entry(&vehicle, request.operator_id, request.confirm_reset)
            .await?;

        let response = match outcome {
            EntryOutcome::Success { balance } => ScanResponse::success(
                format!("🚗 {} entered terminal.", vehicle.license_plate),
                Some(balance),
            ),
            EntryOutcome::QueueReset { balance } => ScanResponse::success(
                "🔁 Queue reset confirmed. Please proceed back to the line.".to_string(),
                Some(balance),
            ),
            EntryOutcome::AlreadyQueued { balance } => ScanResponse::queued(
                "⚠️ You're already queued. Scan again to reset your position if you missed \
                 your turn or stepped out briefly."
                    .to_string(),
                Some(balance),
            ),
            EntryOutcome::CooldownActive { balance } => ScanResponse::error(
                "⏳ Please wait before re-entry.".to_string(),
                Some(balance),
            ),
            EntryOutcome::BelowMinimumDeposit { balance, required } => ScanResponse::error(
                format!("⚠️ Minimum ₱{} required before entry.", required),
                Some(balance),
            ),
            EntryOutcome::InsufficientBalance { balance } => ScanResponse::error(
                format!("❌ Insufficient balance for {}.", vehicle.license_plate),
                Some(balance),
            ),
        };

        Ok(response)
    }

    /// Scan de salida: solo valida que el vehículo esté adentro y cierra su
    /// estadía. Repetir el scan devuelve "not inside terminal".
    pub async fn exit_scan(&self, request: ExitScanRequest) -> AppResult<ScanResponse> {
        request.validate()?;

        let qr_code = request.qr_code.trim();
        if qr_code.is_empty() {
            return Ok(ScanResponse::error("QR missing.".to_string(), None));
        }

        let Some(vehicle) = self.vehicles.find_details_by_qr(qr_code).await? else {
            return Ok(ScanResponse::error("❌ No vehicle found.".to_string(), None));
        };

        let response = match self.admission.process_exit(&vehicle).await? {
            ExitOutcome::Success => {
                ScanResponse::success(format!("✅ {} departed.", vehicle.license_plate), None)
            }
            ExitOutcome::NotQueued => ScanResponse::error(
                format!("⚠️ {} not inside terminal.", vehicle.license_plate),
                None,
            ),
        };

        Ok(response)
    }
}
