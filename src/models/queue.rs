//! Tipos derivados para la proyección de la cola
//!
//! `QueueLogRow` es la fila de entry_logs con los datos de display del
//! vehículo ya unidos; es la entrada del clasificador. La clasificación en
//! sí nunca se persiste: se recomputa en cada consulta.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::format;

/// Estado display de un vehículo dentro de la proyección
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QueueStatus {
    Queued,
    Boarding,
    Departed,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Queued => "Queued",
            QueueStatus::Boarding => "Boarding",
            QueueStatus::Departed => "Departed",
        }
    }
}

/// Fila de entry_logs con vehículo, conductor y ruta unidos.
/// Solo registros con status success llegan al clasificador.
#[derive(Debug, Clone, FromRow)]
pub struct QueueLogRow {
    pub id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub license_plate: Option<String>,
    pub route_id: Option<Uuid>,
    pub route_origin: Option<String>,
    pub route_destination: Option<String>,
    pub driver_first_name: Option<String>,
    pub driver_last_name: Option<String>,
    pub boarding_started_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub departed_at: Option<DateTime<Utc>>,
}

impl QueueLogRow {
    pub fn route_display(&self) -> String {
        format::format_route_display(
            self.route_origin.as_deref(),
            self.route_destination.as_deref(),
        )
    }

    pub fn driver_display(&self) -> String {
        format::format_driver_name(
            self.driver_first_name.as_deref(),
            self.driver_last_name.as_deref(),
        )
    }

    pub fn plate_display(&self) -> String {
        self.license_plate
            .clone()
            .unwrap_or_else(|| format::UNKNOWN_PLATE.to_string())
    }
}

/// Fila de entry_logs vencida que el housekeeping debe cerrar
#[derive(Debug, Clone, FromRow)]
pub struct ExpiredLogRow {
    pub id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub route_origin: Option<String>,
    pub route_destination: Option<String>,
    pub wallet_balance: Option<rust_decimal::Decimal>,
}
