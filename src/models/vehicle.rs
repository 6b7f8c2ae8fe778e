//! Modelo de Vehicle
//!
//! El campo `status` es solo una etiqueta cacheada para listados; la fuente
//! de verdad de "este vehículo está dentro del terminal" es entry_logs. La
//! etiqueta se reescribe únicamente dentro de las mismas transacciones que
//! mutan entry_logs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Etiquetas cacheadas de estado del vehículo
pub mod status_label {
    pub const IDLE: &str = "idle";
    pub const QUEUED: &str = "queued";
    pub const BOARDING: &str = "boarding";
    pub const DEPARTED: &str = "departed";
}

/// Vehicle principal - mapea a la tabla vehicles
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub license_plate: String,
    pub qr_value: String,
    pub route_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Vehículo con los datos de display ya unidos (ruta y conductor).
/// Es lo que resuelve un scan de QR antes de procesar entrada o salida.
#[derive(Debug, Clone, FromRow)]
pub struct VehicleDetails {
    pub id: Uuid,
    pub license_plate: String,
    pub route_id: Option<Uuid>,
    pub route_origin: Option<String>,
    pub route_destination: Option<String>,
    pub driver_id: Option<Uuid>,
    pub driver_first_name: Option<String>,
    pub driver_last_name: Option<String>,
}

impl VehicleDetails {
    pub fn route_display(&self) -> String {
        crate::utils::format::format_route_display(
            self.route_origin.as_deref(),
            self.route_destination.as_deref(),
        )
    }

    pub fn driver_display(&self) -> String {
        crate::utils::format::format_driver_name(
            self.driver_first_name.as_deref(),
            self.driver_last_name.as_deref(),
        )
    }
}
