//! DTOs de la proyección de cola
//!
//! Payloads que consumen la página pública, la vista de staff y el display
//! de TV. El mismo payload viaja por polling HTTP y por WebSocket.

use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

// Una tarjeta de la cola: un vehículo clasificado como Queued, Boarding o
// Departed, con los anchors de countdown que el cliente corre localmente
#[derive(Debug, Clone, Serialize)]
pub struct QueueEntryDto {
    pub id: Uuid,
    pub vehicle_plate: String,
    pub driver_name: String,
    pub route: String,
    pub route_id: Option<Uuid>,
    pub status: String,
    pub entry_time_display: String,
    pub departure_time_display: String,
    pub countdown_active: bool,
    /// Epoch segundos en que vence la ventana de boarding
    pub expiry_timestamp: Option<i64>,
    pub departed_countdown_active: bool,
    /// Epoch segundos en que la tarjeta Departed desaparece de la vista
    pub departed_countdown_expiry: Option<i64>,
}

// Conteos globales por estado
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueueCountsDto {
    pub queued: usize,
    pub boarding: usize,
    pub departed: usize,
}

// Sección de una ruta dentro de la proyección completa
#[derive(Debug, Clone, Serialize)]
pub struct RouteSectionDto {
    pub name: String,
    pub route_id: Option<Uuid>,
    pub entries: Vec<QueueEntryDto>,
    pub queued_count: usize,
}

// Proyección completa para la página pública y la vista de staff
#[derive(Debug, Clone, Serialize)]
pub struct QueueStateResponse {
    pub entries: Vec<QueueEntryDto>,
    pub route_sections: Vec<RouteSectionDto>,
    pub counts: QueueCountsDto,
    pub countdown_duration: i32,
    pub refresh_interval: i32,
    pub departure_duration_minutes: i32,
    pub server_time: i64,
}

// Evento reciente para los snippets de actividad del TV
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEventDto {
    pub vehicle_plate: String,
    pub action: String,
    pub timestamp: String,
}

// Proyección reducida para el display de TV: solo Boarding/Departed por
// sección, con los Queued colapsados al badge queued_count
#[derive(Debug, Clone, Serialize)]
pub struct TvStateResponse {
    pub route_sections: Vec<RouteSectionDto>,
    pub counts: QueueCountsDto,
    pub history: BTreeMap<String, Vec<HistoryEventDto>>,
    pub countdown_duration: i32,
    pub refresh_interval: i32,
    pub departure_duration_minutes: i32,
    pub server_time: i64,
}

// Settings de display que consulta el frontend
#[derive(Debug, Clone, Serialize)]
pub struct QueueDisplaySettingsResponse {
    pub refresh_interval: i32,
    pub countdown_duration: i32,
    pub departure_duration_minutes: i32,
}
