//! Modelo de TerminalActivity
//!
//! Bitácora append-only de eventos enter/exit por vehículo. Alimenta los
//! snippets de actividad reciente del display de TV y el reporting externo.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Tipo de evento registrado en la bitácora
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityEvent {
    Enter,
    Exit,
}

impl ActivityEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityEvent::Enter => "enter",
            ActivityEvent::Exit => "exit",
        }
    }

    /// Etiqueta legible para los displays
    pub fn display(&self) -> &'static str {
        match self {
            ActivityEvent::Enter => "Entry",
            ActivityEvent::Exit => "Exit",
        }
    }
}

/// TerminalActivity principal - mapea a la tabla terminal_activities
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TerminalActivity {
    pub id: Uuid,
    pub entry_log_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub route_name: String,
    pub event_type: String,
    pub fee_charged: Option<Decimal>,
    pub wallet_balance_snapshot: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
}

/// Fila de actividad con la ruta actual del vehículo unida, para los
/// snippets de historial agrupados por ruta.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityRow {
    pub vehicle_id: Option<Uuid>,
    pub license_plate: Option<String>,
    pub route_id: Option<Uuid>,
    pub route_origin: Option<String>,
    pub route_destination: Option<String>,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
}
