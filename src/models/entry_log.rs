//! Modelo de EntryLog
//!
//! Un registro por estadía física en el terminal. Los invariantes duros:
//! `is_active` implica `departed_at IS NULL`, a lo sumo un registro activo
//! por vehículo (índice único parcial en el schema), y `status` es inmutable
//! después de la creación. Las únicas mutaciones permitidas son cerrar el
//! registro (is_active = false + departed_at) y fijar boarding_started_at
//! exactamente una vez.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Estado de un intento de admisión
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Success,
    Failed,
    Insufficient,
    Invalid,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Success => "success",
            EntryStatus::Failed => "failed",
            EntryStatus::Insufficient => "insufficient",
            EntryStatus::Invalid => "invalid",
        }
    }
}

/// EntryLog principal - mapea a la tabla entry_logs
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EntryLog {
    pub id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub fee_charged: Decimal,
    pub wallet_balance_snapshot: Option<Decimal>,
    pub boarding_started_at: Option<DateTime<Utc>>,
    pub status: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub departed_at: Option<DateTime<Utc>>,
}
