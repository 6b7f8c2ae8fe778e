//! Modelo de Wallet
//!
//! Saldo prepago uno-a-uno con cada vehículo. Se crea perezosamente la
//! primera vez que un vehículo se referencia; el invariante balance >= 0
//! está respaldado por un CHECK en la tabla.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Wallet principal - mapea a la tabla wallets
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Wallet {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
