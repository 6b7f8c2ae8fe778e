//! Modelo de SystemSettings
//!
//! Fila única (id = 1) con los parámetros ajustables del terminal. Se carga
//! al arranque en el SettingsStore y se reemplaza completa vía el endpoint
//! de administración; los componentes siempre leen un snapshot clonado.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Id fijo de la fila de configuración
pub const SETTINGS_ROW_ID: i32 = 1;

/// Parámetros ajustables del terminal - mapea a la tabla system_settings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SystemSettings {
    pub terminal_fee: Decimal,
    pub min_deposit_amount: Decimal,
    pub entry_cooldown_minutes: i32,
    pub departure_duration_minutes: i32,
    /// Ventana de visibilidad post-salida, en segundos. También alimenta el
    /// countdown que corre el cliente sobre las tarjetas "Departed".
    pub countdown_duration_seconds: i32,
    pub queue_refresh_interval_seconds: i32,
    pub updated_at: DateTime<Utc>,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            terminal_fee: Decimal::new(5000, 2),
            min_deposit_amount: Decimal::new(10000, 2),
            entry_cooldown_minutes: 5,
            departure_duration_minutes: 30,
            countdown_duration_seconds: 60,
            queue_refresh_interval_seconds: 15,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_terminal_policy() {
        let settings = SystemSettings::default();
        assert_eq!(settings.terminal_fee, Decimal::new(5000, 2));
        assert_eq!(settings.min_deposit_amount, Decimal::new(10000, 2));
        assert_eq!(settings.entry_cooldown_minutes, 5);
        assert_eq!(settings.departure_duration_minutes, 30);
        assert_eq!(settings.countdown_duration_seconds, 60);
        assert_eq!(settings.queue_refresh_interval_seconds, 15);
    }
}
