//! Repository de system settings
//!
//! Fila única con id = 1. Se materializa una sola vez al arranque; después
//! solo el endpoint de administración la reescribe.

use sqlx::PgPool;

use crate::models::settings::{SystemSettings, SETTINGS_ROW_ID};
use crate::utils::errors::AppError;

pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Leer la fila de configuración, creándola con los defaults si el
    /// deploy es nuevo. Se llama una vez durante el arranque.
    pub async fn get_or_create(&self) -> Result<SystemSettings, AppError> {
        let defaults = SystemSettings::default();

        let settings = sqlx::query_as::<_, SystemSettings>(
            r#"
            INSERT INTO system_settings
                (id, terminal_fee, min_deposit_amount, entry_cooldown_minutes,
                 departure_duration_minutes, countdown_duration_seconds,
                 queue_refresh_interval_seconds, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (id) DO UPDATE SET id = system_settings.id
            RETURNING terminal_fee, min_deposit_amount, entry_cooldown_minutes,
                      departure_duration_minutes, countdown_duration_seconds,
                      queue_refresh_interval_seconds, updated_at
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(defaults.terminal_fee)
        .bind(defaults.min_deposit_amount)
        .bind(defaults.entry_cooldown_minutes)
        .bind(defaults.departure_duration_minutes)
        .bind(defaults.countdown_duration_seconds)
        .bind(defaults.queue_refresh_interval_seconds)
        .fetch_one(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Persistir la configuración completa y devolver la fila actualizada
    pub async fn update(&self, settings: &SystemSettings) -> Result<SystemSettings, AppError> {
        let updated = sqlx::query_as::<_, SystemSettings>(
            r#"
            UPDATE system_settings
            SET terminal_fee = $2,
                min_deposit_amount = $3,
                entry_cooldown_minutes = $4,
                departure_duration_minutes = $5,
                countdown_duration_seconds = $6,
                queue_refresh_interval_seconds = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING terminal_fee, min_deposit_amount, entry_cooldown_minutes,
                      departure_duration_minutes, countdown_duration_seconds,
                      queue_refresh_interval_seconds, updated_at
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(settings.terminal_fee)
        .bind(settings.min_deposit_amount)
        .bind(settings.entry_cooldown_minutes)
        .bind(settings.departure_duration_minutes)
        .bind(settings.countdown_duration_seconds)
        .bind(settings.queue_refresh_interval_seconds)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }
}
