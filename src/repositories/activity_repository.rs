//! Repository de la bitácora de actividad
//!
//! Append-only: un evento por admisión y uno por salida. Los displays solo
//! leen una ventana corta de eventos recientes.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::activity::{ActivityEvent, ActivityRow};
use crate::utils::errors::AppError;

/// Ventana de filas consultadas para armar los snippets por ruta
const RECENT_SCAN_WINDOW: i64 = 50;

pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registrar un evento enter/exit dentro de la transacción del caller
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        conn: &mut PgConnection,
        entry_log_id: Option<Uuid>,
        vehicle_id: Option<Uuid>,
        driver_id: Option<Uuid>,
        route_name: String,
        event: ActivityEvent,
        fee_charged: Option<Decimal>,
        wallet_balance_snapshot: Option<Decimal>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO terminal_activities
                (id, entry_log_id, vehicle_id, driver_id, route_name,
                 event_type, fee_charged, wallet_balance_snapshot, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry_log_id)
        .bind(vehicle_id)
        .bind(driver_id)
        .bind(route_name)
        .bind(event.as_str())
        .bind(fee_charged)
        .bind(wallet_balance_snapshot)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Eventos recientes con la ruta actual del vehículo unida, más nuevos
    /// primero. El agrupado por ruta lo hace el servicio.
    pub async fn recent_rows(
        &self,
        route_filter: Option<Uuid>,
    ) -> Result<Vec<ActivityRow>, AppError> {
        let base = r#"
            SELECT ta.vehicle_id, v.license_plate, v.route_id,
                   r.origin AS route_origin, r.destination AS route_destination,
                   ta.event_type, ta.timestamp
            FROM terminal_activities ta
            LEFT JOIN vehicles v ON v.id = ta.vehicle_id
            LEFT JOIN routes r ON r.id = v.route_id
        "#;

        let rows = if let Some(route_id) = route_filter {
            let query = format!(
                "{} WHERE v.route_id = $1 ORDER BY ta.timestamp DESC LIMIT $2",
                base
            );
            sqlx::query_as::<_, ActivityRow>(&query)
                .bind(route_id)
                .bind(RECENT_SCAN_WINDOW)
                .fetch_all(&self.pool)
                .await?
        } else {
            let query = format!("{} ORDER BY ta.timestamp DESC LIMIT $1", base);
            sqlx::query_as::<_, ActivityRow>(&query)
                .bind(RECENT_SCAN_WINDOW)
                .fetch_all(&self.pool)
                .await?
        };

        Ok(rows)
    }
}
