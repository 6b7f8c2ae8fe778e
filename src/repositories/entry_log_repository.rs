//! Repository de entry logs
//!
//! La tabla entry_logs es la fuente de verdad de "qué vehículo está dentro
//! del terminal". Las mutaciones van guardadas con predicados sobre
//! is_active / boarding_started_at para que reintentos y pasadas
//! concurrentes de housekeeping sean inocuos.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::entry_log::{EntryLog, EntryStatus};
use crate::models::queue::{ExpiredLogRow, QueueLogRow};
use crate::utils::errors::AppError;

pub struct EntryLogRepository {
    pool: PgPool,
}

impl EntryLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registro activo de un vehículo, bloqueado para la transacción
    pub async fn find_active_for_update(
        conn: &mut PgConnection,
        vehicle_id: Uuid,
    ) -> Result<Option<EntryLog>, AppError> {
        let entry_log = sqlx::query_as::<_, EntryLog>(
            r#"
            SELECT * FROM entry_logs
            WHERE vehicle_id = $1 AND is_active = TRUE
            ORDER BY created_at DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(vehicle_id)
        .fetch_optional(conn)
        .await?;

        Ok(entry_log)
    }

    /// Último intento exitoso del vehículo, activo o no. Ancla el cooldown.
    pub async fn latest_success_for_vehicle(
        conn: &mut PgConnection,
        vehicle_id: Uuid,
    ) -> Result<Option<EntryLog>, AppError> {
        let entry_log = sqlx::query_as::<_, EntryLog>(
            r#"
            SELECT * FROM entry_logs
            WHERE vehicle_id = $1 AND status = 'success'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(vehicle_id)
        .fetch_optional(conn)
        .await?;

        Ok(entry_log)
    }

    /// Insertar un registro de admisión (exitoso o fallido)
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        conn: &mut PgConnection,
        vehicle_id: Uuid,
        staff_id: Option<Uuid>,
        fee_charged: Decimal,
        wallet_balance_snapshot: Option<Decimal>,
        status: EntryStatus,
        message: String,
        is_active: bool,
    ) -> Result<EntryLog, AppError> {
        let entry_log = sqlx::query_as::<_, EntryLog>(
            r#"
            INSERT INTO entry_logs
                (id, vehicle_id, staff_id, fee_charged, wallet_balance_snapshot,
                 status, message, created_at, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehicle_id)
        .bind(staff_id)
        .bind(fee_charged)
        .bind(wallet_balance_snapshot)
        .bind(status.as_str())
        .bind(message)
        .bind(is_active)
        .fetch_one(conn)
        .await?;

        Ok(entry_log)
    }

    /// Reencolar un registro activo: la única mutación permitida sobre su
    /// created_at. Mueve al vehículo al final de la fila y anota el motivo.
    pub async fn reset_queue_position(
        conn: &mut PgConnection,
        entry_log_id: Uuid,
        message: String,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE entry_logs
            SET created_at = NOW(), boarding_started_at = NULL, message = $2
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(entry_log_id)
        .bind(message)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Cerrar un registro activo. El predicado is_active hace la operación
    /// idempotente: un segundo cierre devuelve None en lugar de duplicar.
    pub async fn close(
        conn: &mut PgConnection,
        entry_log_id: Uuid,
        departed_at: DateTime<Utc>,
    ) -> Result<Option<EntryLog>, AppError> {
        let entry_log = sqlx::query_as::<_, EntryLog>(
            r#"
            UPDATE entry_logs
            SET is_active = FALSE, departed_at = $2
            WHERE id = $1 AND is_active = TRUE
            RETURNING *
            "#,
        )
        .bind(entry_log_id)
        .bind(departed_at)
        .fetch_optional(conn)
        .await?;

        Ok(entry_log)
    }

    /// Filas que alimentan el clasificador: registros exitosos activos o
    /// con salida dentro de la ventana de visibilidad.
    pub async fn fetch_queue_rows(
        &self,
        departed_cutoff: DateTime<Utc>,
        route_filter: Option<Uuid>,
    ) -> Result<Vec<QueueLogRow>, AppError> {
        let base = r#"
            SELECT el.id, el.vehicle_id, v.license_plate, v.route_id,
                   r.origin AS route_origin, r.destination AS route_destination,
                   d.first_name AS driver_first_name, d.last_name AS driver_last_name,
                   el.boarding_started_at, el.created_at, el.is_active, el.departed_at
            FROM entry_logs el
            LEFT JOIN vehicles v ON v.id = el.vehicle_id
            LEFT JOIN routes r ON r.id = v.route_id
            LEFT JOIN drivers d ON d.id = v.driver_id
            WHERE el.status = 'success'
              AND (el.is_active = TRUE OR el.departed_at >= $1)
        "#;

        let order = " ORDER BY r.origin ASC NULLS LAST, r.destination ASC NULLS LAST, el.created_at ASC";

        let rows = if let Some(route_id) = route_filter {
            let query = format!("{} AND v.route_id = $2 {}", base, order);
            sqlx::query_as::<_, QueueLogRow>(&query)
                .bind(departed_cutoff)
                .bind(route_id)
                .fetch_all(&self.pool)
                .await?
        } else {
            let query = format!("{} {}", base, order);
            sqlx::query_as::<_, QueueLogRow>(&query)
                .bind(departed_cutoff)
                .fetch_all(&self.pool)
                .await?
        };

        Ok(rows)
    }

    /// Registros activos cuya ventana de boarding ya venció, con los datos
    /// que el housekeeping necesita para el evento de salida.
    pub async fn fetch_expired(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<ExpiredLogRow>, AppError> {
        let rows = sqlx::query_as::<_, ExpiredLogRow>(
            r#"
            SELECT el.id, el.vehicle_id, v.driver_id,
                   r.origin AS route_origin, r.destination AS route_destination,
                   w.balance AS wallet_balance
            FROM entry_logs el
            LEFT JOIN vehicles v ON v.id = el.vehicle_id
            LEFT JOIN routes r ON r.id = v.route_id
            LEFT JOIN wallets w ON w.vehicle_id = v.id
            WHERE el.is_active = TRUE AND el.created_at <= $1
            ORDER BY el.created_at ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Fijar boarding_started_at exactamente una vez. El predicado IS NULL
    /// garantiza que re-consultar la proyección no reinicia el countdown.
    pub async fn backfill_boarding_started(
        conn: &mut PgConnection,
        entry_log_id: Uuid,
        started_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE entry_logs
            SET boarding_started_at = $2
            WHERE id = $1 AND boarding_started_at IS NULL
            "#,
        )
        .bind(entry_log_id)
        .bind(started_at)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Retención best-effort: expurgar registros cerrados hace rato para
    /// acotar el tamaño de la tabla. La proyección no depende de esto.
    pub async fn delete_departed_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM entry_logs WHERE is_active = FALSE AND departed_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
