//! Repository de vehículos
//!
//! El core solo necesita resolver códigos QR a vehículos y mantener la
//! etiqueta de estado cacheada. El CRUD de registro vive en otra superficie.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::vehicle::VehicleDetails;
use crate::utils::errors::AppError;

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolver un código QR al vehículo con sus datos de display.
    /// Un código desconocido devuelve None; el caller lo trata como
    /// "vehículo no encontrado", nunca como error.
    pub async fn find_details_by_qr(&self, qr_code: &str) -> Result<Option<VehicleDetails>, AppError> {
        let vehicle = sqlx::query_as::<_, VehicleDetails>(
            r#"
            SELECT v.id, v.license_plate, v.route_id,
                   r.origin AS route_origin, r.destination AS route_destination,
                   v.driver_id,
                   d.first_name AS driver_first_name, d.last_name AS driver_last_name
            FROM vehicles v
            LEFT JOIN routes r ON r.id = v.route_id
            LEFT JOIN drivers d ON d.id = v.driver_id
            WHERE LOWER(v.qr_value) = LOWER($1)
            "#,
        )
        .bind(qr_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn find_details_by_id(&self, id: Uuid) -> Result<Option<VehicleDetails>, AppError> {
        let vehicle = sqlx::query_as::<_, VehicleDetails>(
            r#"
            SELECT v.id, v.license_plate, v.route_id,
                   r.origin AS route_origin, r.destination AS route_destination,
                   v.driver_id,
                   d.first_name AS driver_first_name, d.last_name AS driver_last_name
            FROM vehicles v
            LEFT JOIN routes r ON r.id = v.route_id
            LEFT JOIN drivers d ON d.id = v.driver_id
            WHERE v.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    /// Reescribir la etiqueta cacheada de estado. Solo se llama dentro de la
    /// misma transacción que muta entry_logs, nunca de forma independiente.
    pub async fn set_status_label(
        conn: &mut PgConnection,
        vehicle_id: Uuid,
        label: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE vehicles SET status = $2 WHERE id = $1")
            .bind(vehicle_id)
            .bind(label)
            .execute(conn)
            .await?;

        Ok(())
    }
}
