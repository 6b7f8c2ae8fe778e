//! Repository de wallets
//!
//! El saldo es el único recurso con exclusión mutua estricta por vehículo:
//! toda mutación pasa por la fila bloqueada con FOR UPDATE dentro de la
//! transacción del caller. El CHECK (balance >= 0) del schema respalda el
//! rechazo por fondos insuficientes.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::wallet::Wallet;
use crate::utils::errors::AppError;

pub struct WalletRepository {
    pool: PgPool,
}

impl WalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Obtener el wallet de un vehículo, creándolo con saldo cero la primera
    /// vez que se referencia, y dejarlo bloqueado para la transacción.
    pub async fn get_or_create_for_update(
        conn: &mut PgConnection,
        vehicle_id: Uuid,
    ) -> Result<Wallet, AppError> {
        sqlx::query(
            r#"
            INSERT INTO wallets (id, vehicle_id, balance, created_at, updated_at)
            VALUES ($1, $2, 0.00, NOW(), NOW())
            ON CONFLICT (vehicle_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehicle_id)
        .execute(&mut *conn)
        .await?;

        let wallet = sqlx::query_as::<_, Wallet>(
            "SELECT * FROM wallets WHERE vehicle_id = $1 FOR UPDATE",
        )
        .bind(vehicle_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(wallet)
    }

    /// Versión autocontenida para consultas de saldo fuera de una transacción
    pub async fn get_or_create(&self, vehicle_id: Uuid) -> Result<Wallet, AppError> {
        let mut tx = self.pool.begin().await?;
        let wallet = Self::get_or_create_for_update(&mut tx, vehicle_id).await?;
        tx.commit().await?;
        Ok(wallet)
    }

    /// Ajustar el saldo de una fila ya bloqueada. Delta negativo retira;
    /// el caller ya validó fondos suficientes bajo el mismo lock.
    pub async fn adjust_balance(
        conn: &mut PgConnection,
        wallet_id: Uuid,
        delta: Decimal,
    ) -> Result<Wallet, AppError> {
        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            UPDATE wallets
            SET balance = balance + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(wallet_id)
        .bind(delta)
        .fetch_one(conn)
        .await?;

        Ok(wallet)
    }

    /// Depósito atómico de efectivo sobre el wallet de un vehículo
    pub async fn deposit(&self, vehicle_id: Uuid, amount: Decimal) -> Result<Wallet, AppError> {
        let mut tx = self.pool.begin().await?;
        let wallet = Self::get_or_create_for_update(&mut tx, vehicle_id).await?;
        let wallet = Self::adjust_balance(&mut tx, wallet.id, amount).await?;
        tx.commit().await?;

        log::info!(
            "💰 Deposit of {} applied to wallet {} (vehicle {})",
            amount,
            wallet.id,
            vehicle_id
        );

        Ok(wallet)
    }

    /// Saldo actual sin crear el wallet si no existe
    pub async fn balance_for_vehicle(&self, vehicle_id: Uuid) -> Result<Option<Decimal>, AppError> {
        let balance: Option<(Decimal,)> =
            sqlx::query_as("SELECT balance FROM wallets WHERE vehicle_id = $1")
                .bind(vehicle_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(balance.map(|row| row.0))
    }
}
