//! Control de admisión
//!
//! Decide si un evento físico de entrada o salida procede y ejecuta la
//! mutación de wallet + entry log en una sola transacción. Los rechazos de
//! negocio (ya en cola, cooldown, depósito mínimo, saldo insuficiente) son
//! resultados tipados, nunca errores.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::activity::ActivityEvent;
use crate::models::entry_log::EntryStatus;
use crate::models::settings::SystemSettings;
use crate::models::vehicle::{status_label, VehicleDetails};
use crate::repositories::activity_repository::ActivityRepository;
use crate::repositories::entry_log_repository::EntryLogRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::repositories::wallet_repository::WalletRepository;
use crate::services::queue_service::QueueService;
use crate::state::SettingsStore;
use crate::utils::errors::{AppError, AppResult};

/// Resultado de un intento de entrada
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    Success { balance: Decimal },
    /// El scan fue redundante: el vehículo ya tiene un registro activo
    AlreadyQueued { balance: Decimal },
    /// Scan redundante con confirmación: la posición se movió al final
    QueueReset { balance: Decimal },
    CooldownActive { balance: Decimal },
    BelowMinimumDeposit { balance: Decimal, required: Decimal },
    InsufficientBalance { balance: Decimal },
}

/// Resultado de un intento de salida
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    NotQueued,
}

/// Decisión pura de admisión, evaluada en orden: primera regla que falla
/// gana. El chequeo "ya en cola" ocurre antes, sobre la fila bloqueada.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryDecision {
    CooldownActive,
    BelowMinimumDeposit,
    InsufficientBalance,
    Admit { new_balance: Decimal },
}

pub fn evaluate_entry(
    balance: Decimal,
    last_success_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    settings: &SystemSettings,
) -> EntryDecision {
    let cooldown = Duration::minutes(settings.entry_cooldown_minutes as i64);
    if let Some(last_success) = last_success_at {
        if now - last_success < cooldown {
            return EntryDecision::CooldownActive;
        }
    }

    if balance < settings.min_deposit_amount {
        return EntryDecision::BelowMinimumDeposit;
    }

    if balance < settings.terminal_fee {
        return EntryDecision::InsufficientBalance;
    }

    EntryDecision::Admit {
        new_balance: balance - settings.terminal_fee,
    }
}

pub struct AdmissionService {
    pool: PgPool,
    settings: SettingsStore,
    queue: QueueService,
}

impl AdmissionService {
    pub fn new(pool: PgPool, settings: SettingsStore, queue: QueueService) -> Self {
        Self {
            pool,
            settings,
            queue,
        }
    }

    /// Procesar la entrada de un vehículo al terminal.
    ///
    /// Todo el camino corre en una transacción: el lock FOR UPDATE sobre el
    /// wallet serializa dos scans simultáneos del mismo vehículo, y el
    /// índice único parcial de entry_logs respalda el caso en que ambos
    /// pasaron el chequeo de "ya activo" antes de serializarse.
    pub async fn process_entry(
        &self,
        vehicle: &VehicleDetails,
        staff_id: Option<Uuid>,
        confirm_reset: bool,
    ) -> AppResult<EntryOutcome> {
        let settings = self.settings.snapshot().await;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let active = EntryLogRepository::find_active_for_update(&mut tx, vehicle.id).await?;
        let wallet = WalletRepository::get_or_create_for_update(&mut tx, vehicle.id).await?;

        if let Some(active_log) = active {
            if confirm_reset {
                // Única mutación permitida del created_at de un registro
                // activo: reencolar al final de la fila
                let message = format!(
                    "Queue position reset confirmed. Vehicle '{}' moved to rejoin queue.",
                    vehicle.license_plate
                );
                EntryLogRepository::reset_queue_position(&mut tx, active_log.id, message).await?;
                VehicleRepository::set_status_label(&mut tx, vehicle.id, status_label::QUEUED)
                    .await?;
                tx.commit().await?;

                self.queue.publish_current_state().await;
                return Ok(EntryOutcome::QueueReset {
                    balance: wallet.balance,
                });
            }

            // Scan redundante: se informa, no se crea registro nuevo
            tx.commit().await?;
            return Ok(EntryOutcome::AlreadyQueued {
                balance: wallet.balance,
            });
        }

        let last_success =
            EntryLogRepository::latest_success_for_vehicle(&mut tx, vehicle.id).await?;

        match evaluate_entry(
            wallet.balance,
            last_success.map(|log| log.created_at),
            now,
            &settings,
        ) {
            EntryDecision::CooldownActive => {
                // Sin registro nuevo; el commit solo preserva el wallet lazy
                tx.commit().await?;
                Ok(EntryOutcome::CooldownActive {
                    balance: wallet.balance,
                })
            }

            EntryDecision::BelowMinimumDeposit => {
                tx.commit().await?;
                Ok(EntryOutcome::BelowMinimumDeposit {
                    balance: wallet.balance,
                    required: settings.min_deposit_amount,
                })
            }

            EntryDecision::InsufficientBalance => {
                // El intento fallido sí se loggea, con el saldo sin tocar
                EntryLogRepository::insert(
                    &mut tx,
                    vehicle.id,
                    staff_id,
                    settings.terminal_fee,
                    Some(wallet.balance),
                    EntryStatus::Insufficient,
                    format!("Insufficient balance for '{}'.", vehicle.license_plate),
                    false,
                )
                .await?;
                tx.commit().await?;
                Ok(EntryOutcome::InsufficientBalance {
                    balance: wallet.balance,
                })
            }

            EntryDecision::Admit { new_balance } => {
                let wallet =
                    WalletRepository::adjust_balance(&mut tx, wallet.id, -settings.terminal_fee)
                        .await?;
                debug_assert_eq!(wallet.balance, new_balance);

                let entry_log = match EntryLogRepository::insert(
                    &mut tx,
                    vehicle.id,
                    staff_id,
                    settings.terminal_fee,
                    Some(wallet.balance),
                    EntryStatus::Success,
                    format!("Vehicle '{}' entered terminal.", vehicle.license_plate),
                    true,
                )
                .await
                {
                    Ok(entry_log) => entry_log,
                    Err(e) if is_active_uniqueness_violation(&e) => {
                        // Un scan concurrente ganó la carrera a pesar del
                        // chequeo previo; el índice parcial mantiene el
                        // invariante y este intento se degrada a redundante
                        tx.rollback().await?;
                        tracing::warn!(
                            "Concurrent entry scan detected for vehicle {}",
                            vehicle.license_plate
                        );
                        let balance = WalletRepository::new(self.pool.clone())
                            .balance_for_vehicle(vehicle.id)
                            .await?
                            .unwrap_or(Decimal::ZERO);
                        return Ok(EntryOutcome::AlreadyQueued { balance });
                    }
                    Err(e) => return Err(e),
                };

                ActivityRepository::insert(
                    &mut tx,
                    Some(entry_log.id),
                    Some(vehicle.id),
                    vehicle.driver_id,
                    vehicle.route_display(),
                    ActivityEvent::Enter,
                    Some(settings.terminal_fee),
                    Some(wallet.balance),
                )
                .await?;
                VehicleRepository::set_status_label(&mut tx, vehicle.id, status_label::QUEUED)
                    .await?;
                tx.commit().await?;

                tracing::info!(
                    "🚗 Vehicle {} entered terminal (fee {}, balance {})",
                    vehicle.license_plate,
                    settings.terminal_fee,
                    wallet.balance
                );

                self.queue.publish_current_state().await;
                Ok(EntryOutcome::Success {
                    balance: wallet.balance,
                })
            }
        }
    }

    /// Procesar la salida de un vehículo. Idempotente: una segunda llamada
    /// encuentra el registro ya cerrado y devuelve NotQueued sin duplicar
    /// el evento de bitácora.
    pub async fn process_exit(&self, vehicle: &VehicleDetails) -> AppResult<ExitOutcome> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let Some(active_log) =
            EntryLogRepository::find_active_for_update(&mut tx, vehicle.id).await?
        else {
            tx.rollback().await?;
            return Ok(ExitOutcome::NotQueued);
        };

        let Some(closed) = EntryLogRepository::close(&mut tx, active_log.id, now).await? else {
            // Cerrado por una pasada concurrente entre el SELECT y el UPDATE
            tx.rollback().await?;
            return Ok(ExitOutcome::NotQueued);
        };

        let balance = WalletRepository::get_or_create_for_update(&mut tx, vehicle.id)
            .await?
            .balance;

        ActivityRepository::insert(
            &mut tx,
            Some(closed.id),
            Some(vehicle.id),
            vehicle.driver_id,
            vehicle.route_display(),
            ActivityEvent::Exit,
            None,
            Some(balance),
        )
        .await?;
        VehicleRepository::set_status_label(&mut tx, vehicle.id, status_label::DEPARTED).await?;
        tx.commit().await?;

        tracing::info!("✅ Vehicle {} departed terminal", vehicle.license_plate);

        self.queue.publish_current_state().await;
        Ok(ExitOutcome::Success)
    }
}

/// Detectar la violación del índice único parcial de entry_logs
fn is_active_uniqueness_violation(error: &AppError) -> bool {
    match error {
        AppError::Database(sqlx::Error::Database(db_error)) => {
            db_error.constraint() == Some("entry_logs_one_active_per_vehicle")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn settings() -> SystemSettings {
        // fee 50.00, depósito mínimo 100.00, cooldown 5 min
        SystemSettings::default()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 5, 9, 0, 0).unwrap()
    }

    #[test]
    fn admits_and_charges_the_entry_fee() {
        // Saldo 200: entra y queda en 150, exactamente saldo - fee
        let decision = evaluate_entry(Decimal::new(20000, 2), None, now(), &settings());
        assert_eq!(
            decision,
            EntryDecision::Admit {
                new_balance: Decimal::new(15000, 2)
            }
        );
    }

    #[test]
    fn rejects_balance_below_minimum_deposit() {
        // Saldo 30 < depósito mínimo 100
        let decision = evaluate_entry(Decimal::new(3000, 2), None, now(), &settings());
        assert_eq!(decision, EntryDecision::BelowMinimumDeposit);
    }

    #[test]
    fn rejects_balance_below_fee_once_past_the_minimum() {
        // Depósito mínimo bajado a 20: saldo 40 pasa el mínimo pero no cubre
        // el fee de 50
        let mut settings = settings();
        settings.min_deposit_amount = Decimal::new(2000, 2);

        let decision = evaluate_entry(Decimal::new(4000, 2), None, now(), &settings);
        assert_eq!(decision, EntryDecision::InsufficientBalance);
    }

    #[test]
    fn enforces_cooldown_after_a_recent_successful_entry() {
        let last_success = now() - Duration::minutes(2);
        let decision = evaluate_entry(
            Decimal::new(20000, 2),
            Some(last_success),
            now(),
            &settings(),
        );
        assert_eq!(decision, EntryDecision::CooldownActive);
    }

    #[test]
    fn cooldown_expires_after_the_configured_window() {
        let last_success = now() - Duration::minutes(5);
        let decision = evaluate_entry(
            Decimal::new(20000, 2),
            Some(last_success),
            now(),
            &settings(),
        );
        assert!(matches!(decision, EntryDecision::Admit { .. }));
    }

    #[test]
    fn cooldown_check_runs_before_balance_checks() {
        // En cooldown con saldo insuficiente: gana la primera regla
        let last_success = now() - Duration::minutes(1);
        let decision = evaluate_entry(
            Decimal::new(1000, 2),
            Some(last_success),
            now(),
            &settings(),
        );
        assert_eq!(decision, EntryDecision::CooldownActive);
    }

    #[test]
    fn exact_fee_balance_is_admitted_to_zero() {
        let mut settings = settings();
        settings.min_deposit_amount = Decimal::new(5000, 2);

        let decision = evaluate_entry(Decimal::new(5000, 2), None, now(), &settings);
        assert_eq!(
            decision,
            EntryDecision::Admit {
                new_balance: Decimal::ZERO
            }
        );
    }
}
