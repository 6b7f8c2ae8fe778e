//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::environment::EnvironmentConfig;
use crate::models::settings::SystemSettings;
use crate::services::admission_service::AdmissionService;
use crate::services::broadcast_service::QueueBroadcaster;
use crate::services::queue_service::QueueService;

/// Configuración viva del terminal.
///
/// Se carga una sola vez al arranque, antes de aceptar requests, y solo el
/// endpoint de administración la reemplaza. Los componentes piden un
/// snapshot clonado y trabajan sobre él; una pasada de clasificación nunca
/// mezcla dos versiones de la configuración.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<RwLock<SystemSettings>>,
}

impl SettingsStore {
    pub fn new(initial: SystemSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Snapshot consistente de la configuración vigente
    pub async fn snapshot(&self) -> SystemSettings {
        self.inner.read().await.clone()
    }

    /// Hot-swap tras una actualización de administración ya persistida
    pub async fn replace(&self, settings: SystemSettings) {
        let mut guard = self.inner.write().await;
        *guard = settings;
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub settings: SettingsStore,
    pub broadcaster: QueueBroadcaster,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig, settings: SettingsStore) -> Self {
        Self {
            pool,
            config,
            settings,
            broadcaster: QueueBroadcaster::new(),
        }
    }

    /// Motor de cola listo para usar en un handler
    pub fn queue_service(&self) -> QueueService {
        QueueService::new(
            self.pool.clone(),
            self.settings.clone(),
            self.broadcaster.clone(),
            self.config.entry_log_purge_minutes,
        )
    }

    /// Control de admisión listo para usar en un handler
    pub fn admission_service(&self) -> AdmissionService {
        AdmissionService::new(self.pool.clone(), self.settings.clone(), self.queue_service())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn settings_store_swaps_snapshots_atomically() {
        let store = SettingsStore::new(SystemSettings::default());
        assert_eq!(store.snapshot().await.terminal_fee, Decimal::new(5000, 2));

        let mut updated = SystemSettings::default();
        updated.terminal_fee = Decimal::new(7500, 2);
        store.replace(updated).await;

        assert_eq!(store.snapshot().await.terminal_fee, Decimal::new(7500, 2));
    }
}
