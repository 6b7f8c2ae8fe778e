//! Controller de administración de settings
//!
//! El RPC explícito que reemplaza cualquier recarga implícita: persiste la
//! fila única y recién entonces hace el hot-swap del snapshot en memoria.

use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::settings_dto::UpdateSettingsRequest;
use crate::models::settings::SystemSettings;
use crate::repositories::settings_repository::SettingsRepository;
use crate::services::queue_service::QueueService;
use crate::state::{AppState, SettingsStore};
use crate::utils::errors::AppResult;

pub struct SettingsController {
    repository: SettingsRepository,
    store: SettingsStore,
    queue: QueueService,
}

impl SettingsController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: SettingsRepository::new(state.pool.clone()),
            store: state.settings.clone(),
            queue: state.queue_service(),
        }
    }

    pub async fn current(&self) -> SystemSettings {
        self.store.snapshot().await
    }

    /// Update parcial: aplica los campos presentes sobre el snapshot
    /// vigente, persiste y hace el swap. Los displays reciben el nuevo
    /// estado por el broadcast para adoptar intervalos al instante.
    pub async fn update(
        &self,
        request: UpdateSettingsRequest,
    ) -> AppResult<ApiResponse<SystemSettings>> {
        request.validate()?;

        let mut settings = self.store.snapshot().await;
        if let Some(terminal_fee) = request.terminal_fee {
            settings.terminal_fee = terminal_fee;
        }
        if let Some(min_deposit_amount) = request.min_deposit_amount {
            settings.min_deposit_amount = min_deposit_amount;
        }
        if let Some(entry_cooldown_minutes) = request.entry_cooldown_minutes {
            settings.entry_cooldown_minutes = entry_cooldown_minutes;
        }
        if let Some(departure_duration_minutes) = request.departure_duration_minutes {
            settings.departure_duration_minutes = departure_duration_minutes;
        }
        if let Some(countdown_duration_seconds) = request.countdown_duration_seconds {
            settings.countdown_duration_seconds = countdown_duration_seconds;
        }
        if let Some(queue_refresh_interval_seconds) = request.queue_refresh_interval_seconds {
            settings.queue_refresh_interval_seconds = queue_refresh_interval_seconds;
        }

        let persisted = self.repository.update(&settings).await?;
        self.store.replace(persisted.clone()).await;

        tracing::info!(
            "⚙️ System settings updated (fee {}, stay {} min)",
            persisted.terminal_fee,
            persisted.departure_duration_minutes
        );

        self.queue.publish_current_state().await;

        Ok(ApiResponse::success_with_message(
            persisted,
            "Settings updated successfully".to_string(),
        ))
    }
}
