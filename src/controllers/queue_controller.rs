//! Controller de las proyecciones de cola

use uuid::Uuid;

use crate::dto::queue_dto::{QueueDisplaySettingsResponse, QueueStateResponse, TvStateResponse};
use crate::services::queue_service::QueueService;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct QueueController {
    queue: QueueService,
}

impl QueueController {
    pub fn new(state: &AppState) -> Self {
        Self {
            queue: state.queue_service(),
        }
    }

    /// Proyección completa para la página pública y la vista de staff
    pub async fn full_projection(
        &self,
        route_filter: Option<String>,
    ) -> AppResult<QueueStateResponse> {
        self.queue
            .get_queue_projection(parse_route_filter(route_filter))
            .await
    }

    /// Proyección reducida para el display de TV
    pub async fn tv_projection(&self, route_filter: Option<String>) -> AppResult<TvStateResponse> {
        self.queue
            .get_tv_projection(parse_route_filter(route_filter))
            .await
    }

    /// Settings de display para configurar timers del frontend
    pub async fn display_settings(&self) -> QueueDisplaySettingsResponse {
        self.queue.display_settings().await
    }
}

/// "all", vacío o un valor no parseable equivalen a "sin filtro"
fn parse_route_filter(route_filter: Option<String>) -> Option<Uuid> {
    route_filter
        .filter(|value| !value.is_empty() && value != "all")
        .and_then(|value| Uuid::parse_str(&value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_filter_accepts_uuid_and_ignores_the_rest() {
        let id = Uuid::new_v4();
        assert_eq!(parse_route_filter(Some(id.to_string())), Some(id));
        assert_eq!(parse_route_filter(Some("all".to_string())), None);
        assert_eq!(parse_route_filter(Some("".to_string())), None);
        assert_eq!(parse_route_filter(Some("not-a-uuid".to_string())), None);
        assert_eq!(parse_route_filter(None), None);
    }
}
