//! Fan-out de actualizaciones de la cola
//!
//! Un canal broadcast con entrega best-effort hacia todos los viewers
//! conectados. Publicar nunca bloquea el camino transaccional: sin
//! suscriptores es un no-op, y un receptor lento que se atrasa pierde
//! payloads intermedios y se recupera con el siguiente (cada payload es el
//! estado completo, no un delta). Dentro de una misma conexión el canal
//! preserva el orden de publicación.

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::dto::queue_dto::{QueueStateResponse, TvStateResponse};

/// Capacidad del canal antes de que receptores atrasados empiecen a perder
/// payloads. Perder está bien: el siguiente payload trae el estado completo.
const BROADCAST_CAPACITY: usize = 64;

/// Payload publicado en cada cambio de estado: ambas vistas, para que cada
/// conexión elija la suya sin recomputar.
#[derive(Debug, Clone)]
pub struct QueueUpdate {
    pub queue: QueueStateResponse,
    pub tv: TvStateResponse,
}

#[derive(Clone)]
pub struct QueueBroadcaster {
    tx: broadcast::Sender<Arc<QueueUpdate>>,
}

impl QueueBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    /// Suscribir una nueva conexión. El receptor solo ve payloads publicados
    /// después de este punto; el estado inicial se envía por separado.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<QueueUpdate>> {
        self.tx.subscribe()
    }

    /// Publicar el estado actual a todos los suscriptores
    pub fn publish(&self, update: QueueUpdate) {
        // Err solo significa cero suscriptores
        let _ = self.tx.send(Arc::new(update));
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for QueueBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::queue_dto::QueueCountsDto;
    use std::collections::BTreeMap;

    fn empty_update(server_time: i64) -> QueueUpdate {
        QueueUpdate {
            queue: QueueStateResponse {
                entries: vec![],
                route_sections: vec![],
                counts: QueueCountsDto::default(),
                countdown_duration: 60,
                refresh_interval: 15,
                departure_duration_minutes: 30,
                server_time,
            },
            tv: TvStateResponse {
                route_sections: vec![],
                counts: QueueCountsDto::default(),
                history: BTreeMap::new(),
                countdown_duration: 60,
                refresh_interval: 15,
                departure_duration_minutes: 30,
                server_time,
            },
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_noop() {
        let broadcaster = QueueBroadcaster::new();
        assert_eq!(broadcaster.receiver_count(), 0);
        broadcaster.publish(empty_update(1));
    }

    #[tokio::test]
    async fn subscriber_receives_updates_in_order() {
        let broadcaster = QueueBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.publish(empty_update(1));
        broadcaster.publish(empty_update(2));

        assert_eq!(rx.recv().await.unwrap().queue.server_time, 1);
        assert_eq!(rx.recv().await.unwrap().queue.server_time, 2);
    }

    #[tokio::test]
    async fn lagged_subscriber_recovers_with_latest_state() {
        let broadcaster = QueueBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        for i in 0..(BROADCAST_CAPACITY as i64 + 8) {
            broadcaster.publish(empty_update(i));
        }

        // El primer recv reporta el atraso; el siguiente entrega un estado
        // completo utilizable
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
        assert!(rx.recv().await.is_ok());
    }
}
