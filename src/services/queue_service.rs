//! Motor de cola
//!
//! Deriva la proyección display de la cola a partir de entry_logs y la
//! configuración vigente. Cada consulta corre primero el housekeeping
//! (cierre de boarders vencidos) y después clasifica cada vehículo en
//! Queued / Boarding / Departed por grupo de ruta.
//!
//! La clasificación es una función pura de (filas, settings, now); el único
//! efecto lateral es persistir boarding_started_at la primera vez que un
//! registro resulta Boarding, implementado como un upgrade explícito de
//! lectura para que re-consultar no reinicie el countdown.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::dto::queue_dto::{
    HistoryEventDto, QueueCountsDto, QueueDisplaySettingsResponse, QueueEntryDto,
    QueueStateResponse, RouteSectionDto, TvStateResponse,
};
use crate::models::activity::ActivityEvent;
use crate::models::queue::{QueueLogRow, QueueStatus};
use crate::models::settings::SystemSettings;
use crate::models::vehicle::status_label;
use crate::repositories::activity_repository::ActivityRepository;
use crate::repositories::entry_log_repository::EntryLogRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::broadcast_service::{QueueBroadcaster, QueueUpdate};
use crate::state::SettingsStore;
use crate::utils::errors::AppResult;
use crate::utils::format;

/// Máximo de eventos mostrados por ruta en los snippets de actividad
const HISTORY_LIMIT_PER_ROUTE: usize = 3;

// =============================================================================
// CLASIFICACIÓN (núcleo puro)
// =============================================================================

/// Un registro ya clasificado, con sus anchors de countdown calculados
#[derive(Debug, Clone)]
pub struct ClassifiedEntry {
    pub row: QueueLogRow,
    pub status: QueueStatus,
    /// El registro resultó Boarding y todavía no tiene anchor persistido
    pub needs_boarding_backfill: bool,
    pub boarding_anchor: Option<DateTime<Utc>>,
    pub boarding_expiry: Option<DateTime<Utc>>,
    pub departed_countdown_expiry: Option<DateTime<Utc>>,
}

/// Grupo de ruta con sus registros clasificados en orden de display
#[derive(Debug, Clone)]
pub struct RouteGroup {
    pub route_id: Option<Uuid>,
    pub route_name: String,
    pub entries: Vec<ClassifiedEntry>,
}

/// Resultado completo de una pasada de clasificación
#[derive(Debug, Clone)]
pub struct QueueClassification {
    pub groups: Vec<RouteGroup>,
    pub counts: QueueCountsDto,
    /// Vehículos detectados con más de un registro activo. El display se
    /// mantiene disponible usando el más reciente; el caller loggea.
    pub duplicate_active_vehicles: Vec<Uuid>,
}

/// Clasificar todas las filas visibles, por grupo de ruta, de forma
/// determinista: mismas filas + mismos settings + mismo now producen
/// exactamente la misma salida.
pub fn classify_queue(
    rows: Vec<QueueLogRow>,
    now: DateTime<Utc>,
    settings: &SystemSettings,
) -> QueueClassification {
    let visible_window = Duration::seconds(settings.countdown_duration_seconds as i64);
    let departure_duration = Duration::minutes(settings.departure_duration_minutes as i64);
    let departed_cutoff = now - visible_window;

    // Agrupar por ruta preservando el orden de llegada (las filas ya vienen
    // ordenadas por origen/destino); ruta nula cae al bucket "Unassigned"
    let mut group_index: HashMap<Option<Uuid>, usize> = HashMap::new();
    let mut grouped: Vec<(Option<Uuid>, String, Vec<QueueLogRow>)> = Vec::new();

    for row in rows {
        let key = row.route_id;
        match group_index.get(&key) {
            Some(&idx) => grouped[idx].2.push(row),
            None => {
                group_index.insert(key, grouped.len());
                let name = row.route_display();
                grouped.push((key, name, vec![row]));
            }
        }
    }

    let mut groups = Vec::with_capacity(grouped.len());
    let mut counts = QueueCountsDto::default();
    let mut duplicate_active_vehicles = Vec::new();

    for (route_id, route_name, group_rows) in grouped {
        let mut active: Vec<QueueLogRow> = Vec::new();
        let mut departed: Vec<QueueLogRow> = Vec::new();

        for row in group_rows {
            if row.is_active {
                active.push(row);
            } else if let Some(departed_at) = row.departed_at {
                if departed_at >= departed_cutoff {
                    departed.push(row);
                }
            }
        }

        // Defensa ante violación del invariante "un activo por vehículo":
        // el registro activo más reciente es el canónico, los demás se
        // excluyen de la proyección
        let mut canonical: HashMap<Uuid, (DateTime<Utc>, Uuid)> = HashMap::new();
        for row in &active {
            if let Some(vehicle_id) = row.vehicle_id {
                match canonical.get(&vehicle_id) {
                    Some(&(best_created, _)) if best_created >= row.created_at => {
                        if !duplicate_active_vehicles.contains(&vehicle_id) {
                            duplicate_active_vehicles.push(vehicle_id);
                        }
                    }
                    Some(_) => {
                        if !duplicate_active_vehicles.contains(&vehicle_id) {
                            duplicate_active_vehicles.push(vehicle_id);
                        }
                        canonical.insert(vehicle_id, (row.created_at, row.id));
                    }
                    None => {
                        canonical.insert(vehicle_id, (row.created_at, row.id));
                    }
                }
            }
        }
        active.retain(|row| match row.vehicle_id {
            Some(vehicle_id) => canonical.get(&vehicle_id).map(|&(_, id)| id) == Some(row.id),
            None => true,
        });

        active.sort_by_key(|row| (row.created_at, row.id));
        departed.sort_by_key(|row| (row.departed_at, row.id));

        // Un vehículo recién salido retiene visualmente el slot de boarding
        // hasta que su countdown termina; el siguiente no se promueve antes
        // de que el espacio físico esté libre
        let slot_held = departed
            .last()
            .and_then(|row| row.departed_at)
            .map(|departed_at| departed_at + visible_window > now)
            .unwrap_or(false);

        let boarding_id = if slot_held {
            None
        } else {
            active.first().map(|row| row.id)
        };

        let mut entries = Vec::with_capacity(active.len() + departed.len());

        for row in active {
            if Some(row.id) == boarding_id {
                let anchor = row.boarding_started_at.unwrap_or(now);
                let needs_backfill = row.boarding_started_at.is_none();
                counts.boarding += 1;
                entries.push(ClassifiedEntry {
                    status: QueueStatus::Boarding,
                    needs_boarding_backfill: needs_backfill,
                    boarding_anchor: Some(anchor),
                    boarding_expiry: Some(anchor + departure_duration),
                    departed_countdown_expiry: None,
                    row,
                });
            } else {
                counts.queued += 1;
                entries.push(ClassifiedEntry {
                    status: QueueStatus::Queued,
                    needs_boarding_backfill: false,
                    boarding_anchor: None,
                    boarding_expiry: None,
                    departed_countdown_expiry: None,
                    row,
                });
            }
        }

        for row in departed {
            let countdown_expiry = row
                .departed_at
                .map(|departed_at| departed_at + visible_window)
                .filter(|expiry| *expiry > now);
            counts.departed += 1;
            entries.push(ClassifiedEntry {
                status: QueueStatus::Departed,
                needs_boarding_backfill: false,
                boarding_anchor: None,
                boarding_expiry: None,
                departed_countdown_expiry: countdown_expiry,
                row,
            });
        }

        groups.push(RouteGroup {
            route_id,
            route_name,
            entries,
        });
    }

    QueueClassification {
        groups,
        counts,
        duplicate_active_vehicles,
    }
}

fn entry_dto(entry: &ClassifiedEntry, route_name: &str, departure_minutes: i64) -> QueueEntryDto {
    let row = &entry.row;
    QueueEntryDto {
        id: row.id,
        vehicle_plate: row.plate_display(),
        driver_name: row.driver_display(),
        route: route_name.to_string(),
        route_id: row.route_id,
        status: entry.status.as_str().to_string(),
        entry_time_display: format::format_display_time(row.created_at),
        departure_time_display: format::format_display_time(
            row.created_at + Duration::minutes(departure_minutes),
        ),
        countdown_active: entry.status == QueueStatus::Boarding,
        expiry_timestamp: entry.boarding_expiry.map(|t| t.timestamp()),
        departed_countdown_active: entry.departed_countdown_expiry.is_some(),
        departed_countdown_expiry: entry.departed_countdown_expiry.map(|t| t.timestamp()),
    }
}

// =============================================================================
// QUEUE SERVICE
// =============================================================================

pub struct QueueService {
    pool: PgPool,
    entry_logs: EntryLogRepository,
    activities: ActivityRepository,
    settings: SettingsStore,
    broadcaster: QueueBroadcaster,
    /// Retención opcional: expurgar registros cerrados hace más de N minutos
    purge_after_minutes: Option<i64>,
}

impl QueueService {
    pub fn new(
        pool: PgPool,
        settings: SettingsStore,
        broadcaster: QueueBroadcaster,
        purge_after_minutes: Option<i64>,
    ) -> Self {
        Self {
            entry_logs: EntryLogRepository::new(pool.clone()),
            activities: ActivityRepository::new(pool.clone()),
            pool,
            settings,
            broadcaster,
            purge_after_minutes,
        }
    }

    /// Cerrar todos los boarders cuya ventana venció. Idempotente y seguro
    /// bajo llamadas concurrentes: cada cierre va guardado por el predicado
    /// is_active de su propia transacción. Devuelve cuántos cerró.
    pub async fn run_housekeeping(&self) -> AppResult<usize> {
        let settings = self.settings.snapshot().await;
        let now = Utc::now();
        let cutoff = now - Duration::minutes(settings.departure_duration_minutes as i64);

        let expired = self.entry_logs.fetch_expired(cutoff).await?;
        let mut closed = 0usize;

        for row in expired {
            let mut tx = self.pool.begin().await?;
            match EntryLogRepository::close(&mut tx, row.id, now).await? {
                Some(entry_log) => {
                    let route_name = format::format_route_display(
                        row.route_origin.as_deref(),
                        row.route_destination.as_deref(),
                    );
                    ActivityRepository::insert(
                        &mut tx,
                        Some(entry_log.id),
                        row.vehicle_id,
                        row.driver_id,
                        route_name,
                        ActivityEvent::Exit,
                        None,
                        row.wallet_balance,
                    )
                    .await?;
                    if let Some(vehicle_id) = row.vehicle_id {
                        VehicleRepository::set_status_label(
                            &mut tx,
                            vehicle_id,
                            status_label::DEPARTED,
                        )
                        .await?;
                    }
                    tx.commit().await?;
                    closed += 1;
                }
                None => {
                    // otra pasada concurrente ya lo cerró
                    tx.rollback().await?;
                }
            }
        }

        if closed > 0 {
            tracing::info!("🕒 Auto-departed {} overdue vehicle(s)", closed);
        }

        self.purge_old_records(now).await;

        Ok(closed)
    }

    /// Retención best-effort. Su falla nunca bloquea la proyección.
    async fn purge_old_records(&self, now: DateTime<Utc>) {
        let Some(minutes) = self.purge_after_minutes else {
            return;
        };

        let cutoff = now - Duration::minutes(minutes);
        match self.entry_logs.delete_departed_before(cutoff).await {
            Ok(0) => {}
            Ok(purged) => tracing::debug!("🧹 Purged {} old entry log(s)", purged),
            Err(e) => tracing::warn!("Entry log purge failed (non-blocking): {}", e),
        }
    }

    /// Proyección completa para la página pública y la vista de staff
    pub async fn get_queue_projection(
        &self,
        route_filter: Option<Uuid>,
    ) -> AppResult<QueueStateResponse> {
        let expired = self.run_housekeeping().await?;
        let state = self.build_queue_state(route_filter).await?;
        if expired > 0 {
            self.publish_current_state().await;
        }
        Ok(state)
    }

    /// Proyección para el display de TV: Boarding/Departed por sección, los
    /// Queued colapsados al badge, más los snippets de actividad reciente
    pub async fn get_tv_projection(&self, route_filter: Option<Uuid>) -> AppResult<TvStateResponse> {
        let expired = self.run_housekeeping().await?;
        let full = self.build_queue_state(route_filter).await?;
        let tv = self.derive_tv_state(full, route_filter).await?;
        if expired > 0 {
            self.publish_current_state().await;
        }
        Ok(tv)
    }

    /// Settings de display que el frontend usa para configurar sus timers
    pub async fn display_settings(&self) -> QueueDisplaySettingsResponse {
        let settings = self.settings.snapshot().await;
        QueueDisplaySettingsResponse {
            refresh_interval: settings.queue_refresh_interval_seconds,
            countdown_duration: settings.countdown_duration_seconds,
            departure_duration_minutes: settings.departure_duration_minutes,
        }
    }

    /// Par de vistas para publicar o para el payload inicial de un WebSocket
    pub async fn current_update(&self) -> AppResult<QueueUpdate> {
        let queue = self.build_queue_state(None).await?;
        let tv = self.derive_tv_state(queue.clone(), None).await?;
        Ok(QueueUpdate { queue, tv })
    }

    /// Recomputar y publicar a todos los suscriptores. Nunca propaga error:
    /// un fan-out fallido se loggea y los viewers se recuperan con el poll.
    pub async fn publish_current_state(&self) {
        match self.current_update().await {
            Ok(update) => self.broadcaster.publish(update),
            Err(e) => tracing::warn!("Queue broadcast skipped: {}", e),
        }
    }

    async fn build_queue_state(
        &self,
        route_filter: Option<Uuid>,
    ) -> AppResult<QueueStateResponse> {
        // Un snapshot de settings por pasada; nunca se relee a mitad de una
        // clasificación
        let settings = self.settings.snapshot().await;
        let now = Utc::now();
        let departed_cutoff = now - Duration::seconds(settings.countdown_duration_seconds as i64);

        let rows = self
            .entry_logs
            .fetch_queue_rows(departed_cutoff, route_filter)
            .await?;

        let classification = classify_queue(rows, now, &settings);

        for vehicle_id in &classification.duplicate_active_vehicles {
            tracing::warn!(
                "⚠️ Integrity anomaly: vehicle {} has multiple active entry logs, using the most recent",
                vehicle_id
            );
        }

        self.persist_boarding_starts(&classification).await?;

        let departure_minutes = settings.departure_duration_minutes as i64;
        let mut all_entries = Vec::new();
        let mut route_sections = Vec::new();

        for group in &classification.groups {
            let entries: Vec<QueueEntryDto> = group
                .entries
                .iter()
                .map(|entry| entry_dto(entry, &group.route_name, departure_minutes))
                .collect();

            let queued_count = group
                .entries
                .iter()
                .filter(|entry| entry.status == QueueStatus::Queued)
                .count();

            all_entries.extend(entries.iter().cloned());
            route_sections.push(RouteSectionDto {
                name: group.route_name.clone(),
                route_id: group.route_id,
                entries,
                queued_count,
            });
        }

        Ok(QueueStateResponse {
            entries: all_entries,
            route_sections,
            counts: classification.counts,
            countdown_duration: settings.countdown_duration_seconds,
            refresh_interval: settings.queue_refresh_interval_seconds,
            departure_duration_minutes: settings.departure_duration_minutes,
            server_time: now.timestamp(),
        })
    }

    /// Upgrade explícito de lectura: anclar el countdown de los registros
    /// que acaban de resultar Boarding. El predicado IS NULL del repository
    /// hace que dos proyecciones concurrentes no pisen el anchor.
    async fn persist_boarding_starts(
        &self,
        classification: &QueueClassification,
    ) -> AppResult<()> {
        let pending: Vec<&ClassifiedEntry> = classification
            .groups
            .iter()
            .flat_map(|group| group.entries.iter())
            .filter(|entry| entry.needs_boarding_backfill)
            .collect();

        if pending.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for entry in pending {
            let Some(anchor) = entry.boarding_anchor else {
                continue;
            };
            let updated =
                EntryLogRepository::backfill_boarding_started(&mut tx, entry.row.id, anchor)
                    .await?;
            if updated {
                if let Some(vehicle_id) = entry.row.vehicle_id {
                    VehicleRepository::set_status_label(
                        &mut tx,
                        vehicle_id,
                        status_label::BOARDING,
                    )
                    .await?;
                }
            }
        }
        tx.commit().await?;

        Ok(())
    }

    async fn derive_tv_state(
        &self,
        full: QueueStateResponse,
        route_filter: Option<Uuid>,
    ) -> AppResult<TvStateResponse> {
        let history = self.recent_history(route_filter).await?;

        let route_sections = full
            .route_sections
            .into_iter()
            .map(|section| {
                let visible = section
                    .entries
                    .into_iter()
                    .filter(|entry| entry.status != QueueStatus::Queued.as_str())
                    .collect();
                RouteSectionDto {
                    name: section.name,
                    route_id: section.route_id,
                    entries: visible,
                    queued_count: section.queued_count,
                }
            })
            .collect();

        Ok(TvStateResponse {
            route_sections,
            counts: full.counts,
            history,
            countdown_duration: full.countdown_duration,
            refresh_interval: full.refresh_interval,
            departure_duration_minutes: full.departure_duration_minutes,
            server_time: full.server_time,
        })
    }

    /// Eventos recientes agrupados por ruta, a lo sumo tres por ruta
    async fn recent_history(
        &self,
        route_filter: Option<Uuid>,
    ) -> AppResult<BTreeMap<String, Vec<HistoryEventDto>>> {
        let rows = self.activities.recent_rows(route_filter).await?;

        let mut history: BTreeMap<String, Vec<HistoryEventDto>> = BTreeMap::new();
        for row in rows {
            let route_name = format::format_route_display(
                row.route_origin.as_deref(),
                row.route_destination.as_deref(),
            );
            let events = history.entry(route_name).or_default();
            if events.len() >= HISTORY_LIMIT_PER_ROUTE {
                continue;
            }

            let action = match row.event_type.as_str() {
                "enter" => ActivityEvent::Enter.display(),
                _ => ActivityEvent::Exit.display(),
            };
            events.push(HistoryEventDto {
                vehicle_plate: row
                    .license_plate
                    .unwrap_or_else(|| format::UNKNOWN_PLATE.to_string()),
                action: action.to_string(),
                timestamp: format::format_clock_time(row.timestamp),
            });
        }

        Ok(history)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_settings() -> SystemSettings {
        SystemSettings::default()
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap()
    }

    struct RowBuilder {
        row: QueueLogRow,
    }

    impl RowBuilder {
        fn active(plate: &str, created_at: DateTime<Utc>) -> Self {
            Self {
                row: QueueLogRow {
                    id: Uuid::new_v4(),
                    vehicle_id: Some(Uuid::new_v4()),
                    license_plate: Some(plate.to_string()),
                    route_id: None,
                    route_origin: None,
                    route_destination: None,
                    driver_first_name: None,
                    driver_last_name: None,
                    boarding_started_at: None,
                    created_at,
                    is_active: true,
                    departed_at: None,
                },
            }
        }

        fn departed(plate: &str, created_at: DateTime<Utc>, departed_at: DateTime<Utc>) -> Self {
            let mut builder = Self::active(plate, created_at);
            builder.row.is_active = false;
            builder.row.departed_at = Some(departed_at);
            builder
        }

        fn on_route(mut self, route_id: Uuid, origin: &str, destination: &str) -> Self {
            self.row.route_id = Some(route_id);
            self.row.route_origin = Some(origin.to_string());
            self.row.route_destination = Some(destination.to_string());
            self
        }

        fn with_vehicle(mut self, vehicle_id: Uuid) -> Self {
            self.row.vehicle_id = Some(vehicle_id);
            self
        }

        fn boarding_since(mut self, anchor: DateTime<Utc>) -> Self {
            self.row.boarding_started_at = Some(anchor);
            self
        }

        fn build(self) -> QueueLogRow {
            self.row
        }
    }

    fn statuses(classification: &QueueClassification) -> Vec<(String, &'static str)> {
        classification
            .groups
            .iter()
            .flat_map(|group| group.entries.iter())
            .map(|entry| (entry.row.plate_display(), entry.status.as_str()))
            .collect()
    }

    #[test]
    fn earliest_active_vehicle_boards_and_rest_queue() {
        let now = base_time();
        let route = Uuid::new_v4();
        let rows = vec![
            RowBuilder::active("AAA-111", now - Duration::minutes(10))
                .on_route(route, "Bayan", "Crossing")
                .build(),
            RowBuilder::active("BBB-222", now - Duration::minutes(7))
                .on_route(route, "Bayan", "Crossing")
                .build(),
            RowBuilder::active("CCC-333", now - Duration::minutes(3))
                .on_route(route, "Bayan", "Crossing")
                .build(),
        ];

        let classification = classify_queue(rows, now, &test_settings());

        assert_eq!(
            statuses(&classification),
            vec![
                ("AAA-111".to_string(), "Boarding"),
                ("BBB-222".to_string(), "Queued"),
                ("CCC-333".to_string(), "Queued"),
            ]
        );
        assert_eq!(classification.counts.boarding, 1);
        assert_eq!(classification.counts.queued, 2);
        assert_eq!(classification.counts.departed, 0);
    }

    #[test]
    fn classification_is_deterministic_across_reruns() {
        let now = base_time();
        let route = Uuid::new_v4();
        let rows: Vec<QueueLogRow> = (0..5)
            .map(|i| {
                RowBuilder::active(&format!("VAN-{:03}", i), now - Duration::minutes(20 - i))
                    .on_route(route, "Bayan", "Palengke")
                    .build()
            })
            .collect();

        let first = classify_queue(rows.clone(), now, &test_settings());
        let second = classify_queue(rows, now, &test_settings());

        assert_eq!(statuses(&first), statuses(&second));
    }

    #[test]
    fn recently_departed_vehicle_holds_the_boarding_slot() {
        // El que acaba de salir retiene el slot: el siguiente no se promueve
        // hasta que el countdown de salida termina
        let now = base_time();
        let route = Uuid::new_v4();
        let rows = vec![
            RowBuilder::departed(
                "OUT-001",
                now - Duration::minutes(20),
                now - Duration::seconds(10),
            )
            .on_route(route, "Bayan", "Crossing")
            .build(),
            RowBuilder::active("NXT-002", now - Duration::minutes(5))
                .on_route(route, "Bayan", "Crossing")
                .build(),
        ];

        let classification = classify_queue(rows.clone(), now, &test_settings());

        assert_eq!(
            statuses(&classification),
            vec![
                ("NXT-002".to_string(), "Queued"),
                ("OUT-001".to_string(), "Departed"),
            ]
        );

        // Pasada la ventana de visibilidad, el mismo input clasificado más
        // tarde promueve al que esperaba
        let later = now + Duration::seconds(test_settings().countdown_duration_seconds as i64);
        let classification = classify_queue(rows, later, &test_settings());

        assert_eq!(
            statuses(&classification),
            vec![("NXT-002".to_string(), "Boarding")]
        );
    }

    #[test]
    fn routes_classify_independently() {
        let now = base_time();
        let route_a = Uuid::new_v4();
        let route_b = Uuid::new_v4();
        let rows = vec![
            RowBuilder::active("AAA-111", now - Duration::minutes(10))
                .on_route(route_a, "Bayan", "Crossing")
                .build(),
            RowBuilder::active("BBB-222", now - Duration::minutes(8))
                .on_route(route_b, "Bayan", "Palengke")
                .build(),
            RowBuilder::active("CCC-333", now - Duration::minutes(6))
                .on_route(route_a, "Bayan", "Crossing")
                .build(),
        ];

        let classification = classify_queue(rows, now, &test_settings());

        assert_eq!(classification.groups.len(), 2);
        assert_eq!(classification.counts.boarding, 2);
        assert_eq!(classification.counts.queued, 1);
    }

    #[test]
    fn vehicles_without_route_group_as_unassigned() {
        let now = base_time();
        let rows = vec![
            RowBuilder::active("AAA-111", now - Duration::minutes(4)).build(),
            RowBuilder::active("BBB-222", now - Duration::minutes(2)).build(),
        ];

        let classification = classify_queue(rows, now, &test_settings());

        assert_eq!(classification.groups.len(), 1);
        assert_eq!(classification.groups[0].route_name, "Unassigned");
        assert_eq!(classification.groups[0].route_id, None);
        assert_eq!(classification.counts.boarding, 1);
        assert_eq!(classification.counts.queued, 1);
    }

    #[test]
    fn boarding_anchor_is_requested_only_once() {
        let now = base_time();
        let anchor = now - Duration::minutes(5);
        let route = Uuid::new_v4();

        // Sin anchor persistido: se pide backfill y el expiry corre desde now
        let fresh = classify_queue(
            vec![RowBuilder::active("AAA-111", now - Duration::minutes(6))
                .on_route(route, "Bayan", "Crossing")
                .build()],
            now,
            &test_settings(),
        );
        let entry = &fresh.groups[0].entries[0];
        assert!(entry.needs_boarding_backfill);
        assert_eq!(entry.boarding_anchor, Some(now));
        assert_eq!(
            entry.boarding_expiry,
            Some(now + Duration::minutes(test_settings().departure_duration_minutes as i64))
        );

        // Con anchor persistido: no hay backfill y el countdown no se reinicia
        let anchored = classify_queue(
            vec![RowBuilder::active("AAA-111", now - Duration::minutes(6))
                .on_route(route, "Bayan", "Crossing")
                .boarding_since(anchor)
                .build()],
            now,
            &test_settings(),
        );
        let entry = &anchored.groups[0].entries[0];
        assert!(!entry.needs_boarding_backfill);
        assert_eq!(entry.boarding_anchor, Some(anchor));
        assert_eq!(
            entry.boarding_expiry,
            Some(anchor + Duration::minutes(test_settings().departure_duration_minutes as i64))
        );
    }

    #[test]
    fn departed_countdown_expiry_is_exposed_while_in_the_future() {
        let now = base_time();
        let settings = test_settings();
        let window = Duration::seconds(settings.countdown_duration_seconds as i64);
        let route = Uuid::new_v4();

        let rows = vec![RowBuilder::departed(
            "OUT-001",
            now - Duration::minutes(15),
            now - Duration::seconds(20),
        )
        .on_route(route, "Bayan", "Crossing")
        .build()];

        let classification = classify_queue(rows, now, &settings);
        let entry = &classification.groups[0].entries[0];

        assert_eq!(entry.status, QueueStatus::Departed);
        assert_eq!(
            entry.departed_countdown_expiry,
            Some(now - Duration::seconds(20) + window)
        );
    }

    #[test]
    fn departed_countdown_is_omitted_at_the_window_boundary() {
        let now = base_time();
        let settings = test_settings();
        let window = Duration::seconds(settings.countdown_duration_seconds as i64);
        let route = Uuid::new_v4();

        // departed_at exactamente al borde: sigue visible pero ya no hay
        // countdown que mostrar
        let rows = vec![RowBuilder::departed("OUT-001", now - Duration::minutes(15), now - window)
            .on_route(route, "Bayan", "Crossing")
            .build()];

        let classification = classify_queue(rows, now, &settings);
        let entry = &classification.groups[0].entries[0];

        assert_eq!(entry.status, QueueStatus::Departed);
        assert_eq!(entry.departed_countdown_expiry, None);

        // Y el slot queda libre para el siguiente activo
        let rows = vec![
            RowBuilder::departed("OUT-001", now - Duration::minutes(15), now - window)
                .on_route(route, "Bayan", "Crossing")
                .build(),
            RowBuilder::active("NXT-002", now - Duration::minutes(5))
                .on_route(route, "Bayan", "Crossing")
                .build(),
        ];
        let classification = classify_queue(rows, now, &settings);
        assert!(statuses(&classification)
            .iter()
            .any(|(plate, status)| plate == "NXT-002" && *status == "Boarding"));
    }

    #[test]
    fn duplicate_active_records_keep_only_the_most_recent() {
        let now = base_time();
        let route = Uuid::new_v4();
        let vehicle = Uuid::new_v4();
        let rows = vec![
            RowBuilder::active("DUP-001", now - Duration::minutes(10))
                .on_route(route, "Bayan", "Crossing")
                .with_vehicle(vehicle)
                .build(),
            RowBuilder::active("DUP-001", now - Duration::minutes(2))
                .on_route(route, "Bayan", "Crossing")
                .with_vehicle(vehicle)
                .build(),
        ];

        let classification = classify_queue(rows, now, &test_settings());

        assert_eq!(classification.duplicate_active_vehicles, vec![vehicle]);
        let entries: Vec<_> = classification
            .groups
            .iter()
            .flat_map(|group| group.entries.iter())
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].row.created_at, now - Duration::minutes(2));
    }

    #[test]
    fn empty_input_produces_empty_projection() {
        let classification = classify_queue(vec![], base_time(), &test_settings());
        assert!(classification.groups.is_empty());
        assert_eq!(classification.counts.queued, 0);
        assert_eq!(classification.counts.boarding, 0);
        assert_eq!(classification.counts.departed, 0);
    }
}
