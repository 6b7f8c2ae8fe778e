//! Helpers de formato para los displays de cola
//!
//! Centraliza cómo se muestran rutas, conductores y timestamps para que
//! todas las vistas (pública, terminal, TV) usen exactamente el mismo texto.

use chrono::{DateTime, Utc};

/// Texto mostrado cuando el vehículo no tiene ruta asignada
pub const UNASSIGNED_ROUTE: &str = "Unassigned";

/// Texto mostrado cuando el vehículo no tiene conductor asignado
pub const UNKNOWN_DRIVER: &str = "N/A";

/// Placeholder para placas de vehículos eliminados
pub const UNKNOWN_PLATE: &str = "—";

/// Formatear el display de una ruta como "Origen → Destino"
pub fn format_route_display(origin: Option<&str>, destination: Option<&str>) -> String {
    match (origin, destination) {
        (Some(origin), Some(destination)) => format!("{} → {}", origin, destination),
        _ => UNASSIGNED_ROUTE.to_string(),
    }
}

/// Formatear el nombre de un conductor como "Nombre Apellido"
pub fn format_driver_name(first_name: Option<&str>, last_name: Option<&str>) -> String {
    match (first_name, last_name) {
        (Some(first), Some(last)) => format!("{} {}", first, last),
        _ => UNKNOWN_DRIVER.to_string(),
    }
}

/// Timestamp legible para las tarjetas de la cola, ej. "Aug 05, 2026 02:31 PM"
pub fn format_display_time(ts: DateTime<Utc>) -> String {
    ts.format("%b %d, %Y %I:%M %p").to_string()
}

/// Hora corta para los snippets de historial, ej. "02:31 PM"
pub fn format_clock_time(ts: DateTime<Utc>) -> String {
    ts.format("%I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn route_display_with_both_endpoints() {
        assert_eq!(
            format_route_display(Some("Bayan"), Some("Crossing")),
            "Bayan → Crossing"
        );
    }

    #[test]
    fn route_display_falls_back_to_unassigned() {
        assert_eq!(format_route_display(None, None), "Unassigned");
        assert_eq!(format_route_display(Some("Bayan"), None), "Unassigned");
    }

    #[test]
    fn driver_name_falls_back_to_na() {
        assert_eq!(format_driver_name(Some("Juan"), Some("Cruz")), "Juan Cruz");
        assert_eq!(format_driver_name(None, Some("Cruz")), "N/A");
    }

    #[test]
    fn display_time_is_human_readable() {
        let ts = Utc.with_ymd_and_hms(2026, 8, 5, 14, 31, 0).unwrap();
        assert_eq!(format_display_time(ts), "Aug 05, 2026 02:31 PM");
        assert_eq!(format_clock_time(ts), "02:31 PM");
    }
}
