//! Routers de la API

pub mod queue_routes;
pub mod scan_routes;
pub mod settings_routes;
pub mod wallet_routes;
pub mod ws_routes;
