//! Controllers de la aplicación
//!
//! Orquestan requests validados contra los services y arman las responses.

pub mod queue_controller;
pub mod scan_controller;
pub mod settings_controller;
pub mod wallet_controller;
