//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL con las convenciones estándar.

pub mod activity;
pub mod entry_log;
pub mod queue;
pub mod settings;
pub mod vehicle;
pub mod wallet;
