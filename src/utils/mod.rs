//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, formato de
//! displays y otras funcionalidades comunes.

pub mod errors;
pub mod format;
