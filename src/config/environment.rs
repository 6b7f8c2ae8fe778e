//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de
//! configuración del proceso. Los parámetros de negocio del terminal no
//! viven acá: esos están en system_settings y se administran en caliente.

use std::env;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Retención opcional de entry logs cerrados, en minutos. Sin valor no
    /// se expurga nada; la proyección no depende de la limpieza.
    pub entry_log_purge_minutes: Option<i64>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            entry_log_purge_minutes: env::var("ENTRY_LOG_PURGE_MINUTES")
                .ok()
                .map(|minutes| {
                    minutes
                        .parse()
                        .expect("ENTRY_LOG_PURGE_MINUTES must be a valid number")
                }),
        }
    }
}
