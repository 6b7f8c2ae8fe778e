mod config;
mod controllers;
mod database;
mod dto;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use config::environment::EnvironmentConfig;
use database::DatabaseConnection;
use middleware::cors::cors_middleware;
use repositories::settings_repository::SettingsRepository;
use state::{AppState, SettingsStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚌 Terminal Queue - Backend de cola de terminal");
    info!("===============================================");

    let config = EnvironmentConfig::default();

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let pool = db_connection.pool().clone();

    // Materializar la configuración del terminal ANTES de armar el router:
    // ningún handler corre sin un SettingsStore poblado
    let initial_settings = SettingsRepository::new(pool.clone()).get_or_create().await?;
    info!(
        "⚙️ Settings loaded (fee ₱{}, min deposit ₱{}, stay {} min)",
        initial_settings.terminal_fee,
        initial_settings.min_deposit_amount,
        initial_settings.departure_duration_minutes
    );
    let settings = SettingsStore::new(initial_settings);

    // Crear router de la API
    let app_state = AppState::new(pool, config.clone(), settings);

    let app = Router::new()
        .route("/health", get(health_endpoint))
        .nest("/api/queue", routes::queue_routes::create_queue_router())
        .nest("/api/scan", routes::scan_routes::create_scan_router())
        .nest("/api/wallet", routes::wallet_routes::create_wallet_router())
        .nest(
            "/api/admin/settings",
            routes::settings_routes::create_settings_router(),
        )
        .nest("/ws", routes::ws_routes::create_ws_router())
        .layer(cors_middleware())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🚏 Endpoints de cola:");
    info!("   GET  /api/queue - Proyección completa (página pública y staff)");
    info!("   GET  /api/queue/tv - Proyección para el display de TV");
    info!("   GET  /api/queue/settings - Settings de display");
    info!("📷 Endpoints de scan:");
    info!("   POST /api/scan/entry - Scan QR de entrada");
    info!("   POST /api/scan/exit - Scan QR de salida");
    info!("💳 Endpoints de wallet:");
    info!("   POST /api/wallet/deposit - Registrar depósito");
    info!("   GET  /api/wallet/balance/:vehicle_id - Consultar saldo");
    info!("⚙️ Endpoints de administración:");
    info!("   GET  /api/admin/settings - Configuración vigente");
    info!("   PUT  /api/admin/settings - Actualizar configuración");
    info!("📡 Canal en vivo:");
    info!("   GET  /ws/queue - WebSocket (?view=tv para el display)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Health check simple
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "service": "terminal-queue",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
