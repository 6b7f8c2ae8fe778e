//! Repositories del sistema
//!
//! Acceso a datos sobre PostgreSQL. Las lecturas simples usan el pool; las
//! operaciones que participan en una transacción reciben la conexión de la
//! transacción en curso para que el caller controle el alcance atómico.

pub mod activity_repository;
pub mod entry_log_repository;
pub mod settings_repository;
pub mod vehicle_repository;
pub mod wallet_repository;
