//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: el motor de
//! cola, el control de admisión y el fan-out de actualizaciones en vivo.

pub mod admission_service;
pub mod broadcast_service;
pub mod queue_service;

pub use admission_service::*;
pub use broadcast_service::*;
pub use queue_service::*;
