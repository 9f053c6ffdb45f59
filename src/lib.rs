//! Núcleo del cliente de rutas de reparto
//!
//! Biblioteca detrás del binario interactivo: cliente HTTP tipado del
//! backend, pipeline puro del listado, orquestación del detalle de ruta,
//! búsqueda con debounce, sesión persistida y bus de eventos. Todo es
//! testeable sin UI y sin backend vivo.

pub mod client;
pub mod config;
pub mod events;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use client::ShipperApiClient;
pub use events::{AppEvent, EventBus};
pub use state::AppState;
pub use utils::errors::{ClientError, ClientResult};
