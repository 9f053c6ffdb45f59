//! Services module
//!
//! Este módulo contiene la lógica de la aplicación por encima del cliente
//! HTTP: sesión, listado, detalle, búsqueda y perfil. Cada pantalla habla
//! con su servicio; los servicios hablan entre sí por el bus de eventos.

pub mod address_search_service;
pub mod profile_service;
pub mod route_detail_service;
pub mod route_list_service;
pub mod session_store;

pub use address_search_service::*;
pub use profile_service::*;
pub use route_detail_service::*;
pub use route_list_service::*;
pub use session_store::*;
