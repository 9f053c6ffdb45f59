//! Modelos del sistema
//!
//! Este módulo contiene todos los tipos que mapean exactamente al JSON
//! del backend: respuestas en snake_case, requests en camelCase.

pub mod auth;
pub mod place;
pub mod profile;
pub mod route;
