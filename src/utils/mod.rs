//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación,
//! lectura de JWT y el codec de polilíneas.

pub mod errors;
pub mod jwt;
pub mod polyline;
pub mod validation;
