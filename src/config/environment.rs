//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del cliente. Todas las variables
//! tienen defaults razonables para desarrollo local, así el binario arranca
//! sin `.env` contra un backend en localhost.

use std::env;

use crate::utils::polyline::LngLat;

/// Centro por defecto del mapa cuando una ruta no tiene coordenadas (Hanói)
pub const DEFAULT_MAP_CENTER: LngLat = [105.8522, 21.0285];

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// Base del backend, sin slash final
    pub api_base_url: String,
    /// Archivo local donde se persiste el token de sesión
    pub token_file: String,
    pub request_timeout_secs: u64,
    /// Periodo de silencio del debounce de búsqueda
    pub search_debounce_ms: u64,
    /// Largo mínimo del query antes de buscar
    pub search_min_chars: usize,
    pub map_default_lng: f64,
    pub map_default_lat: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            api_base_url: env::var("SHIPPER_API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            token_file: env::var("SHIPPER_TOKEN_FILE")
                .unwrap_or_else(|_| ".shipper_token.json".to_string()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            search_debounce_ms: env::var("SEARCH_DEBOUNCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            search_min_chars: env::var("SEARCH_MIN_CHARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            map_default_lng: env::var("MAP_DEFAULT_LNG")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAP_CENTER[0]),
            map_default_lat: env::var("MAP_DEFAULT_LAT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAP_CENTER[1]),
        }
    }
}

impl EnvironmentConfig {
    /// Centro de mapa configurado, como `[lng, lat]`.
    pub fn default_center(&self) -> LngLat {
        [self.map_default_lng, self.map_default_lat]
    }

    /// URL completa de un path de la API.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }
}
