//! Modelos de Route y Stop
//!
//! Este módulo contiene los tipos que mapean exactamente al JSON del backend:
//! respuestas en snake_case, requests en camelCase. Los ids son enteros
//! asignados por el servidor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::polyline::LngLat;

/// Estado de la ruta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    Pending,
    Completed,
}

impl RouteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteStatus::Pending => "pending",
            RouteStatus::Completed => "completed",
        }
    }
}

/// Estado de una parada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopStatus {
    Pending,
    Delivered,
    Failed,
}

impl StopStatus {
    /// Ciclo fijo de entrega: pending → delivered → failed → pending.
    /// El siguiente estado se calcula desde el estado actual, no es un toggle.
    pub fn next(&self) -> StopStatus {
        match self {
            StopStatus::Pending => StopStatus::Delivered,
            StopStatus::Delivered => StopStatus::Failed,
            StopStatus::Failed => StopStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StopStatus::Pending => "pending",
            StopStatus::Delivered => "delivered",
            StopStatus::Failed => "failed",
        }
    }
}

/// Una parada dentro de una ruta
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub id: i64,
    pub address_text: String,
    /// Ausente mientras el backend no haya geocodificado la dirección
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Posición en la secuencia optimizada; ausente antes de optimizar
    pub optimized_order: Option<i32>,
    pub stop_status: StopStatus,
}

impl Stop {
    /// Coordenada `[lng, lat]` si la parada ya fue geocodificada.
    pub fn coords(&self) -> Option<LngLat> {
        match (self.lng, self.lat) {
            (Some(lng), Some(lat)) => Some([lng, lat]),
            _ => None,
        }
    }
}

/// Resumen de ruta para el listado (GET /api/routes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub id: i64,
    pub route_name: String,
    pub route_status: RouteStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub start_address: Option<String>,
    #[serde(default)]
    pub total_distance_meters: Option<f64>,
    #[serde(default)]
    pub total_duration_seconds: Option<f64>,
}

/// Ruta completa con paradas (GET /api/routes/{id})
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDetail {
    pub id: i64,
    pub route_name: String,
    pub route_status: RouteStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub start_address: Option<String>,
    #[serde(default)]
    pub start_lat: Option<f64>,
    #[serde(default)]
    pub start_lng: Option<f64>,
    #[serde(default)]
    pub total_distance_meters: Option<f64>,
    #[serde(default)]
    pub total_duration_seconds: Option<f64>,
    /// Polilínea codificada del recorrido; presente tras optimizar
    #[serde(default)]
    pub overview_polyline: Option<String>,
    #[serde(default)]
    pub stops: Vec<Stop>,
}

impl RouteDetail {
    pub fn is_completed(&self) -> bool {
        self.route_status == RouteStatus::Completed
    }

    /// Punto de partida `[lng, lat]` si la ruta ya tiene origen geocodificado.
    pub fn start_coords(&self) -> Option<LngLat> {
        match (self.start_lng, self.start_lat) {
            (Some(lng), Some(lat)) => Some([lng, lat]),
            _ => None,
        }
    }

    /// Coordenadas para encuadrar la cámara: origen más todas las paradas,
    /// saltando las que no tienen coordenadas todavía.
    pub fn camera_coords(&self) -> Vec<LngLat> {
        let mut coords = Vec::with_capacity(self.stops.len() + 1);
        if let Some(start) = self.start_coords() {
            coords.push(start);
        }
        coords.extend(self.stops.iter().filter_map(|stop| stop.coords()));
        coords
    }

    /// Buscar una parada por id en el snapshot actual.
    pub fn find_stop(&self, stop_id: i64) -> Option<&Stop> {
        self.stops.iter().find(|stop| stop.id == stop_id)
    }
}

/// Request para crear una ruta (POST /api/routes)
#[derive(Debug, Serialize, Validate)]
pub struct CreateRouteRequest {
    #[serde(rename = "routeName")]
    #[validate(length(min = 1, max = 200))]
    pub route_name: String,
}

/// Response de creación de ruta
#[derive(Debug, Deserialize)]
pub struct CreateRouteResponse {
    #[serde(rename = "routeId")]
    pub route_id: i64,
}

/// Request para fijar el punto de partida (PUT /api/routes/{id}/start-point)
#[derive(Debug, Serialize, Validate)]
pub struct SetStartPointRequest {
    #[serde(rename = "addressText")]
    #[validate(length(min = 1, max = 500))]
    pub address_text: String,
}

/// Request para agregar una parada (POST /api/routes/{id}/stops)
#[derive(Debug, Serialize, Validate)]
pub struct AddStopRequest {
    #[serde(rename = "addressText")]
    #[validate(length(min = 1, max = 500))]
    pub address_text: String,
}

/// Request para cambiar el estado de una parada (PATCH .../stops/{stopId})
#[derive(Debug, Serialize)]
pub struct UpdateStopStatusRequest {
    pub status: StopStatus,
}

/// Request para cambiar el estado de la ruta (PATCH /api/routes/{id}/status)
#[derive(Debug, Serialize)]
pub struct UpdateRouteStatusRequest {
    pub status: RouteStatus,
}
