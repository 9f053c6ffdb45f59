//! Modelos de perfil y estadísticas
//!
//! El perfil viene en snake_case y el resumen de estadísticas en camelCase;
//! así los expone el backend y así se mapean aquí, sin normalizar.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Perfil del shipper (GET /api/auth/profile)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub vehicle: String,
}

/// Request de actualización de perfil (PUT /api/auth/profile).
/// El email no se puede cambiar desde el cliente.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct UpdateProfileRequest {
    #[serde(rename = "fullName")]
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub full_name: String,
    #[validate(custom = "crate::utils::validation::validate_phone")]
    pub phone: String,
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub vehicle: String,
}

/// Resumen de estadísticas (GET /api/stats/summary)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub days_active: i64,
    pub total_routes: i64,
    pub total_distance_km: f64,
    pub success_deliveries: i64,
    pub rating: f64,
}
