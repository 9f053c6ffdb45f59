//! Modelos de autenticación
//!
//! Requests camelCase hacia el backend y response del login. La validación
//! local replica el comportamiento de la pantalla de auth: solo campos
//! requeridos, el resto lo decide el backend.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request de login (POST /api/auth/login)
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub email: String,
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub password: String,
}

/// Response de login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Request de registro (POST /api/auth/register)
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub email: String,
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub password: String,
    #[serde(rename = "fullName")]
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub full_name: String,
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub phone: String,
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub vehicle: String,
}
