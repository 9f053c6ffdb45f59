//! Sistema de manejo de errores del cliente
//!
//! Este módulo define la taxonomía de errores que ven las pantallas:
//! validación local, sesión expirada, fallos de request y fallos de
//! transporte. Los fetches no críticos (stats, nombre de usuario) no tienen
//! variante propia: se loguean y se degrada la UI.

use thiserror::Error;

use crate::utils::polyline::PolylineError;

/// Mensaje genérico cuando el backend no manda uno específico
pub const GENERIC_REQUEST_ERROR: &str = "No se pudo completar la operación. Intenta de nuevo.";

/// Errores principales del cliente
#[derive(Error, Debug)]
pub enum ClientError {
    /// Campo requerido vacío u otra validación local: nunca llega a la red.
    #[error("Validation error: {0}")]
    Validation(String),

    /// El backend rechazó la autenticación (401). El token almacenado ya fue
    /// descartado y la señal global de sesión expirada ya fue emitida cuando
    /// este error llega al caller.
    #[error("Session expired: authentication was rejected by the backend")]
    AuthExpired,

    /// Respuesta no-2xx distinta de 401. `message` es el `error` que mandó
    /// el backend si lo hubo, o el mensaje genérico.
    #[error("Request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    /// Fallo de red/transporte antes de obtener una respuesta HTTP.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Polyline decode error: {0}")]
    Polyline(#[from] PolylineError),

    #[error("Validation error: {0}")]
    InvalidForm(#[from] validator::ValidationErrors),
}

/// Resultado tipado para operaciones del cliente
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Mensaje para mostrar al usuario, con la preferencia del diseño:
    /// el mensaje específico del backend cuando existe, genérico si no.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::AuthExpired => {
                "Tu sesión ha expirado. Inicia sesión de nuevo.".to_string()
            }
            ClientError::RequestFailed { message, .. } => message.clone(),
            ClientError::Transport(_) => GENERIC_REQUEST_ERROR.to_string(),
            ClientError::Polyline(e) => e.to_string(),
            ClientError::InvalidForm(_) => "Revisa los campos del formulario.".to_string(),
        }
    }

    /// Si el error debe disparar el flujo global de sign-out.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ClientError::AuthExpired)
    }
}

/// Helper para errores de validación local
pub fn validation_error(message: &str) -> ClientError {
    ClientError::Validation(message.to_string())
}
