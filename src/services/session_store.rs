//! Almacén de la sesión
//!
//! El único estado local persistido es el token de credencial: se carga al
//! arrancar para decidir la pantalla inicial, se guarda tras el login y se
//! borra en el sign-out o cuando el backend rechaza la autenticación.
//! En disco es un archivito JSON en la ruta configurada.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::utils::jwt;

/// Formato en disco del token persistido
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
}

/// Token de sesión: copia en memoria más persistencia en archivo
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    token: Arc<RwLock<Option<String>>>,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Cargar el token persistido. Archivo ausente o ilegible significa
    /// "sin sesión", nunca un error.
    pub async fn load(&self) -> Option<String> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(_) => return None,
        };

        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(stored) => {
                *self.token.write().await = Some(stored.token.clone());
                info!("🔑 Sesión restaurada desde {}", self.path.display());
                Some(stored.token)
            }
            Err(e) => {
                warn!("⚠️ Token persistido ilegible, se ignora: {}", e);
                None
            }
        }
    }

    /// Guardar el token tras un login exitoso. Un fallo de escritura no
    /// tumba el login: la sesión sigue en memoria y se loguea el problema.
    pub async fn store(&self, token: &str) {
        *self.token.write().await = Some(token.to_string());

        let stored = StoredSession {
            token: token.to_string(),
        };
        match serde_json::to_string(&stored) {
            Ok(json) => {
                if let Err(e) = tokio::fs::write(&self.path, json).await {
                    warn!("⚠️ No se pudo persistir el token en {}: {}", self.path.display(), e);
                }
            }
            Err(e) => warn!("⚠️ No se pudo serializar el token: {}", e),
        }
    }

    /// Descartar la credencial, en memoria y en disco.
    pub async fn clear(&self) {
        *self.token.write().await = None;

        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("⚠️ No se pudo borrar el token persistido: {}", e);
            }
        }
        info!("🚪 Sesión descartada");
    }

    /// Token actual, si hay sesión.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Nombre a mostrar, decodificado del token con fallback silencioso.
    pub async fn display_name(&self) -> String {
        match self.token().await {
            Some(token) => jwt::display_name_or_default(&token),
            None => jwt::DEFAULT_DISPLAY_NAME.to_string(),
        }
    }
}
