//! Servicio de perfil y estadísticas
//!
//! El perfil se carga y edita con errores a la vista. Las estadísticas son
//! un fetch de fondo no crítico: si falla, se loguea y la pantalla muestra
//! placeholders en vez de romperse.

use tracing::{info, warn};

use crate::client::ShipperApiClient;
use crate::events::{AppEvent, EventBus};
use crate::models::profile::{Profile, StatsSummary, UpdateProfileRequest};
use crate::utils::errors::ClientResult;

#[derive(Clone)]
pub struct ProfileService {
    client: ShipperApiClient,
    events: EventBus,
}

impl ProfileService {
    pub fn new(client: ShipperApiClient, events: EventBus) -> Self {
        Self { client, events }
    }

    pub async fn get_profile(&self) -> ClientResult<Profile> {
        self.client.get_profile().await
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> ClientResult<()> {
        self.client.update_profile(request).await?;
        info!("✅ Perfil actualizado");
        self.events.emit(AppEvent::ProfileChanged);
        Ok(())
    }

    /// Resumen de estadísticas, en modo mejor esfuerzo. Un fallo devuelve
    /// `None`; si fue un 401, el cliente ya emitió la señal global igual.
    pub async fn stats_summary(&self) -> Option<StatsSummary> {
        match self.client.stats_summary().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!("⚠️ No se pudo cargar el resumen de estadísticas: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::environment::EnvironmentConfig;
    use crate::services::session_store::SessionStore;

    fn offline_profile() -> ProfileService {
        let config = EnvironmentConfig {
            api_base_url: "http://127.0.0.1:1".to_string(),
            request_timeout_secs: 1,
            ..EnvironmentConfig::default()
        };
        let events = EventBus::new();
        let session = SessionStore::new(
            std::env::temp_dir().join(format!("shipper_profile_test_{}.json", std::process::id())),
        );
        let client = ShipperApiClient::new(&config, session, events.clone()).unwrap();
        ProfileService::new(client, events)
    }

    #[tokio::test]
    async fn test_stats_failure_degrades_to_none() {
        let service = offline_profile();
        assert!(service.stats_summary().await.is_none());
    }

    #[tokio::test]
    async fn test_profile_failure_is_surfaced() {
        let service = offline_profile();
        assert!(service.get_profile().await.is_err());
    }
}
