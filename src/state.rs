//! Estado compartido de la aplicación
//!
//! Este módulo arma las piezas comunes que usan todas las pantallas: la
//! configuración, el bus de eventos, el almacén de sesión y el cliente HTTP.
//! El estado es barato de clonar; todo lo mutable vive detrás de Arc.

use crate::client::ShipperApiClient;
use crate::config::environment::EnvironmentConfig;
use crate::events::EventBus;
use crate::services::session_store::SessionStore;
use crate::utils::errors::ClientResult;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub events: EventBus,
    pub session: SessionStore,
    pub client: ShipperApiClient,
}

impl AppState {
    pub fn new(config: EnvironmentConfig) -> ClientResult<Self> {
        let events = EventBus::new();
        let session = SessionStore::new(&config.token_file);
        let client = ShipperApiClient::new(&config, session.clone(), events.clone())?;

        Ok(Self {
            config,
            events,
            session,
            client,
        })
    }

    /// Restaurar la sesión persistida; decide la pantalla inicial.
    pub async fn restore_session(&self) -> bool {
        self.session.load().await.is_some()
    }
}
