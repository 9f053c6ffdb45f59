//! Bus de eventos de la aplicación
//!
//! Canal broadcast tipado para invalidación de datos entre pantallas: quien
//! muta una ruta avisa, quien muestra el listado o el perfil se suscribe y
//! refresca. El emisor no sabe ni le importa quién escucha.

use tokio::sync::broadcast;

/// Capacidad del canal; los eventos son señales sin payload, no datos
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Señales globales de la aplicación
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Los datos de rutas cambiaron; el listado debe refrescar
    RoutesChanged,
    /// El perfil o las estadísticas deben refrescar
    ProfileChanged,
    /// El backend rechazó la autenticación; descartar sesión y volver al login
    SessionExpired,
}

/// Bus de eventos de la app
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Emitir una señal. Sin suscriptores el envío se descarta sin error.
    pub fn emit(&self, event: AppEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(AppEvent::RoutesChanged);
        assert_eq!(rx.recv().await.unwrap(), AppEvent::RoutesChanged);
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_noop() {
        let bus = EventBus::new();
        bus.emit(AppEvent::ProfileChanged);
    }

    #[tokio::test]
    async fn test_all_subscribers_receive_broadcast() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(AppEvent::SessionExpired);
        assert_eq!(rx1.recv().await.unwrap(), AppEvent::SessionExpired);
        assert_eq!(rx2.recv().await.unwrap(), AppEvent::SessionExpired);
    }
}
