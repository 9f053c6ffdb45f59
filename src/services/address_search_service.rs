//! Búsqueda de direcciones con debounce
//!
//! Coordina el autocompletado: espera un periodo de silencio después de la
//! última tecla antes de consultar al backend, ignora queries demasiado
//! cortos y numera cada búsqueda por orden de emisión para que una
//! respuesta vieja que llega tarde nunca pise el estado de un tipeo más
//! nuevo. Los resultados se publican por un canal `watch` al que la
//! pantalla se suscribe.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::ShipperApiClient;
use crate::config::environment::EnvironmentConfig;
use crate::models::place::PlaceSuggestion;
use crate::utils::validation::validate_coordinates;

/// Autocompletado de direcciones, con sesgo opcional por ubicación
#[derive(Clone)]
pub struct AddressSearchService {
    client: ShipperApiClient,
    debounce: Duration,
    min_chars: usize,
    seq: Arc<AtomicU64>,
    /// Secuencia de la búsqueda aplicada más nueva, protegida junto al send
    applied: Arc<Mutex<u64>>,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
    user_location: Arc<Mutex<Option<(f64, f64)>>>,
    results_tx: Arc<watch::Sender<Vec<PlaceSuggestion>>>,
    /// Receiver retenido para que publicar nunca falle sin suscriptores
    _results_rx: watch::Receiver<Vec<PlaceSuggestion>>,
}

impl AddressSearchService {
    pub fn new(client: ShipperApiClient, config: &EnvironmentConfig) -> Self {
        let (results_tx, results_rx) = watch::channel(Vec::new());
        Self {
            client,
            debounce: Duration::from_millis(config.search_debounce_ms),
            min_chars: config.search_min_chars,
            seq: Arc::new(AtomicU64::new(0)),
            applied: Arc::new(Mutex::new(0)),
            pending: Arc::new(Mutex::new(None)),
            user_location: Arc::new(Mutex::new(None)),
            results_tx: Arc::new(results_tx),
            _results_rx: results_rx,
        }
    }

    /// Suscribirse a los resultados publicados.
    pub fn subscribe(&self) -> watch::Receiver<Vec<PlaceSuggestion>> {
        self.results_tx.subscribe()
    }

    /// Fijar la ubicación del usuario para sesgar la búsqueda. Coordenadas
    /// fuera de rango se descartan con un warning.
    pub fn set_user_location(&self, lat: f64, lng: f64) {
        if validate_coordinates(lat, lng).is_err() {
            warn!("⚠️ Ubicación fuera de rango ({}, {}), se ignora", lat, lng);
            return;
        }
        *self.user_location.lock().unwrap() = Some((lat, lng));
    }

    pub fn clear_user_location(&self) {
        *self.user_location.lock().unwrap() = None;
    }

    /// Registrar una tecla. Cancela el timer anterior y arma uno nuevo; la
    /// búsqueda recién sale a la red si el query sigue siendo el más nuevo
    /// cuando termina el periodo de silencio.
    pub fn on_input(&self, query: &str) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;

        let mut pending = self.pending.lock().unwrap();
        if let Some(timer) = pending.take() {
            timer.abort();
        }

        if query.chars().count() < self.min_chars {
            // Query corto: solo silencia lo que hubiera en vuelo.
            return;
        }

        let query = query.to_string();
        let client = self.client.clone();
        let debounce = self.debounce;
        let newest = Arc::clone(&self.seq);
        let applied = Arc::clone(&self.applied);
        let location = *self.user_location.lock().unwrap();
        let results_tx = Arc::clone(&self.results_tx);

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            // Otra tecla pudo llegar mientras dormíamos
            if newest.load(Ordering::SeqCst) != seq {
                return;
            }

            match client.search_addresses(&query, location).await {
                Ok(suggestions) => {
                    let mut applied = applied.lock().unwrap();
                    if seq > *applied {
                        *applied = seq;
                        debug!("🔎 {} sugerencias para \"{}\"", suggestions.len(), query);
                        let _ = results_tx.send(suggestions);
                    } else {
                        debug!("⏭️ Resultado viejo para \"{}\" descartado", query);
                    }
                }
                Err(e) => {
                    // Fallo no crítico: se loguea y los resultados quedan
                    // como estaban. Un 401 ya disparó la señal global.
                    warn!("⚠️ Falló la búsqueda de \"{}\": {}", query, e);
                }
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::services::session_store::SessionStore;

    fn offline_search(debounce_ms: u64) -> AddressSearchService {
        let config = EnvironmentConfig {
            api_base_url: "http://127.0.0.1:1".to_string(),
            request_timeout_secs: 1,
            search_debounce_ms: debounce_ms,
            search_min_chars: 3,
            ..EnvironmentConfig::default()
        };
        let events = EventBus::new();
        let session = SessionStore::new(
            std::env::temp_dir().join(format!("shipper_search_test_{}.json", std::process::id())),
        );
        let client = ShipperApiClient::new(&config, session, events).unwrap();
        AddressSearchService::new(client, &config)
    }

    #[tokio::test]
    async fn test_short_query_never_publishes() {
        let service = offline_search(10);
        let rx = service.subscribe();

        service.on_input("ab");
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(!rx.has_changed().unwrap());
        assert!(rx.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_failed_search_keeps_previous_results() {
        // Puerto cerrado: la búsqueda sale (largo ≥ 3) pero falla; los
        // resultados publicados no cambian.
        let service = offline_search(10);
        let rx = service.subscribe();

        service.on_input("kho long biên");
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_out_of_range_location_is_dropped() {
        let service = offline_search(10);
        service.set_user_location(91.0, 105.8);
        assert!(service.user_location.lock().unwrap().is_none());

        service.set_user_location(21.0285, 105.8522);
        assert_eq!(
            *service.user_location.lock().unwrap(),
            Some((21.0285, 105.8522))
        );
    }
}
