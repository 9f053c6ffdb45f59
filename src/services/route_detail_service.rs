//! Orquestación del detalle de una ruta
//!
//! Una instancia por ruta abierta: carga el detalle y coordina las cinco
//! mutaciones (agregar parada, borrar parada, ciclar estado de parada,
//! completar ruta, optimizar). Tras cada mutación se recarga el detalle
//! completo y se avisa al resto de la app; nunca se aplica un merge local
//! optimista, la pantalla solo cambia cuando llega una recarga exitosa.
//!
//! Las recargas van numeradas por orden de emisión: una respuesta vieja que
//! llega tarde se descarta en vez de pisar una más nueva.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::client::ShipperApiClient;
use crate::events::{AppEvent, EventBus};
use crate::models::route::{AddStopRequest, RouteDetail, RouteStatus};
use crate::utils::errors::{validation_error, ClientResult};
use crate::utils::polyline::{bounds, decode_polyline, LngLat};
use crate::utils::validation::validate_not_empty;

struct DetailState {
    detail: Option<RouteDetail>,
    /// Número de emisión de la recarga aplicada más nueva
    applied_seq: u64,
}

/// Estado y acciones de la pantalla de detalle de una ruta
#[derive(Clone)]
pub struct RouteDetailService {
    client: ShipperApiClient,
    events: EventBus,
    route_id: i64,
    fallback_center: LngLat,
    state: Arc<RwLock<DetailState>>,
    reload_seq: Arc<AtomicU64>,
}

impl RouteDetailService {
    pub fn new(
        client: ShipperApiClient,
        events: EventBus,
        fallback_center: LngLat,
        route_id: i64,
    ) -> Self {
        Self {
            client,
            events,
            route_id,
            fallback_center,
            state: Arc::new(RwLock::new(DetailState {
                detail: None,
                applied_seq: 0,
            })),
            reload_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn route_id(&self) -> i64 {
        self.route_id
    }

    /// Snapshot del detalle. `None` hasta la primera carga exitosa, así la
    /// pantalla muestra "cargando" y no una ruta vacía.
    pub async fn detail(&self) -> Option<RouteDetail> {
        self.state.read().await.detail.clone()
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.detail.is_some()
    }

    /// Recargar el detalle desde el backend. La respuesta se aplica solo si
    /// ninguna recarga emitida después ya fue aplicada.
    pub async fn reload(&self) -> ClientResult<()> {
        let seq = self.reload_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let detail = self.client.get_route(self.route_id).await?;

        let mut state = self.state.write().await;
        if seq > state.applied_seq {
            state.applied_seq = seq;
            state.detail = Some(detail);
        } else {
            debug!(
                "⏭️ Recarga {} de la ruta {} descartada: ya se aplicó la {}",
                seq, self.route_id, state.applied_seq
            );
        }
        Ok(())
    }

    /// Agregar una parada. Una dirección en blanco se rechaza acá mismo,
    /// sin tocar la red.
    pub async fn add_stop(&self, address_text: &str) -> ClientResult<()> {
        if validate_not_empty(address_text).is_err() {
            return Err(validation_error("Por favor ingresa una dirección"));
        }

        let result = self
            .client
            .add_stop(
                self.route_id,
                &AddStopRequest {
                    address_text: address_text.to_string(),
                },
            )
            .await;
        self.after_mutation(result).await
    }

    pub async fn delete_stop(&self, stop_id: i64) -> ClientResult<()> {
        let result = self.client.delete_stop(self.route_id, stop_id).await;
        self.after_mutation(result).await
    }

    /// Ciclar el estado de una parada: pending → delivered → failed →
    /// pending. El estado siguiente se calcula desde el snapshot actual y
    /// se manda explícito; no es un toggle.
    pub async fn cycle_stop_status(&self, stop_id: i64) -> ClientResult<()> {
        let current = {
            let state = self.state.read().await;
            let detail = state
                .detail
                .as_ref()
                .ok_or_else(|| validation_error("La ruta todavía no cargó"))?;
            detail
                .find_stop(stop_id)
                .ok_or_else(|| validation_error("La parada no existe en esta ruta"))?
                .stop_status
        };

        let result = self
            .client
            .update_stop_status(self.route_id, stop_id, current.next())
            .await;
        self.after_mutation(result).await
    }

    /// Marcar la ruta como completada, sin mirar el estado de las paradas.
    pub async fn complete_route(&self) -> ClientResult<()> {
        let result = self
            .client
            .update_route_status(self.route_id, RouteStatus::Completed)
            .await;
        self.after_mutation(result).await
    }

    /// Pedir la optimización; `optimized_order`, la polilínea y los totales
    /// llegan poblados por el backend en la recarga.
    pub async fn optimize(&self) -> ClientResult<()> {
        let result = self.client.optimize_route(self.route_id).await;
        self.after_mutation(result).await
    }

    /// Política común tras cada mutación: recargar el detalle y avisar al
    /// listado y al perfil, haya salido bien o mal el request. El error de
    /// la mutación se devuelve igual para que la pantalla lo muestre.
    async fn after_mutation(&self, result: ClientResult<()>) -> ClientResult<()> {
        if result.as_ref().err().map_or(false, |e| e.is_auth_expired()) {
            // La sesión ya fue descartada; no queda nada que recargar.
            return result;
        }

        if let Err(e) = self.reload().await {
            warn!("⚠️ No se pudo recargar la ruta {}: {}", self.route_id, e);
        }
        self.events.emit(AppEvent::RoutesChanged);
        self.events.emit(AppEvent::ProfileChanged);
        result
    }

    /// Recorrido decodificado de la polilínea de la ruta; vacío mientras
    /// no haya una optimización hecha.
    pub async fn overview_path(&self) -> ClientResult<Vec<LngLat>> {
        let state = self.state.read().await;
        match state
            .detail
            .as_ref()
            .and_then(|detail| detail.overview_polyline.as_deref())
        {
            Some(encoded) => Ok(decode_polyline(encoded)?),
            None => Ok(Vec::new()),
        }
    }

    /// Esquinas para encuadrar la cámara sobre el origen y las paradas con
    /// coordenadas; cae al centro configurado si no hay ninguna.
    pub async fn camera_bounds(&self) -> (LngLat, LngLat) {
        let state = self.state.read().await;
        let coords = state
            .detail
            .as_ref()
            .map(|detail| detail.camera_coords())
            .unwrap_or_default();
        bounds(&coords, self.fallback_center)
    }
}
