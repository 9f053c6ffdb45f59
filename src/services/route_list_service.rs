//! Servicio del listado de rutas
//!
//! El corazón es `build_sections`: el pipeline puro de búsqueda, filtro de
//! estado, orden y agrupado por día que alimenta la pantalla principal. El
//! servicio envuelve ese pipeline con el fetch del backend y memoiza las
//! secciones: solo se recalculan cuando cambian los datos o los criterios.
//!
//! También vive acá el flujo de creación de ruta: crear, fijar el punto de
//! partida si se dio uno, y avisar al resto de la app.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::client::ShipperApiClient;
use crate::events::{AppEvent, EventBus};
use crate::models::route::{
    CreateRouteRequest, RouteStatus, RouteSummary, SetStartPointRequest,
};
use crate::utils::errors::{validation_error, ClientResult};
use crate::utils::validation::validate_not_empty;

/// Filtro de estado del listado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    fn allows(&self, status: RouteStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status == RouteStatus::Pending,
            StatusFilter::Completed => status == RouteStatus::Completed,
        }
    }
}

/// Orden del listado por fecha de creación
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

/// Criterios vigentes del listado
#[derive(Debug, Clone, Default)]
pub struct RouteListCriteria {
    pub search: String,
    pub status: StatusFilter,
    pub sort: SortOrder,
}

/// Una sección del listado: un día calendario con sus rutas
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSection {
    /// Día formateado `D/M/YYYY`, sin ceros a la izquierda
    pub title: String,
    pub routes: Vec<RouteSummary>,
}

/// Clave de día calendario de un timestamp, en la zona horaria dada.
pub fn day_key<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> String {
    let local = at.with_timezone(tz);
    format!("{}/{}/{}", local.day(), local.month(), local.year())
}

fn matches_search(route: &RouteSummary, needle_lower: &str) -> bool {
    route.route_name.to_lowercase().contains(needle_lower)
        || route
            .start_address
            .as_ref()
            .map_or(false, |addr| addr.to_lowercase().contains(needle_lower))
}

/// Pipeline puro del listado: búsqueda, filtro, una sola pasada de orden y
/// agrupado por día. El orden de las secciones se deriva del orden de las
/// rutas, no se ordena aparte: así el interior de cada sección y la lista de
/// secciones siempre cuentan la misma historia.
pub fn build_sections<Tz: TimeZone>(
    routes: &[RouteSummary],
    criteria: &RouteListCriteria,
    tz: &Tz,
) -> Vec<RouteSection> {
    let mut result: Vec<RouteSummary> = routes.to_vec();

    // 1. Búsqueda: substring case-insensitive sobre nombre O dirección de
    //    partida. Una ruta sin dirección solo puede matchear por nombre.
    if !criteria.search.is_empty() {
        let needle = criteria.search.to_lowercase();
        result.retain(|route| matches_search(route, &needle));
    }

    // 2. Filtro de estado; "all" no filtra nada
    if criteria.status != StatusFilter::All {
        result.retain(|route| criteria.status.allows(route.route_status));
    }

    // 3. Orden por fecha de creación
    result.sort_by(|a, b| match criteria.sort {
        SortOrder::Newest => b.created_at.cmp(&a.created_at),
        SortOrder::Oldest => a.created_at.cmp(&b.created_at),
    });

    // 4. Agrupar por día; la clave repetida se une a su sección existente
    let mut sections: Vec<RouteSection> = Vec::new();
    for route in result {
        let key = day_key(&route.created_at, tz);
        match sections.iter_mut().find(|section| section.title == key) {
            Some(section) => section.routes.push(route),
            None => sections.push(RouteSection {
                title: key,
                routes: vec![route],
            }),
        }
    }

    sections
}

struct ListState {
    routes: Vec<RouteSummary>,
    criteria: RouteListCriteria,
    sections: Vec<RouteSection>,
}

impl ListState {
    fn recompute(&mut self) {
        self.sections = build_sections(&self.routes, &self.criteria, &Local);
    }
}

/// Listado de rutas con criterios y secciones memoizadas
#[derive(Clone)]
pub struct RouteListService {
    client: ShipperApiClient,
    events: EventBus,
    state: Arc<RwLock<ListState>>,
}

impl RouteListService {
    pub fn new(client: ShipperApiClient, events: EventBus) -> Self {
        Self {
            client,
            events,
            state: Arc::new(RwLock::new(ListState {
                routes: Vec::new(),
                criteria: RouteListCriteria::default(),
                sections: Vec::new(),
            })),
        }
    }

    /// Recargar el listado desde el backend y recalcular las secciones.
    pub async fn refresh(&self) -> ClientResult<()> {
        let routes = self.client.list_routes().await?;
        debug!("📦 {} rutas cargadas", routes.len());

        let mut state = self.state.write().await;
        state.routes = routes;
        state.recompute();
        Ok(())
    }

    pub async fn set_search(&self, search: impl Into<String>) {
        let mut state = self.state.write().await;
        state.criteria.search = search.into();
        state.recompute();
    }

    pub async fn set_status_filter(&self, status: StatusFilter) {
        let mut state = self.state.write().await;
        state.criteria.status = status;
        state.recompute();
    }

    pub async fn set_sort_order(&self, sort: SortOrder) {
        let mut state = self.state.write().await;
        state.criteria.sort = sort;
        state.recompute();
    }

    pub async fn criteria(&self) -> RouteListCriteria {
        self.state.read().await.criteria.clone()
    }

    /// Secciones vigentes, ya filtradas, ordenadas y agrupadas.
    pub async fn sections(&self) -> Vec<RouteSection> {
        self.state.read().await.sections.clone()
    }

    /// Flujo de creación: crear la ruta y, si se dio un punto de partida,
    /// fijarlo en un segundo request. Devuelve el id nuevo para que el
    /// caller abra la pantalla de detalle.
    pub async fn create_route(&self, name: &str, start_address: &str) -> ClientResult<i64> {
        if validate_not_empty(name).is_err() {
            return Err(validation_error("Por favor ingresa el nombre de la ruta"));
        }

        let route_id = self
            .client
            .create_route(&CreateRouteRequest {
                route_name: name.to_string(),
            })
            .await?;

        if validate_not_empty(start_address).is_ok() {
            self.client
                .set_start_point(
                    route_id,
                    &SetStartPointRequest {
                        address_text: start_address.to_string(),
                    },
                )
                .await?;
        }

        info!("✅ Ruta {} creada", route_id);
        self.events.emit(AppEvent::RoutesChanged);
        Ok(route_id)
    }
}
