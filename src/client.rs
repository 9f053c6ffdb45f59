//! Cliente HTTP del backend de rutas
//!
//! Este módulo contiene el cliente tipado que cubre todos los endpoints del
//! backend. Cada request autenticado toma el token del almacén de sesión en
//! el momento del envío; un 401 en cualquier endpoint descarta la sesión,
//! emite la señal global de expiración y recién entonces devuelve el error.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, info, warn};
use validator::Validate;

use crate::config::EnvironmentConfig;
use crate::events::{AppEvent, EventBus};
use crate::models::auth::{LoginRequest, LoginResponse, RegisterRequest};
use crate::models::place::PlaceSuggestion;
use crate::models::profile::{Profile, StatsSummary, UpdateProfileRequest};
use crate::models::route::{
    AddStopRequest, CreateRouteRequest, CreateRouteResponse, RouteDetail, RouteStatus,
    RouteSummary, SetStartPointRequest, StopStatus, UpdateRouteStatusRequest,
    UpdateStopStatusRequest,
};
use crate::services::session_store::SessionStore;
use crate::utils::errors::{ClientError, ClientResult, GENERIC_REQUEST_ERROR};

/// Cuerpo de error del backend: `{"error": "..."}`
#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    error: Option<String>,
}

/// Cliente tipado del backend de rutas
#[derive(Clone)]
pub struct ShipperApiClient {
    client: Client,
    base_url: String,
    session: SessionStore,
    events: EventBus,
}

impl ShipperApiClient {
    pub fn new(
        config: &EnvironmentConfig,
        session: SessionStore,
        events: EventBus,
    ) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
            events,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Adjuntar el bearer token actual, si hay sesión.
    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Chequeo centralizado de status. Acá vive la regla global de sesión:
    /// cualquier 401 descarta el token y emite `SessionExpired` antes de
    /// devolver el error al caller.
    async fn check(&self, response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            warn!("🔒 Autenticación rechazada por el backend, se descarta la sesión");
            self.session.clear().await;
            self.events.emit(AppEvent::SessionExpired);
            return Err(ClientError::AuthExpired);
        }

        let message = response
            .json::<BackendErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| GENERIC_REQUEST_ERROR.to_string());

        error!("❌ Request falló con status {}: {}", status, message);
        Err(ClientError::RequestFailed {
            status: status.as_u16(),
            message,
        })
    }

    // ==================== AUTH ====================

    /// Login. Guarda el token en el almacén de sesión antes de devolverlo.
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<String> {
        request.validate()?;
        info!("🔐 Login de {}", request.email);

        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(request)
            .send()
            .await?;
        let response = self.check(response).await?;

        let body: LoginResponse = response.json().await?;
        self.session.store(&body.token).await;
        info!("✅ Sesión iniciada");
        Ok(body.token)
    }

    /// Registro. No inicia sesión: el flujo vuelve a la pantalla de login.
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<()> {
        request.validate()?;
        info!("📝 Registro de {}", request.email);

        let response = self
            .client
            .post(self.url("/api/auth/register"))
            .json(request)
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    // ==================== PERFIL Y ESTADÍSTICAS ====================

    pub async fn get_profile(&self) -> ClientResult<Profile> {
        debug!("👤 Cargando perfil");
        let request = self.authorized(self.client.get(self.url("/api/auth/profile"))).await;
        let response = self.check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> ClientResult<()> {
        request.validate()?;
        info!("✏️ Actualizando perfil");

        let request = self
            .authorized(self.client.put(self.url("/api/auth/profile")).json(request))
            .await;
        self.check(request.send().await?).await?;
        Ok(())
    }

    pub async fn stats_summary(&self) -> ClientResult<StatsSummary> {
        debug!("📊 Cargando resumen de estadísticas");
        let request = self.authorized(self.client.get(self.url("/api/stats/summary"))).await;
        let response = self.check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    // ==================== RUTAS ====================

    pub async fn list_routes(&self) -> ClientResult<Vec<RouteSummary>> {
        debug!("📋 Listando rutas");
        let request = self.authorized(self.client.get(self.url("/api/routes"))).await;
        let response = self.check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn get_route(&self, route_id: i64) -> ClientResult<RouteDetail> {
        debug!("🔍 Cargando ruta {}", route_id);
        let request = self
            .authorized(self.client.get(self.url(&format!("/api/routes/{}", route_id))))
            .await;
        let response = self.check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn create_route(&self, request: &CreateRouteRequest) -> ClientResult<i64> {
        request.validate()?;
        info!("🆕 Creando ruta \"{}\"", request.route_name);

        let request = self
            .authorized(self.client.post(self.url("/api/routes")).json(request))
            .await;
        let response = self.check(request.send().await?).await?;

        let body: CreateRouteResponse = response.json().await?;
        Ok(body.route_id)
    }

    pub async fn set_start_point(
        &self,
        route_id: i64,
        request: &SetStartPointRequest,
    ) -> ClientResult<()> {
        request.validate()?;
        info!("📍 Fijando punto de partida de la ruta {}", route_id);

        let request = self
            .authorized(
                self.client
                    .put(self.url(&format!("/api/routes/{}/start-point", route_id)))
                    .json(request),
            )
            .await;
        self.check(request.send().await?).await?;
        Ok(())
    }

    pub async fn add_stop(&self, route_id: i64, request: &AddStopRequest) -> ClientResult<()> {
        request.validate()?;
        info!("➕ Agregando parada a la ruta {}", route_id);

        let request = self
            .authorized(
                self.client
                    .post(self.url(&format!("/api/routes/{}/stops", route_id)))
                    .json(request),
            )
            .await;
        self.check(request.send().await?).await?;
        Ok(())
    }

    pub async fn delete_stop(&self, route_id: i64, stop_id: i64) -> ClientResult<()> {
        info!("🗑️ Borrando parada {} de la ruta {}", stop_id, route_id);

        let request = self
            .authorized(
                self.client
                    .delete(self.url(&format!("/api/routes/{}/stops/{}", route_id, stop_id))),
            )
            .await;
        self.check(request.send().await?).await?;
        Ok(())
    }

    pub async fn update_stop_status(
        &self,
        route_id: i64,
        stop_id: i64,
        status: StopStatus,
    ) -> ClientResult<()> {
        info!(
            "🔄 Parada {} de la ruta {} pasa a {}",
            stop_id,
            route_id,
            status.as_str()
        );

        let body = UpdateStopStatusRequest { status };
        let request = self
            .authorized(
                self.client
                    .patch(self.url(&format!("/api/routes/{}/stops/{}", route_id, stop_id)))
                    .json(&body),
            )
            .await;
        self.check(request.send().await?).await?;
        Ok(())
    }

    pub async fn update_route_status(
        &self,
        route_id: i64,
        status: RouteStatus,
    ) -> ClientResult<()> {
        info!("🏁 Ruta {} pasa a {}", route_id, status.as_str());

        let body = UpdateRouteStatusRequest { status };
        let request = self
            .authorized(
                self.client
                    .patch(self.url(&format!("/api/routes/{}/status", route_id)))
                    .json(&body),
            )
            .await;
        self.check(request.send().await?).await?;
        Ok(())
    }

    /// Pedir la optimización al backend. Sin cuerpo; los resultados llegan
    /// en la próxima recarga de la ruta.
    pub async fn optimize_route(&self, route_id: i64) -> ClientResult<()> {
        info!("🚀 Optimizando ruta {}", route_id);

        let request = self
            .authorized(
                self.client
                    .post(self.url(&format!("/api/routes/{}/optimize", route_id))),
            )
            .await;
        self.check(request.send().await?).await?;
        Ok(())
    }

    // ==================== BÚSQUEDA ====================

    /// Búsqueda de direcciones, con sesgo opcional por ubicación del usuario.
    pub async fn search_addresses(
        &self,
        query: &str,
        user_location: Option<(f64, f64)>,
    ) -> ClientResult<Vec<PlaceSuggestion>> {
        debug!("🔎 Buscando direcciones: \"{}\"", query);

        let mut request = self
            .client
            .get(self.url("/api/routes/search"))
            .query(&[("q", query)]);
        if let Some((lat, lng)) = user_location {
            request = request.query(&[("userLat", lat), ("userLng", lng)]);
        }

        let request = self.authorized(request).await;
        let response = self.check(request.send().await?).await?;
        Ok(response.json().await?)
    }
}
