//! Tests de integración del cliente HTTP contra un backend simulado por
//! socket: sesión, headers, formato de requests y las políticas de recarga.

use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use shipper_client::config::environment::EnvironmentConfig;
use shipper_client::events::{AppEvent, EventBus};
use shipper_client::models::auth::LoginRequest;
use shipper_client::models::route::StopStatus;
use shipper_client::services::{
    AddressSearchService, RouteDetailService, RouteListService, SessionStore,
};
use shipper_client::utils::errors::{ClientError, GENERIC_REQUEST_ERROR};
use shipper_client::ShipperApiClient;

#[tokio::test]
async fn test_login_stores_token_for_later_requests() {
    let (base_url, _log) = spawn_backend(vec![reply(200, r#"{"token":"token-abc"}"#)]).await;
    let (client, session, _events, token_path) = harness(&base_url);

    let request = LoginRequest {
        email: "shipper@test.com".to_string(),
        password: "secreta".to_string(),
    };
    let token = client.login(&request).await.unwrap();

    assert_eq!(token, "token-abc");
    assert!(session.is_authenticated().await);
    assert_eq!(session.token().await.as_deref(), Some("token-abc"));
    // También queda persistido para la próxima sesión
    assert!(token_path.exists());

    std::fs::remove_file(token_path).ok();
}

#[tokio::test]
async fn test_login_validates_fields_before_network() {
    // Puerto cerrado: si la validación local no corta el flujo, el request
    // fallaría por transporte, no por formulario.
    let (client, _session, _events, token_path) = harness("http://127.0.0.1:1");

    let request = LoginRequest {
        email: "".to_string(),
        password: "secreta".to_string(),
    };
    let err = client.login(&request).await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidForm(_)));
    std::fs::remove_file(token_path).ok();
}

#[tokio::test]
async fn test_bearer_token_attached_to_authorized_requests() {
    let (base_url, log) = spawn_backend(vec![reply(200, "[]")]).await;
    let (client, session, _events, token_path) = harness(&base_url);
    session.store("token-abc").await;

    let routes = client.list_routes().await.unwrap();
    assert!(routes.is_empty());

    let seen = log.lock().await;
    assert_eq!(seen.len(), 1);
    let request = seen[0].to_lowercase();
    assert!(request.contains("get /api/routes"));
    assert!(request.contains("authorization: bearer token-abc"));

    std::fs::remove_file(token_path).ok();
}

#[tokio::test]
async fn test_unauthorized_discards_session_and_notifies() {
    let body = r#"{"error":"Phiên đăng nhập hết hạn"}"#;
    let (base_url, _log) = spawn_backend(vec![reply(401, body)]).await;
    let (client, session, events, token_path) = harness(&base_url);

    session.store("token-abc").await;
    assert!(token_path.exists());
    let mut rx = events.subscribe();

    let err = client.list_routes().await.unwrap_err();

    assert!(err.is_auth_expired());
    // El token se descarta de memoria y de disco antes de devolver el error
    assert!(session.token().await.is_none());
    assert!(!token_path.exists());
    assert_eq!(rx.try_recv().unwrap(), AppEvent::SessionExpired);
}

#[tokio::test]
async fn test_backend_error_message_is_preferred() {
    let body = r#"{"error":"La ruta no existe"}"#;
    let (base_url, _log) = spawn_backend(vec![reply(500, body)]).await;
    let (client, _session, _events, token_path) = harness(&base_url);

    let err = client.get_route(9).await.unwrap_err();

    assert_eq!(err.user_message(), "La ruta no existe");
    assert!(!err.is_auth_expired());
    std::fs::remove_file(token_path).ok();
}

#[tokio::test]
async fn test_error_without_body_falls_back_to_generic() {
    let (base_url, _log) = spawn_backend(vec![reply(502, "upstream caído")]).await;
    let (client, _session, _events, token_path) = harness(&base_url);

    let err = client.get_route(9).await.unwrap_err();

    assert_eq!(err.user_message(), GENERIC_REQUEST_ERROR);
    std::fs::remove_file(token_path).ok();
}

#[tokio::test]
async fn test_create_route_sends_camel_case_and_notifies() {
    let (base_url, log) = spawn_backend(vec![reply(200, r#"{"routeId":12}"#)]).await;
    let (client, _session, events, token_path) = harness(&base_url);
    let mut rx = events.subscribe();

    let list = RouteListService::new(client, events.clone());
    let route_id = list.create_route("Đơn sáng", "").await.unwrap();

    assert_eq!(route_id, 12);
    assert_eq!(rx.try_recv().unwrap(), AppEvent::RoutesChanged);

    let seen = log.lock().await;
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("POST /api/routes"));
    assert!(seen[0].contains(r#""routeName":"Đơn sáng""#));

    std::fs::remove_file(token_path).ok();
}

#[tokio::test]
async fn test_create_route_requires_name() {
    // Puerto cerrado: el nombre vacío debe cortarse antes de tocar la red
    let (client, _session, events, token_path) = harness("http://127.0.0.1:1");

    let list = RouteListService::new(client, events);
    let err = list.create_route("   ", "Kho Long Biên").await.unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(err.user_message(), "Por favor ingresa el nombre de la ruta");
    std::fs::remove_file(token_path).ok();
}

#[tokio::test]
async fn test_stop_status_update_sends_lowercase_status() {
    let (base_url, log) = spawn_backend(vec![reply(200, "{}")]).await;
    let (client, _session, _events, token_path) = harness(&base_url);

    client
        .update_stop_status(5, 9, StopStatus::Delivered)
        .await
        .unwrap();

    let seen = log.lock().await;
    assert!(seen[0].contains("PATCH /api/routes/5/stops/9"));
    assert!(seen[0].contains(r#""status":"delivered""#));

    std::fs::remove_file(token_path).ok();
}

#[tokio::test]
async fn test_failed_mutation_still_reloads_detail() {
    let detail_body = r#"{"id":7,"route_name":"Đơn sáng","route_status":"pending","created_at":"2024-03-05T08:00:00Z","start_address":"Kho Long Biên","start_lat":21.04,"start_lng":105.88,"overview_polyline":null,"total_distance_meters":null,"total_duration_seconds":null,"stops":[]}"#;
    let responses = vec![
        reply(500, r#"{"error":"No se pudo borrar la parada"}"#),
        reply(200, detail_body),
    ];
    let (base_url, log) = spawn_backend(responses).await;
    let (client, _session, events, token_path) = harness(&base_url);
    let mut rx = events.subscribe();

    let detail_service = RouteDetailService::new(client, events.clone(), [105.8522, 21.0285], 7);
    let err = detail_service.delete_stop(3).await.unwrap_err();

    assert_eq!(err.user_message(), "No se pudo borrar la parada");

    // Aunque la mutación falló, el detalle se recargó y los demás se enteran
    let seen = log.lock().await;
    assert_eq!(seen.len(), 2);
    assert!(seen[0].contains("DELETE /api/routes/7/stops/3"));
    assert!(seen[1].contains("GET /api/routes/7"));
    drop(seen);

    assert_eq!(rx.try_recv().unwrap(), AppEvent::RoutesChanged);
    assert_eq!(rx.try_recv().unwrap(), AppEvent::ProfileChanged);

    let detail = detail_service.detail().await.unwrap();
    assert_eq!(detail.route_name, "Đơn sáng");

    std::fs::remove_file(token_path).ok();
}

#[tokio::test]
async fn test_stale_reload_is_discarded() {
    let vieja = r#"{"id":7,"route_name":"Versión vieja","route_status":"pending","created_at":"2024-03-05T08:00:00Z","start_address":null,"start_lat":null,"start_lng":null,"overview_polyline":null,"total_distance_meters":null,"total_duration_seconds":null,"stops":[]}"#;
    let nueva = r#"{"id":7,"route_name":"Versión nueva","route_status":"pending","created_at":"2024-03-05T08:00:00Z","start_address":null,"start_lat":null,"start_lng":null,"overview_polyline":null,"total_distance_meters":null,"total_duration_seconds":null,"stops":[]}"#;
    // La primera conexión responde tarde; la recarga más nueva gana igual
    let responses = vec![delayed_reply(200, vieja, 300), reply(200, nueva)];
    let (base_url, _log) = spawn_backend(responses).await;
    let (client, _session, events, token_path) = harness(&base_url);

    let detail_service = RouteDetailService::new(client, events, [105.8522, 21.0285], 7);

    let lenta = {
        let service = detail_service.clone();
        tokio::spawn(async move { service.reload().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    detail_service.reload().await.unwrap();
    lenta.await.unwrap().unwrap();

    let detail = detail_service.detail().await.unwrap();
    assert_eq!(detail.route_name, "Versión nueva");

    std::fs::remove_file(token_path).ok();
}

#[tokio::test]
async fn test_debounced_search_sends_only_latest_query() {
    let body = r#"[{"id":"p1","name":"Kho Long Biên"}]"#;
    let (base_url, log) = spawn_backend(vec![reply(200, body)]).await;
    let (client, _session, _events, token_path) = harness(&base_url);

    let config = config_for(&base_url, &token_path);
    let search = AddressSearchService::new(client, &config);
    let results = search.subscribe();

    // Dos teclazos rápidos: el primero se cancela antes del debounce
    search.on_input("khoa");
    search.on_input("khob");
    tokio::time::sleep(Duration::from_millis(400)).await;

    let seen = log.lock().await;
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("q=khob"));
    drop(seen);

    let suggestions = results.borrow().clone();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].name, "Kho Long Biên");

    std::fs::remove_file(token_path).ok();
}

// ==================== BACKEND SIMULADO ====================

struct CannedResponse {
    status: u16,
    body: &'static str,
    delay_ms: u64,
}

fn reply(status: u16, body: &'static str) -> CannedResponse {
    CannedResponse {
        status,
        body,
        delay_ms: 0,
    }
}

fn delayed_reply(status: u16, body: &'static str, delay_ms: u64) -> CannedResponse {
    CannedResponse {
        status,
        body,
        delay_ms,
    }
}

type RequestLog = Arc<Mutex<Vec<String>>>;

/// Levanta un backend de juguete que atiende una conexión por respuesta
/// enlatada y registra cada request recibido.
async fn spawn_backend(responses: Vec<CannedResponse>) -> (String, RequestLog) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));

    let seen = log.clone();
    tokio::spawn(async move {
        for canned in responses {
            let Ok((socket, _)) = listener.accept().await else {
                return;
            };
            let seen = seen.clone();
            tokio::spawn(async move {
                serve_one(socket, canned, seen).await;
            });
        }
    });

    (base_url, log)
}

async fn serve_one(mut socket: TcpStream, canned: CannedResponse, log: RequestLog) {
    let request = read_request(&mut socket).await;
    log.lock().await.push(request);

    if canned.delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(canned.delay_ms)).await;
    }

    let reason = match canned.status {
        200 => "OK",
        401 => "Unauthorized",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "OK",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        canned.status,
        reason,
        canned.body.len(),
        canned.body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Lee un request HTTP completo: cabeceras y, si declara Content-Length,
/// también el cuerpo.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];

    loop {
        let n = match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        data.extend_from_slice(&buf[..n]);

        if let Some(header_end) = find_blank_line(&data) {
            let head = String::from_utf8_lossy(&data[..header_end]);
            let mut content_length = 0;
            for line in head.lines() {
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
            }
            if data.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&data).into_owned()
}

fn find_blank_line(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n")
}

static FILE_COUNTER: AtomicU32 = AtomicU32::new(0);

fn temp_token_path() -> PathBuf {
    let n = FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "shipper_client_session_it_{}_{}.json",
        process::id(),
        n
    ))
}

fn config_for(base_url: &str, token_path: &PathBuf) -> EnvironmentConfig {
    EnvironmentConfig {
        api_base_url: base_url.to_string(),
        token_file: token_path.to_string_lossy().into_owned(),
        request_timeout_secs: 5,
        search_debounce_ms: 80,
        search_min_chars: 3,
        map_default_lng: 105.8522,
        map_default_lat: 21.0285,
    }
}

fn harness(base_url: &str) -> (ShipperApiClient, SessionStore, EventBus, PathBuf) {
    let token_path = temp_token_path();
    let config = config_for(base_url, &token_path);
    let session = SessionStore::new(&config.token_file);
    let events = EventBus::new();
    let client = ShipperApiClient::new(&config, session.clone(), events.clone()).unwrap();
    (client, session, events, token_path)
}
