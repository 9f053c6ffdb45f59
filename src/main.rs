//! Cliente interactivo de rutas de reparto
//!
//! Terminal con menús para operar contra el backend de rutas: acceso y
//! registro, listado agrupado por día con búsqueda y filtros, detalle de
//! ruta con paradas, creación con autocompletado de direcciones y perfil
//! con estadísticas. Toda la lógica vive en la biblioteca; acá solo hay
//! menús e impresión.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use colored::*;
use dotenvy::dotenv;
use tracing::info;

use shipper_client::config::environment::EnvironmentConfig;
use shipper_client::events::AppEvent;
use shipper_client::models::auth::{LoginRequest, RegisterRequest};
use shipper_client::models::profile::{Profile, UpdateProfileRequest};
use shipper_client::models::route::{RouteDetail, RouteStatus, RouteSummary, StopStatus};
use shipper_client::services::{
    AddressSearchService, ProfileService, RouteDetailService, RouteListCriteria, RouteListService,
    SortOrder, StatusFilter,
};
use shipper_client::state::AppState;
use shipper_client::utils::validation::validate_email;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = EnvironmentConfig::default();
    info!("🚚 Cliente de rutas apuntando a {}", config.api_base_url);

    let state = AppState::new(config)?;

    println!();
    println!("{}", "🚚 SHIPPER - CLIENTE DE RUTAS".bright_blue().bold());
    println!("{}", "=============================".bright_blue());

    // La expiración de sesión puede llegar desde cualquier pantalla.
    let mut bus = state.events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = bus.recv().await {
            if event == AppEvent::SessionExpired {
                println!();
                println!(
                    "{}",
                    "🔒 Tu sesión expiró. Inicia sesión de nuevo."
                        .bright_red()
                        .bold()
                );
            }
        }
    });

    if state.restore_session().await {
        let nombre = state.session.display_name().await;
        println!(
            "{}",
            format!("👋 Sesión restaurada. Hola, {}", nombre).bright_green()
        );
    }

    loop {
        if !state.session.is_authenticated().await {
            if !auth_screen(&state).await? {
                break;
            }
        }
        main_menu(&state).await?;
    }

    println!("{}", "👋 ¡Hasta luego!".bright_green());
    Ok(())
}

/// Menú de acceso. Devuelve `false` si el usuario quiere salir del programa.
async fn auth_screen(state: &AppState) -> Result<bool> {
    loop {
        println!();
        println!("{}", "🔐 ACCESO".bright_green().bold());
        println!("1. 🔑 Iniciar sesión");
        println!("2. 📝 Crear cuenta");
        println!("3. 🚪 Salir");
        println!();

        let choice = prompt("Selecciona una opción (1-3): ")?;
        match choice.as_str() {
            "1" => {
                if login_flow(state).await? {
                    return Ok(true);
                }
            }
            "2" => register_flow(state).await?,
            "3" => return Ok(false),
            _ => println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red()),
        }
    }
}

async fn login_flow(state: &AppState) -> Result<bool> {
    println!();
    println!("{}", "🔑 INICIAR SESIÓN".bright_cyan().bold());

    let email = prompt("Email: ")?;
    let password = prompt("Contraseña: ")?;

    let request = LoginRequest { email, password };
    match state.client.login(&request).await {
        Ok(_) => {
            let nombre = state.session.display_name().await;
            println!(
                "{}",
                format!("✅ Bienvenido, {}", nombre).bright_green().bold()
            );
            Ok(true)
        }
        Err(err) => {
            println!("{}", format!("❌ {}", err.user_message()).bright_red());
            Ok(false)
        }
    }
}

async fn register_flow(state: &AppState) -> Result<()> {
    println!();
    println!("{}", "📝 CREAR CUENTA".bright_cyan().bold());

    let email = prompt("Email: ")?;
    if validate_email(&email).is_err() {
        println!("{}", "❌ Ese email no parece válido.".bright_red());
        return Ok(());
    }
    let password = prompt("Contraseña: ")?;
    let full_name = prompt("Nombre completo: ")?;
    let phone = prompt("Teléfono: ")?;
    let vehicle = prompt("Vehículo: ")?;

    let request = RegisterRequest {
        email,
        password,
        full_name,
        phone,
        vehicle,
    };
    match state.client.register(&request).await {
        Ok(()) => println!("{}", "✅ Cuenta creada. Ahora inicia sesión.".bright_green()),
        Err(err) => println!("{}", format!("❌ {}", err.user_message()).bright_red()),
    }
    Ok(())
}

/// Menú principal. Vuelve cuando la sesión se cierra o expira.
async fn main_menu(state: &AppState) -> Result<()> {
    loop {
        if !state.session.is_authenticated().await {
            return Ok(());
        }

        let nombre = state.session.display_name().await;
        println!();
        println!("{}", "📋 MENÚ PRINCIPAL".bright_green().bold());
        println!("   Conductor: {}", nombre);
        println!();
        println!("1. 🗺️ Mis rutas");
        println!("2. 🆕 Crear ruta");
        println!("3. 👤 Perfil y estadísticas");
        println!("4. 🚪 Cerrar sesión");
        println!();

        let choice = prompt("Selecciona una opción (1-4): ")?;
        match choice.as_str() {
            "1" => routes_screen(state).await?,
            "2" => create_route_screen(state).await?,
            "3" => profile_screen(state).await?,
            "4" => {
                state.session.clear().await;
                println!("{}", "👋 Sesión cerrada.".bright_green());
                return Ok(());
            }
            _ => println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red()),
        }
    }
}

/// Listado de rutas agrupado por día, con búsqueda, filtro y orden.
async fn routes_screen(state: &AppState) -> Result<()> {
    let list = RouteListService::new(state.client.clone(), state.events.clone());

    loop {
        if !state.session.is_authenticated().await {
            return Ok(());
        }

        if let Err(err) = list.refresh().await {
            println!("{}", format!("❌ {}", err.user_message()).bright_red());
            if err.is_auth_expired() {
                return Ok(());
            }
        }

        let criteria = list.criteria().await;
        let sections = list.sections().await;

        println!();
        println!("{}", "🗺️ MIS RUTAS".bright_cyan().bold());
        print_criteria(&criteria);
        println!();

        if sections.is_empty() {
            println!("   (sin rutas que mostrar)");
        }
        for section in &sections {
            println!("{}", format!("📅 {}", section.title).bright_blue().bold());
            for route in &section.routes {
                print_route_line(route);
            }
        }

        println!();
        println!("1. 📂 Abrir una ruta");
        println!("2. 🔍 Buscar");
        println!("3. 🗂️ Filtrar por estado");
        println!("4. ↕️ Cambiar orden");
        println!("5. ⬅️ Volver");
        println!();

        let choice = prompt("Selecciona una opción (1-5): ")?;
        match choice.as_str() {
            "1" => match prompt("ID de la ruta: ")?.parse::<i64>() {
                Ok(route_id) => detail_screen(state, route_id).await?,
                Err(_) => println!("{}", "❌ Ingresa un número de ruta válido.".bright_red()),
            },
            "2" => {
                let texto = prompt("Texto a buscar (vacío para limpiar): ")?;
                list.set_search(texto).await;
            }
            "3" => {
                println!("1. Todas  2. Pendientes  3. Completadas");
                match prompt("Filtro (1-3): ")?.as_str() {
                    "1" => list.set_status_filter(StatusFilter::All).await,
                    "2" => list.set_status_filter(StatusFilter::Pending).await,
                    "3" => list.set_status_filter(StatusFilter::Completed).await,
                    _ => println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red()),
                }
            }
            "4" => {
                let next = match list.criteria().await.sort {
                    SortOrder::Newest => SortOrder::Oldest,
                    SortOrder::Oldest => SortOrder::Newest,
                };
                list.set_sort_order(next).await;
            }
            "5" => return Ok(()),
            _ => println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red()),
        }
    }
}

fn print_criteria(criteria: &RouteListCriteria) {
    let filtro = match criteria.status {
        StatusFilter::All => "todas",
        StatusFilter::Pending => "pendientes",
        StatusFilter::Completed => "completadas",
    };
    let orden = match criteria.sort {
        SortOrder::Newest => "recientes primero",
        SortOrder::Oldest => "antiguas primero",
    };
    if criteria.search.is_empty() {
        println!("   Filtro: {} | Orden: {}", filtro, orden);
    } else {
        println!(
            "   Búsqueda: \"{}\" | Filtro: {} | Orden: {}",
            criteria.search, filtro, orden
        );
    }
}

fn print_route_line(route: &RouteSummary) {
    let mut extras = String::new();
    if let Some(meters) = route.total_distance_meters {
        extras.push_str(&format!("  {:.1} km", meters / 1000.0));
    }
    if let Some(seconds) = route.total_duration_seconds {
        extras.push_str(&format!("  ~{} min", (seconds / 60.0).round() as i64));
    }
    println!(
        "   [{}] {} {}{}",
        route.id,
        route.route_name,
        route_status_label(route.route_status),
        extras
    );
    if let Some(address) = &route.start_address {
        println!("        📍 {}", address);
    }
}

/// Detalle de una ruta. Las rutas completadas quedan de solo lectura.
async fn detail_screen(state: &AppState, route_id: i64) -> Result<()> {
    let detail_service = RouteDetailService::new(
        state.client.clone(),
        state.events.clone(),
        state.config.default_center(),
        route_id,
    );

    if let Err(err) = detail_service.reload().await {
        println!("{}", format!("❌ {}", err.user_message()).bright_red());
        return Ok(());
    }

    loop {
        if !state.session.is_authenticated().await {
            return Ok(());
        }
        let Some(detail) = detail_service.detail().await else {
            println!("{}", "❌ No se pudo cargar la ruta.".bright_red());
            return Ok(());
        };

        print_detail(&detail);

        if detail.is_completed() {
            println!();
            println!("1. 🗺️ Ver recorrido");
            println!("2. ⬅️ Volver");
            println!();

            let choice = prompt("Selecciona una opción (1-2): ")?;
            match choice.as_str() {
                "1" => print_geometry(&detail_service).await,
                "2" => return Ok(()),
                _ => println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red()),
            }
            continue;
        }

        println!();
        println!("1. ➕ Agregar parada");
        println!("2. 🗑️ Borrar parada");
        println!("3. 🔄 Avanzar estado de una parada");
        println!("4. 🚀 Optimizar recorrido");
        println!("5. 🏁 Completar ruta");
        println!("6. 🗺️ Ver recorrido");
        println!("7. 🔁 Recargar");
        println!("8. ⬅️ Volver");
        println!();

        let choice = prompt("Selecciona una opción (1-8): ")?;
        let outcome = match choice.as_str() {
            "1" => {
                let direccion = prompt("Dirección de la parada: ")?;
                Some(detail_service.add_stop(&direccion).await)
            }
            "2" => match prompt("ID de la parada: ")?.parse::<i64>() {
                Ok(stop_id) => Some(detail_service.delete_stop(stop_id).await),
                Err(_) => {
                    println!("{}", "❌ Ingresa un número de parada válido.".bright_red());
                    None
                }
            },
            "3" => match prompt("ID de la parada: ")?.parse::<i64>() {
                Ok(stop_id) => Some(detail_service.cycle_stop_status(stop_id).await),
                Err(_) => {
                    println!("{}", "❌ Ingresa un número de parada válido.".bright_red());
                    None
                }
            },
            "4" => Some(detail_service.optimize().await),
            "5" => Some(detail_service.complete_route().await),
            "6" => {
                print_geometry(&detail_service).await;
                None
            }
            "7" => Some(detail_service.reload().await),
            "8" => return Ok(()),
            _ => {
                println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red());
                None
            }
        };

        match outcome {
            Some(Ok(())) => println!("{}", "✅ Listo.".bright_green()),
            Some(Err(err)) => {
                println!("{}", format!("❌ {}", err.user_message()).bright_red());
                if err.is_auth_expired() {
                    return Ok(());
                }
            }
            None => {}
        }
    }
}

fn print_detail(detail: &RouteDetail) {
    println!();
    println!(
        "{}",
        format!("📦 RUTA #{}: {}", detail.id, detail.route_name)
            .bright_cyan()
            .bold()
    );
    println!("   Estado: {}", route_status_label(detail.route_status));
    if let Some(address) = &detail.start_address {
        println!("   Salida: 📍 {}", address);
    }
    if let Some(meters) = detail.total_distance_meters {
        println!("   Distancia: {:.1} km", meters / 1000.0);
    }
    if let Some(seconds) = detail.total_duration_seconds {
        println!(
            "   Duración estimada: ~{} min",
            (seconds / 60.0).round() as i64
        );
    }

    if detail.stops.is_empty() {
        println!("   (la ruta todavía no tiene paradas)");
        return;
    }
    println!("   Paradas:");
    for stop in &detail.stops {
        // sin orden asignado todavía, el marcador es "!"
        let marker = stop
            .optimized_order
            .map(|n| n.to_string())
            .unwrap_or_else(|| "!".to_string());
        println!(
            "   [{}] ({}) {} {}",
            stop.id,
            marker,
            stop.address_text,
            stop_status_label(stop.stop_status)
        );
    }
}

async fn print_geometry(detail_service: &RouteDetailService) {
    match detail_service.overview_path().await {
        Ok(path) if path.is_empty() => {
            println!("   Todavía no hay recorrido optimizado.");
        }
        Ok(path) => {
            let (max, min) = detail_service.camera_bounds().await;
            let last = path[path.len() - 1];
            println!("   🧭 Recorrido con {} puntos", path.len());
            println!("   Primer punto: [{:.5}, {:.5}]", path[0][0], path[0][1]);
            println!("   Último punto: [{:.5}, {:.5}]", last[0], last[1]);
            println!(
                "   Encuadre: [{:.5}, {:.5}] a [{:.5}, {:.5}]",
                min[0], min[1], max[0], max[1]
            );
        }
        Err(err) => println!("{}", format!("❌ {}", err.user_message()).bright_red()),
    }
}

async fn create_route_screen(state: &AppState) -> Result<()> {
    println!();
    println!("{}", "🆕 CREAR RUTA".bright_cyan().bold());

    let name = prompt("Nombre de la ruta: ")?;
    let start_address = pick_start_address(state).await?;

    let list = RouteListService::new(state.client.clone(), state.events.clone());
    match list.create_route(&name, &start_address).await {
        Ok(route_id) => {
            println!(
                "{}",
                format!("✅ Ruta #{} creada.", route_id).bright_green().bold()
            );
            detail_screen(state, route_id).await?;
        }
        Err(err) => println!("{}", format!("❌ {}", err.user_message()).bright_red()),
    }
    Ok(())
}

/// Prompt del punto de partida con autocompletado contra el backend.
///
/// Cada línea tipeada dispara una búsqueda con debounce. Un número elige
/// una sugerencia de la última lista y la línea vacía usa lo tipeado tal
/// cual (o lo omite si no se tipeó nada).
async fn pick_start_address(state: &AppState) -> Result<String> {
    let search = AddressSearchService::new(state.client.clone(), &state.config);
    let results = search.subscribe();
    let wait = Duration::from_millis(state.config.search_debounce_ms + 150);

    println!("   Punto de partida (opcional). Escribe para buscar; vacío termina.");
    let mut typed = String::new();

    loop {
        let line = prompt("Buscar punto de partida: ")?;
        if line.is_empty() {
            return Ok(typed);
        }

        if let Ok(index) = line.parse::<usize>() {
            let suggestions = results.borrow().clone();
            if index >= 1 && index <= suggestions.len() {
                return Ok(suggestions[index - 1].name.clone());
            }
            println!(
                "{}",
                "❌ Ese número no corresponde a ninguna sugerencia.".bright_red()
            );
            continue;
        }

        typed = line.clone();
        search.on_input(&line);
        tokio::time::sleep(wait).await;

        let suggestions = results.borrow().clone();
        if suggestions.is_empty() {
            println!("   (sin sugerencias; enter usa lo tipeado)");
        } else {
            for (i, suggestion) in suggestions.iter().enumerate() {
                println!("   {}. 📍 {}", i + 1, suggestion.name);
            }
            println!("   (número elige, enter usa lo tipeado, otro texto sigue buscando)");
        }
    }
}

async fn profile_screen(state: &AppState) -> Result<()> {
    let profile_service = ProfileService::new(state.client.clone(), state.events.clone());

    loop {
        if !state.session.is_authenticated().await {
            return Ok(());
        }

        let profile = match profile_service.get_profile().await {
            Ok(profile) => profile,
            Err(err) => {
                println!("{}", format!("❌ {}", err.user_message()).bright_red());
                return Ok(());
            }
        };

        println!();
        println!("{}", "👤 PERFIL".bright_cyan().bold());
        println!("   Nombre: {}", profile.full_name);
        println!("   Email: {}", profile.email);
        println!("   Teléfono: {}", profile.phone);
        println!("   Vehículo: {}", profile.vehicle);

        println!();
        println!("{}", "📊 ESTADÍSTICAS".bright_cyan().bold());
        match profile_service.stats_summary().await {
            Some(stats) => {
                println!("   Días activo: {}", stats.days_active);
                println!("   Rutas totales: {}", stats.total_routes);
                println!("   Distancia recorrida: {:.1} km", stats.total_distance_km);
                println!("   Entregas exitosas: {}", stats.success_deliveries);
                println!("   Calificación: {:.1} ⭐", stats.rating);
            }
            None => {
                println!("   Días activo: --");
                println!("   Rutas totales: --");
                println!("   Distancia recorrida: --");
                println!("   Entregas exitosas: --");
                println!("   Calificación: --");
            }
        }

        println!();
        println!("1. ✏️ Editar perfil");
        println!("2. 🔄 Refrescar");
        println!("3. ⬅️ Volver");
        println!();

        let choice = prompt("Selecciona una opción (1-3): ")?;
        match choice.as_str() {
            "1" => edit_profile(&profile_service, &profile).await?,
            "2" => continue,
            "3" => return Ok(()),
            _ => println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red()),
        }
    }
}

async fn edit_profile(profile_service: &ProfileService, current: &Profile) -> Result<()> {
    println!("   (enter conserva el valor actual)");

    let full_name = prompt_with_default("Nombre completo", &current.full_name)?;
    let phone = prompt_with_default("Teléfono", &current.phone)?;
    let vehicle = prompt_with_default("Vehículo", &current.vehicle)?;

    let request = UpdateProfileRequest {
        full_name,
        phone,
        vehicle,
    };
    match profile_service.update_profile(&request).await {
        Ok(()) => println!("{}", "✅ Perfil actualizado.".bright_green()),
        Err(err) => println!("{}", format!("❌ {}", err.user_message()).bright_red()),
    }
    Ok(())
}

fn route_status_label(status: RouteStatus) -> ColoredString {
    match status {
        RouteStatus::Pending => "Pendiente".yellow(),
        RouteStatus::Completed => "Completada".green(),
    }
}

fn stop_status_label(status: StopStatus) -> ColoredString {
    match status {
        StopStatus::Pending => "Pendiente".yellow(),
        StopStatus::Delivered => "Entregada".green(),
        StopStatus::Failed => "Fallida".red(),
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_with_default(label: &str, current: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", label, current))?;
    if input.is_empty() {
        Ok(current.to_string())
    } else {
        Ok(input)
    }
}
