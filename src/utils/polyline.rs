//! Geometría de polylines para el mapa de rutas
//!
//! Este módulo decodifica el formato polyline estándar (chunks de 5 bits,
//! bit de continuación 0x20, deltas con signo, escala 1e-5) que el backend
//! devuelve en `overview_polyline`, y calcula el bounding box con el que se
//! encuadra la cámara del mapa.

use thiserror::Error;

/// Par de coordenadas en orden GIS: `[longitud, latitud]`
pub type LngLat = [f64; 2];

/// Errores de decodificación de polylines
///
/// El decoder de referencia no define qué pasa con entradas malformadas;
/// aquí el escaneo está acotado y falla de forma explícita.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolylineError {
    #[error("truncated polyline: input ended inside a chunk at byte {0}")]
    Truncated(usize),

    #[error("invalid polyline character {0:#04x} at byte {1}")]
    InvalidCharacter(u8, usize),

    #[error("polyline value longer than 32 bits at byte {0}")]
    Overflow(usize),
}

/// Decodificar una polyline a pares `[lng, lat]` en grados.
///
/// Una cadena vacía es una polyline vacía, no un error. Cada componente es
/// un delta respecto al punto anterior (el primero respecto a `(0, 0)`),
/// con el bit menos significativo como signo en complemento a uno.
pub fn decode_polyline(encoded: &str) -> Result<Vec<LngLat>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0usize;
    let mut lat: i32 = 0;
    let mut lng: i32 = 0;

    while index < bytes.len() {
        lat = lat.wrapping_add(read_component(bytes, &mut index)?);
        lng = lng.wrapping_add(read_component(bytes, &mut index)?);
        points.push([f64::from(lng) * 1e-5, f64::from(lat) * 1e-5]);
    }

    Ok(points)
}

/// Codificar pares `[lng, lat]` al formato polyline (inverso de
/// [`decode_polyline`], con cuantización a 1e-5 grados).
pub fn encode_polyline(points: &[LngLat]) -> String {
    let mut out = String::new();
    let mut prev_lat = 0i32;
    let mut prev_lng = 0i32;

    for &[lng, lat] in points {
        let lat_e5 = (lat * 1e5).round() as i32;
        let lng_e5 = (lng * 1e5).round() as i32;
        write_component(lat_e5.wrapping_sub(prev_lat), &mut out);
        write_component(lng_e5.wrapping_sub(prev_lng), &mut out);
        prev_lat = lat_e5;
        prev_lng = lng_e5;
    }

    out
}

/// Bounding box de un conjunto de coordenadas.
///
/// Devuelve `(esquina_max, esquina_min)`, en ese orden exacto: es el que
/// espera el fit de cámara del mapa. Con entrada vacía devuelve `fallback`
/// repetido
/// como ambas esquinas (caja degenerada de área cero, los consumidores deben
/// tolerarla).
pub fn bounds(coords: &[LngLat], fallback: LngLat) -> (LngLat, LngLat) {
    let Some(first) = coords.first() else {
        return (fallback, fallback);
    };

    let mut min_lng = first[0];
    let mut max_lng = first[0];
    let mut min_lat = first[1];
    let mut max_lat = first[1];

    for &[lng, lat] in coords {
        if lng < min_lng {
            min_lng = lng;
        }
        if lng > max_lng {
            max_lng = lng;
        }
        if lat < min_lat {
            min_lat = lat;
        }
        if lat > max_lat {
            max_lat = lat;
        }
    }

    ([max_lng, max_lat], [min_lng, min_lat])
}

fn read_component(bytes: &[u8], index: &mut usize) -> Result<i32, PolylineError> {
    let mut result: u64 = 0;
    let mut shift = 0u32;

    loop {
        let Some(&raw) = bytes.get(*index) else {
            return Err(PolylineError::Truncated(*index));
        };
        if raw < 63 {
            return Err(PolylineError::InvalidCharacter(raw, *index));
        }
        *index += 1;

        let chunk = u64::from(raw - 63);
        result |= (chunk & 0x1f) << shift;
        if chunk < 0x20 {
            break;
        }
        shift += 5;
        if shift > 30 {
            return Err(PolylineError::Overflow(*index));
        }
    }

    // Aritmética de 32 bits igual que el decoder de referencia
    let r = result as u32;
    let value = if r & 1 != 0 { !(r >> 1) } else { r >> 1 };
    Ok(value as i32)
}

fn write_component(delta: i32, out: &mut String) {
    let mut value = ((delta << 1) ^ (delta >> 31)) as u32;
    while value >= 0x20 {
        out.push((((0x20 | (value & 0x1f)) + 63) as u8) as char);
        value >>= 5;
    }
    out.push(((value + 63) as u8) as char);
}
