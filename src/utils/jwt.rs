//! Lectura del JWT del backend
//!
//! El cliente nunca tiene el secreto de firma, así que solo lee el payload
//! (igual que haría un `jwt-decode`) para obtener el nombre a mostrar en la
//! cabecera. Cualquier fallo degrada silenciosamente al nombre por defecto.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Nombre por defecto cuando el token no se puede leer
pub const DEFAULT_DISPLAY_NAME: &str = "Shipper";

/// Claims que nos interesan del token emitido por el backend
#[derive(Debug, Deserialize)]
pub struct TokenClaims {
    pub user: TokenUser,
}

#[derive(Debug, Deserialize)]
pub struct TokenUser {
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
}

/// Extraer el nombre del claim `user.fullName` sin verificar la firma.
pub fn display_name_from_token(token: &str) -> Option<String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    data.claims
        .user
        .full_name
        .filter(|name| !name.trim().is_empty())
}

/// Nombre para la pantalla principal, con fallback silencioso.
pub fn display_name_or_default(token: &str) -> String {
    display_name_from_token(token).unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn make_token(payload: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &payload,
            &EncodingKey::from_secret(b"whatever"),
        )
        .unwrap()
    }

    #[test]
    fn test_display_name_from_valid_token() {
        let token = make_token(json!({
            "user": { "id": 7, "fullName": "Nguyễn Văn A" },
            "exp": 4_102_444_800u64,
        }));
        assert_eq!(display_name_from_token(&token).as_deref(), Some("Nguyễn Văn A"));
    }

    #[test]
    fn test_missing_name_falls_back() {
        let token = make_token(json!({ "user": { "id": 7 }, "exp": 4_102_444_800u64 }));
        assert_eq!(display_name_or_default(&token), DEFAULT_DISPLAY_NAME);
    }

    #[test]
    fn test_garbage_token_falls_back() {
        assert_eq!(display_name_or_default("no-es-un-jwt"), DEFAULT_DISPLAY_NAME);
        assert_eq!(display_name_or_default(""), DEFAULT_DISPLAY_NAME);
    }

    #[test]
    fn test_expired_token_still_readable() {
        // El nombre se muestra aunque el token esté vencido; la expiración
        // real la decide el backend con un 401.
        let token = make_token(json!({
            "user": { "fullName": "Trần B" },
            "exp": 1u64,
        }));
        assert_eq!(display_name_or_default(&token), "Trần B");
    }
}
