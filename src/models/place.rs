//! Modelos de búsqueda de direcciones

use serde::{Deserialize, Serialize};

/// Una sugerencia del endpoint de búsqueda (GET /api/routes/search)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub id: String,
    pub name: String,
}
