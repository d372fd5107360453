use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A place returned by the external places provider, prior to scoring.
///
/// Immutable once fetched; field names are part of the external contract
/// consumed by the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePlace {
    /// Provider-assigned stable identifier
    pub id: String,
    pub name: String,
    /// Average user rating, 0.0 to 5.0
    pub rating: f64,
    pub review_count: u32,
    /// Provider category tags (e.g., "museum", "park")
    pub categories: Vec<String>,
    /// Price tier 0 (free) to 4 (very expensive), when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    /// Whether the place is currently open, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_now: Option<bool>,
    pub location: Location,
    /// Photo reference URLs
    #[serde(default)]
    pub photos: Vec<String>,
}

impl CandidatePlace {
    /// Primary category used for diversity accounting.
    pub fn primary_category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }
}

/// A named travel-interest profile used to bias scoring toward matching
/// place categories (e.g., "nature lover" -> park, garden, hiking_area).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub categories: Vec<String>,
}

impl Persona {
    pub fn new(name: impl Into<String>, categories: Vec<String>) -> Self {
        Self {
            name: name.into(),
            categories,
        }
    }

    /// Whether any of the place's categories match this persona's interests.
    pub fn matches(&self, place: &CandidatePlace) -> bool {
        place
            .categories
            .iter()
            .any(|category| self.categories.iter().any(|c| c == category))
    }
}
