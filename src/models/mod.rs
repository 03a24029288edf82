use serde::{Deserialize, Deserializer, Serialize};

pub mod filter;

pub use filter::{
    ContentRating, FilterCriteria, SearchParams, SortOrder, DEFAULT_LIMIT, MAX_LIMIT,
};

/// Synopsis shown when a catalog row carries no description
pub const PLACEHOLDER_SYNOPSIS: &str = "No description available.";

/// Content rating label shown when a catalog row has no certificate
pub const UNRATED_LABEL: &str = "Unrated";

/// Title shown when a catalog row has no title
pub const UNKNOWN_TITLE: &str = "Unknown";

/// One title's flat record as held by the catalog store
///
/// Every field is optional and none is trusted to be well-formed. `duration`
/// may embed units (e.g. "120 min"), `genre` and `stars` are comma-separated
/// free text, and zero in `year`, `rating` or `votes` means "unknown".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct CatalogRow {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub certificate: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub duration: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub votes: Option<i64>,
    pub stars: Option<String>,
    pub description: Option<String>,
}

/// Accepts a JSON string or number, keeping it as text
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(text)) => Some(text),
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// Cleaned, UI-ready projection of a catalog row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedRecord {
    pub title: String,
    pub genres: Vec<String>,
    /// Runtime in whole minutes, 0 when unknown
    pub runtime: u32,
    /// Content rating label (certificate), "Unrated" when absent
    pub rating: String,
    /// Audience score, 0.0 when unknown
    pub score: f64,
    pub synopsis: String,
    /// Up to three cleaned cast names
    pub cast: Vec<String>,
    pub year: Option<i32>,
    pub votes: i64,
}
