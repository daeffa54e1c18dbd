use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropSuggestionRequest {
    /// Current temperature in Celsius
    pub temperature: f64,
    /// Current humidity percentage
    pub humidity: f64,
    /// Current soil moisture percentage
    pub soil_moisture: f64,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropSuggestion {
    /// Suggested crop to plant
    pub crop_suggestion: String,
    /// Justification based on the readings
    pub reason: String,
}
