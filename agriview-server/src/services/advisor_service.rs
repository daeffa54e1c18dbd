use std::time::Duration;

use agriview_api::models::{CropSuggestion, CropSuggestionRequest};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::configs::Advisor;
use crate::errors::AdvisorError;

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Crop suggestion from a hosted language model.
pub struct AdvisorService {
    client: Client,
    settings: Advisor,
}

impl AdvisorService {
    pub fn new(settings: Advisor) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self { client, settings })
    }

    pub fn is_configured(&self) -> bool {
        self.settings.api_key.is_some()
    }

    pub async fn suggest_crop(&self, readings: &CropSuggestionRequest) -> Result<CropSuggestion, AdvisorError> {
        let api_key = self.settings.api_key.as_deref().ok_or(AdvisorError::NotConfigured)?;

        if ![readings.temperature, readings.humidity, readings.soil_moisture]
            .iter()
            .all(|value| value.is_finite())
        {
            return Err(AdvisorError::InvalidReadings);
        }

        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model
        );
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": render_prompt(readings) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "cropSuggestion": { "type": "STRING" },
                        "reason": { "type": "STRING" }
                    },
                    "required": ["cropSuggestion", "reason"]
                }
            }
        });

        tracing::debug!("requesting crop suggestion for {:?}", readings);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AdvisorError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!("Crop advisor returned {}: {}", status, detail);
            return Err(AdvisorError::Upstream(format!("model endpoint returned {status}")));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::Unparsable(e.to_string()))?;

        let suggestion = parse_suggestion(&payload)?;

        tracing::info!("crop suggestion: {}", suggestion.crop_suggestion);

        Ok(suggestion)
    }
}

fn render_prompt(readings: &CropSuggestionRequest) -> String {
    format!(
        "You are an AI crop advisor. Based on the sensor readings provided, suggest the most suitable \
         crop to plant and explain your reasoning.\n\n\
         Sensor Readings:\n\
         Temperature: {}°C\n\
         Humidity: {}%\n\
         Soil Moisture: {}%\n\n\
         Consider these general seasonal conditions:\n\
         - Rice: thrives in warm temperatures (above 25°C) and high humidity (above 70%), needs ample water.\n\
         - Wheat: prefers moderate temperatures (15-25°C) and moderate humidity, tolerates drier soil than rice.\n\
         - Corn: adaptable, likes warm temperatures (20-30°C) and good soil moisture, handles a range of humidity.\n\n\
         Based only on the temperature, humidity and soil moisture, name the single most appropriate crop \
         and give a brief justification. Answer as JSON with the fields `cropSuggestion` and `reason`.",
        readings.temperature, readings.humidity, readings.soil_moisture
    )
}

fn parse_suggestion(payload: &GenerateContentResponse) -> Result<CropSuggestion, AdvisorError> {
    let text = payload
        .candidates
        .iter()
        .filter_map(|candidate| candidate.content.as_ref())
        .flat_map(|content| content.parts.iter())
        .find_map(|part| part.text.as_deref())
        .ok_or_else(|| AdvisorError::Unparsable(String::from("no candidate text")))?;

    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .and_then(|inner| inner.strip_suffix("```"))
        .unwrap_or(text)
        .trim();

    let suggestion: CropSuggestion =
        serde_json::from_str(text).map_err(|e| AdvisorError::Unparsable(e.to_string()))?;

    if suggestion.crop_suggestion.trim().is_empty() {
        return Err(AdvisorError::Unparsable(String::from("empty crop suggestion")));
    }

    Ok(suggestion)
}
