//! Weather tool using the Open-Meteo forecast API.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Default Open-Meteo endpoint.
pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com";

/// Weather tool that fetches the current weather for a coordinate.
///
/// Open-Meteo is free and requires no API key. The forecast JSON is handed
/// back to the model unchanged.
///
/// # Parameters
///
/// - `latitude` (required): Latitude in degrees.
/// - `longitude` (required): Longitude in degrees.
///
/// # Examples
///
/// ```json
/// {"latitude": 38.72, "longitude": -9.14}
/// ```
pub struct GetWeather {
    client: reqwest::Client,
    base_url: String,
}

impl GetWeather {
    /// Create a weather tool against the public Open-Meteo API.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_WEATHER_URL)
    }

    /// Create a weather tool against another Open-Meteo compatible host.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_forecast(&self, latitude: f64, longitude: f64) -> Result<Value, ToolError> {
        let url = format!("{}/v1/forecast", self.base_url);
        debug!("Fetching weather from {} for {},{}", url, latitude, longitude);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", "temperature_2m".to_string()),
                ("hourly", "temperature_2m".to_string()),
                ("daily", "sunrise,sunset".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Weather API returned status {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}

impl Default for GetWeather {
    fn default() -> Self {
        Self::new()
    }
}

fn check_range(name: &str, value: f64, limit: f64) -> Result<f64, ToolError> {
    if value.is_finite() && value.abs() <= limit {
        Ok(value)
    } else {
        Err(ToolError::InvalidParameter {
            name: name.to_string(),
            reason: format!("must be between -{} and {}", limit, limit),
        })
    }
}

#[async_trait]
impl Tool for GetWeather {
    fn name(&self) -> &str {
        "getWeather"
    }

    fn description(&self) -> &str {
        "Get the current weather at a location"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "latitude": {"type": "number"},
                "longitude": {"type": "number"}
            },
            "required": ["latitude", "longitude"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let latitude = check_range("latitude", args.get_f64("latitude")?, 90.0)?;
        let longitude = check_range("longitude", args.get_f64("longitude")?, 180.0)?;

        match self.fetch_forecast(latitude, longitude).await {
            Ok(forecast) => Ok(ToolOutput::success(forecast)),
            Err(e) => {
                warn!("Weather fetch failed: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolContext;
    use chat_core::UiStreamWriter;

    fn make_args(params: Value) -> ToolArgs {
        let (writer, _rx) = UiStreamWriter::channel();
        ToolArgs::new(
            serde_json::from_value(params).unwrap(),
            ToolContext::new(writer, None),
        )
    }

    #[tokio::test]
    async fn test_missing_longitude() {
        let weather = GetWeather::new();
        let result = weather.execute(make_args(json!({"latitude": 1.0}))).await;
        assert!(matches!(result, Err(ToolError::MissingParameter(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_latitude() {
        let weather = GetWeather::new();
        let result = weather
            .execute(make_args(json!({"latitude": 91.0, "longitude": 0.0})))
            .await;
        assert!(matches!(result, Err(ToolError::InvalidParameter { .. })));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let weather = GetWeather::with_base_url("http://localhost:9000/");
        assert_eq!(weather.base_url, "http://localhost:9000");
    }

    // Integration tests that require network access
    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_weather_fetch() {
        let weather = GetWeather::new();
        let result = weather
            .execute(make_args(json!({"latitude": 51.5, "longitude": -0.12})))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.content.get("current").is_some());
    }
}
