//! Weather specialist
//!
//! Merges an optional realtime forecast fetch with static agro-advisory
//! guidance. The fetch is the only hard-timeout call in the system; on
//! timeout or any transport error the specialist degrades to static
//! guidance instead of failing.

use advisor_application::ports::language_model::LanguageModel;
use advisor_application::ports::specialist::{Specialist, SpecialistError};
use advisor_domain::{Evidence, SpecialistProfile, SpecialistResult, Urgency};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_LOCATION: &str = "Delhi, India";

pub struct WeatherSpecialist {
    client: reqwest::Client,
    feed_url: Option<String>,
    fetch_timeout: Duration,
    model: Option<Arc<dyn LanguageModel>>,
}

impl WeatherSpecialist {
    pub fn new(feed_url: Option<String>, fetch_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            feed_url,
            fetch_timeout,
            model: None,
        }
    }

    /// Analyze fetched conditions with the language model instead of the
    /// canned advisory text
    pub fn with_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Fetch current conditions, bounded by the configured timeout.
    /// Every failure mode reads as "no data".
    async fn fetch_conditions(&self, location: &str) -> Option<Value> {
        let url = self.feed_url.as_deref()?;
        let request = self
            .client
            .get(url)
            .query(&[("q", location), ("days", "3")])
            .send();

        match tokio::time::timeout(self.fetch_timeout, request).await {
            Ok(Ok(response)) if response.status().is_success() => {
                match response.json::<Value>().await {
                    Ok(body) => Some(body),
                    Err(e) => {
                        warn!("weather feed returned unreadable body: {}", e);
                        None
                    }
                }
            }
            Ok(Ok(response)) => {
                warn!(status = %response.status(), "weather feed error status");
                None
            }
            Ok(Err(e)) => {
                warn!("weather feed request failed: {}", e);
                None
            }
            Err(_) => {
                warn!(timeout_secs = self.fetch_timeout.as_secs(), "weather feed timed out");
                None
            }
        }
    }

    fn summarize_conditions(body: &Value) -> Option<String> {
        let current = body.get("current")?;
        let temp = current.get("temp_c").and_then(Value::as_f64)?;
        let condition = current
            .pointer("/condition/text")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let humidity = current.get("humidity").and_then(Value::as_f64).unwrap_or(0.0);
        let precip = current.get("precip_mm").and_then(Value::as_f64).unwrap_or(0.0);
        Some(format!(
            "Current conditions: {}, {:.0}°C, humidity {:.0}%, precipitation {:.1}mm.",
            condition, temp, humidity, precip
        ))
    }

    /// Rule-based advisory derived from the current conditions summary
    fn advisory_for(summary: &str, crop: Option<&str>) -> String {
        let crop_note = crop
            .map(|c| format!(" for your {} crop", c))
            .unwrap_or_default();
        if summary.contains("rain") || summary.contains("Rain") {
            format!(
                "{} Rain is expected; postpone irrigation and pesticide spraying{}.",
                summary, crop_note
            )
        } else {
            format!(
                "{} No significant rain expected; plan irrigation as per crop stage{}.",
                summary, crop_note
            )
        }
    }

    fn static_guidance(query: &str, crop: Option<&str>) -> SpecialistResult {
        let advice = if query.contains("rain") || query.contains("monsoon") {
            "No realtime forecast is available. Check the IMD district forecast before \
             planning irrigation or spraying; avoid field operations when heavy rain is announced."
        } else if crop.is_some() {
            "Schedule irrigation by crop stage and local evapotranspiration rather than a \
             fixed calendar; verify the IMD district forecast for the coming week."
        } else {
            "Consult the IMD district-level forecast for your area; weather-sensitive \
             operations like spraying should be planned around dry, low-wind windows."
        };
        SpecialistResult::new("weather", advice, 0.5).with_urgency(Urgency::Medium)
    }
}

#[async_trait]
impl Specialist for WeatherSpecialist {
    fn profile(&self) -> SpecialistProfile {
        SpecialistProfile::new(
            "weather",
            "Weather forecasts, rain outlook, and weather-driven field operation advisories",
        )
        .with_example("Will it rain this week?")
        .with_example("Is it safe to spray pesticide tomorrow?")
    }

    async fn process(
        &self,
        query: &str,
        location: Option<&str>,
        crop: Option<&str>,
    ) -> Result<SpecialistResult, SpecialistError> {
        let location = location.unwrap_or(DEFAULT_LOCATION);
        let Some(body) = self.fetch_conditions(location).await else {
            debug!("no realtime weather data, using static guidance");
            return Ok(Self::static_guidance(&query.to_lowercase(), crop));
        };

        let Some(summary) = Self::summarize_conditions(&body) else {
            return Ok(Self::static_guidance(&query.to_lowercase(), crop));
        };

        let advice = match &self.model {
            Some(model) => {
                let prompt = format!(
                    "You are an agricultural weather adviser.\n\nQuery: {}\nLocation: {}\nCrop: {}\n{}\n\nGive short, actionable advice for field operations.",
                    query,
                    location,
                    crop.unwrap_or("not specified"),
                    summary
                );
                match model.generate(&prompt).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("weather analysis call failed: {}", e);
                        Self::advisory_for(&summary, crop)
                    }
                }
            }
            None => Self::advisory_for(&summary, crop),
        };

        Ok(SpecialistResult::new("weather", advice, 0.85)
            .with_urgency(Urgency::Medium)
            .with_evidence(vec![
                Evidence::new(format!("weather feed ({})", location), summary).with_geo(location),
            ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_no_feed_url_gives_static_guidance() {
        let specialist = WeatherSpecialist::new(None, Duration::from_secs(10));
        let result = specialist
            .process("will it rain this week", Some("Pune"), None)
            .await
            .unwrap();
        assert!(result.advice.contains("IMD"));
        assert_eq!(result.confidence, 0.5);
        assert!(result.evidence.is_empty());
    }

    #[test]
    fn test_summarize_conditions() {
        let body = json!({
            "current": {
                "temp_c": 31.5,
                "condition": {"text": "Partly cloudy"},
                "humidity": 60,
                "precip_mm": 0.2
            }
        });
        let summary = WeatherSpecialist::summarize_conditions(&body).unwrap();
        assert!(summary.contains("Partly cloudy"));
        assert!(summary.contains("32°C") || summary.contains("31°C"));
    }

    #[test]
    fn test_rainy_summary_warns_against_spraying() {
        let advice = WeatherSpecialist::advisory_for(
            "Current conditions: Light rain, 28°C, humidity 85%, precipitation 4.0mm.",
            Some("cotton"),
        );
        assert!(advice.contains("postpone"));
        assert!(advice.contains("cotton"));
    }
}
