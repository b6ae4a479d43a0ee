//! Weather-aware trending spots
//!
//! Synthesizes trending outdoor spots for the destination from the current
//! temperature there. Unlike the API-backed adapters this provider composes
//! three upstreams (geocoding, weather, reasoning); a failure in any of them
//! fails the whole provider, which the aggregator absorbs like any other
//! provider failure.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::location::LocationResolver;
use crate::models::{Event, EventQuery, EventSource};
use crate::providers::EventProvider;
use crate::reasoning::{ChatMessage, ReasoningClient};
use crate::weather::WeatherClient;

const PROVIDER: &str = "trending";

/// Spots beyond this count are discarded even if the model returns more.
const MAX_SPOTS: usize = 3;

const SPOTS_TEMPERATURE: f32 = 0.7;

/// Provider deriving trending-spot events from live weather
pub struct TrendingSpotsProvider {
    resolver: Arc<dyn LocationResolver>,
    weather: Arc<WeatherClient>,
    reasoning: Arc<ReasoningClient>,
}

impl TrendingSpotsProvider {
    pub fn new(
        resolver: Arc<dyn LocationResolver>,
        weather: Arc<WeatherClient>,
        reasoning: Arc<ReasoningClient>,
    ) -> Self {
        Self {
            resolver,
            weather,
            reasoning,
        }
    }

    fn spots_prompt(city: &str, temperature: f32) -> String {
        format!(
            "Based on current weather in {city} ({temperature}°C), suggest 3 trending \
             outdoor spots that would be popular right now.\n\
             Return a JSON object:\n\
             {{\"spots\": [{{\"name\": \"Nandi Hills\", \"type\": \"Trending Spot\", \
             \"reason\": \"Cool weather perfect for sunrise trek\", \
             \"best_time\": \"Early morning\"}}]}}"
        )
    }
}

#[async_trait]
impl EventProvider for TrendingSpotsProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(
        &self,
        query: &EventQuery,
    ) -> std::result::Result<Vec<Event>, ProviderError> {
        let coords = self
            .resolver
            .resolve(&query.city)
            .await
            .map_err(|e| ProviderError::upstream(PROVIDER, e.to_string()))?;

        let temperature = self.weather.current_temperature(coords).await?;
        debug!("Current temperature in {}: {}°C", query.city, temperature);

        let prompt = Self::spots_prompt(&query.city, temperature);
        let raw = self
            .reasoning
            .complete_json(&[ChatMessage::user(prompt)], SPOTS_TEMPERATURE)
            .await
            .map_err(|e| ProviderError::upstream(PROVIDER, e.to_string()))?;

        let payload: SpotsPayload = serde_json::from_str(&raw)
            .map_err(|e| ProviderError::decode(PROVIDER, e.to_string()))?;

        let events: Vec<Event> = payload
            .spots
            .into_iter()
            .filter_map(|spot| spot.into_event(query, temperature))
            .take(MAX_SPOTS)
            .collect();

        debug!("Trending adapter produced {} events", events.len());
        Ok(events)
    }
}

/// Model output envelope; every field may be absent or mistyped
#[derive(Debug, Deserialize)]
struct SpotsPayload {
    #[serde(default)]
    spots: Vec<Spot>,
}

#[derive(Debug, Deserialize)]
struct Spot {
    name: Option<String>,
    reason: Option<String>,
    best_time: Option<String>,
}

impl Spot {
    /// Convert to the normalized event shape; spots without a name are dropped
    fn into_event(self, query: &EventQuery, temperature: f32) -> Option<Event> {
        let name = self.name?;
        Some(Event {
            name: name.clone(),
            category: "Trending Location".to_string(),
            date: query.range.start,
            time: self.best_time.unwrap_or_else(|| "Flexible".to_string()),
            venue: name,
            location: query.city.clone(),
            source: EventSource::WeatherTrend,
            ticket_url: None,
            image: None,
            price_range: None,
            description: self.reason,
            weather: Some(format!("{temperature}°C")),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::DateRange;

    fn create_test_query() -> EventQuery {
        EventQuery {
            city: "bangalore".to_string(),
            country_code: "IN".to_string(),
            range: DateRange::new(
                NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 7, 8).unwrap(),
            ),
            category: None,
        }
    }

    #[test]
    fn test_spot_maps_to_event() {
        let body = r#"{
            "spots": [
                {"name": "Nandi Hills", "type": "Trending Spot", "reason": "Cool sunrise trek", "best_time": "Early morning"}
            ]
        }"#;
        let payload: SpotsPayload = serde_json::from_str(body).unwrap();
        let query = create_test_query();

        let event = payload
            .spots
            .into_iter()
            .filter_map(|spot| spot.into_event(&query, 21.5))
            .next()
            .unwrap();

        assert_eq!(event.name, "Nandi Hills");
        assert_eq!(event.category, "Trending Location");
        assert_eq!(event.date, query.range.start);
        assert_eq!(event.time, "Early morning");
        assert_eq!(event.venue, "Nandi Hills");
        assert_eq!(event.location, "bangalore");
        assert_eq!(event.source, EventSource::WeatherTrend);
        assert_eq!(event.description.as_deref(), Some("Cool sunrise trek"));
        assert_eq!(event.weather.as_deref(), Some("21.5°C"));
    }

    #[test]
    fn test_unnamed_spots_are_skipped() {
        let body = r#"{
            "spots": [
                {"reason": "No name here"},
                {"name": "Cubbon Park"}
            ]
        }"#;
        let payload: SpotsPayload = serde_json::from_str(body).unwrap();
        let query = create_test_query();

        let events: Vec<Event> = payload
            .spots
            .into_iter()
            .filter_map(|spot| spot.into_event(&query, 24.0))
            .collect();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Cubbon Park");
        assert_eq!(events[0].time, "Flexible");
        assert!(events[0].description.is_none());
    }

    #[test]
    fn test_spot_count_is_capped() {
        let body = r#"{
            "spots": [
                {"name": "A"}, {"name": "B"}, {"name": "C"}, {"name": "D"}, {"name": "E"}
            ]
        }"#;
        let payload: SpotsPayload = serde_json::from_str(body).unwrap();
        let query = create_test_query();

        let events: Vec<Event> = payload
            .spots
            .into_iter()
            .filter_map(|spot| spot.into_event(&query, 24.0))
            .take(MAX_SPOTS)
            .collect();

        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_missing_spots_key_is_empty() {
        let payload: SpotsPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.spots.is_empty());
    }

    #[test]
    fn test_prompt_mentions_city_and_temperature() {
        let prompt = TrendingSpotsProvider::spots_prompt("goa", 29.0);
        assert!(prompt.contains("goa"));
        assert!(prompt.contains("29°C"));
    }
}
