//! Ticketed-events adapter (Ticketmaster Discovery API)
//!
//! Queries the Discovery `events.json` endpoint by city and date window and
//! normalizes the heavily nested payload. Every nested level may be absent
//! upstream; absence maps to defaults, never to a failed decode.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::Result;
use crate::TripSenseError;
use crate::config::TicketedProviderConfig;
use crate::error::ProviderError;
use crate::models::{Event, EventQuery, EventSource, PriceRange};
use crate::providers::EventProvider;

const PROVIDER: &str = "ticketmaster";

/// Adapter for the Ticketmaster Discovery API
pub struct TicketedEventsProvider {
    http: Client,
    api_key: Option<String>,
    base_url: String,
    page_size: u32,
}

impl TicketedEventsProvider {
    /// Build the adapter from configuration
    pub fn new(config: &TicketedProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent("TripSense/0.1.0")
            .build()
            .map_err(|e| {
                TripSenseError::config(format!("Failed to build ticketed HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
        })
    }
}

#[async_trait]
impl EventProvider for TicketedEventsProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(
        &self,
        query: &EventQuery,
    ) -> std::result::Result<Vec<Event>, ProviderError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(ProviderError::Credentials { provider: PROVIDER })?;

        let url = format!("{}/events.json", self.base_url);
        let mut params = vec![
            ("apikey", api_key.clone()),
            ("city", query.city.clone()),
            ("countryCode", query.country_code.clone()),
            ("startDateTime", format!("{}T00:00:00Z", query.range.start)),
            ("endDateTime", format!("{}T23:59:59Z", query.range.end)),
            ("size", self.page_size.to_string()),
        ];
        if let Some(category) = query.category_filter() {
            params.push(("classificationName", category.to_string()));
        }

        debug!("Fetching ticketed events for {} ({})", query.city, query.range);

        let response = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|source| ProviderError::Request {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status,
            });
        }

        let payload: DiscoveryResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::decode(PROVIDER, e.to_string()))?;

        let events: Vec<Event> = payload
            .embedded
            .map(|embedded| embedded.events)
            .unwrap_or_default()
            .into_iter()
            .map(DiscoveryEvent::into_event)
            .collect();

        debug!("Ticketed adapter produced {} events", events.len());
        Ok(events)
    }
}

/// Discovery API response envelope
#[derive(Debug, Deserialize)]
struct DiscoveryResponse {
    #[serde(rename = "_embedded")]
    embedded: Option<EmbeddedEvents>,
}

#[derive(Debug, Deserialize)]
struct EmbeddedEvents {
    #[serde(default)]
    events: Vec<DiscoveryEvent>,
}

#[derive(Debug, Deserialize)]
struct DiscoveryEvent {
    name: Option<String>,
    url: Option<String>,
    #[serde(default)]
    images: Vec<EventImage>,
    #[serde(rename = "priceRanges", default)]
    price_ranges: Vec<PriceRange>,
    #[serde(default)]
    classifications: Vec<Classification>,
    dates: Option<EventDates>,
    #[serde(rename = "_embedded")]
    embedded: Option<EventVenues>,
}

#[derive(Debug, Deserialize)]
struct EventImage {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Classification {
    segment: Option<Segment>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventDates {
    start: Option<EventStart>,
}

#[derive(Debug, Deserialize)]
struct EventStart {
    #[serde(rename = "localDate")]
    local_date: Option<String>,
    #[serde(rename = "localTime")]
    local_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventVenues {
    #[serde(default)]
    venues: Vec<Venue>,
}

#[derive(Debug, Deserialize)]
struct Venue {
    name: Option<String>,
    city: Option<VenueCity>,
    address: Option<VenueAddress>,
}

#[derive(Debug, Deserialize)]
struct VenueCity {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VenueAddress {
    line1: Option<String>,
}

impl DiscoveryEvent {
    /// Convert to the normalized event shape
    fn into_event(self) -> Event {
        let category = self
            .classifications
            .first()
            .and_then(|c| c.segment.as_ref())
            .and_then(|s| s.name.clone())
            .unwrap_or_else(|| "Event".to_string());

        let start = self.dates.and_then(|d| d.start);
        let date = start
            .as_ref()
            .and_then(|s| s.local_date.as_deref())
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
            .unwrap_or_else(Event::missing_date);
        let time = start
            .and_then(|s| s.local_time)
            .unwrap_or_else(|| "TBA".to_string());

        let venue = self.embedded.and_then(|e| e.venues.into_iter().next());
        let venue_city = venue
            .as_ref()
            .and_then(|v| v.city.as_ref())
            .and_then(|c| c.name.clone())
            .unwrap_or_default();
        let venue_address = venue
            .as_ref()
            .and_then(|v| v.address.as_ref())
            .and_then(|a| a.line1.clone())
            .unwrap_or_default();

        Event {
            name: self.name.unwrap_or_default(),
            category,
            date,
            time,
            venue: venue.and_then(|v| v.name).unwrap_or_default(),
            location: format!("{venue_city}, {venue_address}"),
            source: EventSource::Ticketed,
            ticket_url: self.url,
            image: self.images.into_iter().next().and_then(|i| i.url),
            price_range: self.price_ranges.into_iter().next(),
            description: None,
            weather: None,
        }
    }
}
