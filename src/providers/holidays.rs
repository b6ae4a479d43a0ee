//! Holiday adapter (Calendarific API)
//!
//! Calendarific can only filter by calendar year, so the adapter fetches
//! the year of the range start and applies the inclusive date-range filter
//! itself. Entries whose date cannot be parsed are skipped.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::Result;
use crate::TripSenseError;
use crate::config::HolidayProviderConfig;
use crate::error::ProviderError;
use crate::models::{Event, EventQuery, EventSource};
use crate::providers::EventProvider;

const PROVIDER: &str = "calendarific";

/// Adapter for the Calendarific holidays API
pub struct HolidayProvider {
    http: Client,
    api_key: Option<String>,
    base_url: String,
    categories: String,
}

impl HolidayProvider {
    /// Build the adapter from configuration
    pub fn new(config: &HolidayProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent("TripSense/0.1.0")
            .build()
            .map_err(|e| {
                TripSenseError::config(format!("Failed to build holiday HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            categories: config.categories.clone(),
        })
    }
}

#[async_trait]
impl EventProvider for HolidayProvider {
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

        let url = format!("{}/holidays", self.base_url);
        debug!(
            "Fetching {} holidays for {} in {}",
            self.categories,
            query.country_code,
            query.range.start_year()
        );

        let response = self
            .http
            .get(&url)
            .query(&[
                ("api_key", api_key.as_str()),
                ("country", query.country_code.as_str()),
                ("year", &query.range.start_year().to_string()),
                ("type", self.categories.as_str()),
            ])
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

        let payload: CalendarificResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::decode(PROVIDER, e.to_string()))?;

        let events: Vec<Event> = payload
            .response
            .map(|body| body.holidays)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|holiday| holiday.into_event(query))
            .filter(|event| query.range.contains(event.date))
            .collect();

        debug!("Holiday adapter produced {} events", events.len());
        Ok(events)
    }
}

/// Calendarific response envelope
#[derive(Debug, Deserialize)]
struct CalendarificResponse {
    response: Option<HolidaysBody>,
}

#[derive(Debug, Deserialize)]
struct HolidaysBody {
    #[serde(default)]
    holidays: Vec<HolidayEntry>,
}

#[derive(Debug, Deserialize)]
struct HolidayEntry {
    name: Option<String>,
    description: Option<String>,
    date: Option<HolidayDate>,
}

#[derive(Debug, Deserialize)]
struct HolidayDate {
    iso: Option<String>,
}

impl HolidayEntry {
    /// Convert to the normalized event shape.
    ///
    /// The `iso` field sometimes carries a trailing time component; only
    /// the date portion is parsed. Entries without a parseable date are
    /// dropped.
    fn into_event(self, query: &EventQuery) -> Option<Event> {
        let iso = self.date.and_then(|d| d.iso)?;
        let date = NaiveDate::parse_from_str(iso.get(..10)?, "%Y-%m-%d").ok()?;

        Some(Event {
            name: self.name.unwrap_or_default(),
            category: "Religious Festival".to_string(),
            date,
            time: "All Day".to_string(),
            venue: "Various Locations".to_string(),
            location: format!("{}, {}", query.city, query.country_code),
            source: EventSource::Holiday,
            ticket_url: None,
            image: None,
            price_range: None,
            description: self.description,
            weather: None,
        })
    }
}
