//! Open-Meteo weather client
//!
//! Two lookups back the travel paths: a daily forecast series over the
//! requested range (safety risk analysis) and the current temperature
//! (weather-trend suggestions). The daily series keeps upstream nulls so
//! the risk analyzer can skip exactly the metrics that are missing.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use tracing::debug;

use crate::Result;
use crate::TripSenseError;
use crate::config::WeatherConfig;
use crate::error::ProviderError;
use crate::models::{Coordinates, DateRange};

const PROVIDER: &str = "open-meteo";

/// Metrics requested for the daily series
const DAILY_METRICS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum,precipitation_probability_max,windspeed_10m_max,weathercode";

/// Per-day weather series, aligned by index across all arrays.
///
/// Invariant: all vectors have the same length. A `None` element means the
/// upstream reported null for that day and metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyWeather {
    /// Day each index refers to
    pub dates: Vec<NaiveDate>,
    /// Precipitation sum in mm
    pub precipitation_sum: Vec<Option<f32>>,
    /// Maximum wind speed in km/h
    pub wind_speed_max: Vec<Option<f32>>,
    /// Categorical weather code (WMO table, 95+ is thunderstorm)
    pub weather_code: Vec<Option<u8>>,
}

/// Client for the Open-Meteo forecast API
pub struct WeatherClient {
    http: Client,
    base_url: String,
    timezone: String,
}

impl WeatherClient {
    /// Build a client from configuration
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent("TripSense/0.1.0")
            .build()
            .map_err(|e| {
                TripSenseError::config(format!("Failed to build weather HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timezone: config.timezone.clone(),
        })
    }

    /// Fetch the daily forecast series for the range
    pub async fn daily_forecast(
        &self,
        coords: Coordinates,
        range: &DateRange,
    ) -> std::result::Result<DailyWeather, ProviderError> {
        let url = format!("{}/forecast", self.base_url);
        debug!(
            "Fetching daily forecast for ({}, {}) over {}",
            coords.latitude, coords.longitude, range
        );

        let response = self
            .http
            .get(&url)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("daily", DAILY_METRICS.to_string()),
                ("timezone", self.timezone.clone()),
                ("start_date", range.start.to_string()),
                ("end_date", range.end.to_string()),
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

        let forecast: open_meteo::ForecastResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::decode(PROVIDER, e.to_string()))?;

        let daily = forecast
            .daily
            .ok_or_else(|| ProviderError::decode(PROVIDER, "missing daily series"))?;

        Ok(DailyWeather::from(daily))
    }

    /// Fetch the current temperature in °C
    pub async fn current_temperature(
        &self,
        coords: Coordinates,
    ) -> std::result::Result<f32, ProviderError> {
        let url = format!("{}/forecast", self.base_url);
        debug!(
            "Fetching current temperature for ({}, {})",
            coords.latitude, coords.longitude
        );

        let response = self
            .http
            .get(&url)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("current", "temperature_2m".to_string()),
                ("timezone", "auto".to_string()),
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

        let forecast: open_meteo::ForecastResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::decode(PROVIDER, e.to_string()))?;

        forecast
            .current
            .map(|current| current.temperature)
            .ok_or_else(|| ProviderError::decode(PROVIDER, "missing current conditions"))
    }
}

impl From<open_meteo::DailyData> for DailyWeather {
    fn from(daily: open_meteo::DailyData) -> Self {
        let mut series = DailyWeather::default();

        for (i, raw_date) in daily.time.iter().enumerate() {
            // A day whose date cannot be parsed is dropped from every
            // array so the indexes stay aligned.
            let Ok(date) = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d") else {
                continue;
            };

            series.dates.push(date);
            series
                .precipitation_sum
                .push(value_at(&daily.precipitation, i));
            series.wind_speed_max.push(value_at(&daily.wind_speed_max, i));
            series.weather_code.push(value_at(&daily.weather_code, i));
        }

        series
    }
}

/// Element `index` of an optional parallel array, flattening upstream nulls
fn value_at<T: Copy>(series: &Option<Vec<Option<T>>>, index: usize) -> Option<T> {
    series
        .as_ref()
        .and_then(|values| values.get(index))
        .copied()
        .flatten()
}

/// `OpenMeteo` API response structures
mod open_meteo {
    use serde::Deserialize;

    /// Forecast response; only the series this crate reads are declared
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub daily: Option<DailyData>,
        pub current: Option<CurrentData>,
    }

    /// Daily weather data from `OpenMeteo`
    #[derive(Debug, Deserialize)]
    pub struct DailyData {
        pub time: Vec<String>,
        #[serde(rename = "precipitation_sum")]
        pub precipitation: Option<Vec<Option<f32>>>,
        #[serde(rename = "windspeed_10m_max")]
        pub wind_speed_max: Option<Vec<Option<f32>>>,
        #[serde(rename = "weathercode")]
        pub weather_code: Option<Vec<Option<u8>>>,
    }

    /// Current weather data from `OpenMeteo` (when requested)
    #[derive(Debug, Deserialize)]
    pub struct CurrentData {
        #[serde(rename = "temperature_2m")]
        pub temperature: f32,
    }
}
