//! Data models for travel signals and safety assessment
//!
//! This module contains the normalized record shapes shared by the event
//! aggregation and safety paths, plus the small request-scoped value types
//! (date ranges, coordinates) used throughout the crate.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Which adapter produced an event
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// Ticketed events from the discovery API
    Ticketed,
    /// Public holidays and festivals
    Holiday,
    /// Reasoning-service suggestions tagged with current weather
    WeatherTrend,
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventSource::Ticketed => "ticketed",
            EventSource::Holiday => "holiday",
            EventSource::WeatherTrend => "weather_trend",
        };
        write!(f, "{label}")
    }
}

/// Price range attached to a ticketed event, when the upstream reports one
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PriceRange {
    /// ISO currency code
    pub currency: Option<String>,
    /// Minimum ticket price
    pub min: Option<f64>,
    /// Maximum ticket price
    pub max: Option<f64>,
}

/// One normalized entry in the events feed
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Event {
    /// Event name as reported upstream
    pub name: String,
    /// Category label ("Music", "Religious Festival", "Trending Location", ...)
    #[serde(rename = "type")]
    pub category: String,
    /// Event date; the sentinel from [`Event::missing_date`] when unknown
    pub date: NaiveDate,
    /// Start time as reported, "TBA" when the upstream omits it
    pub time: String,
    /// Venue name
    pub venue: String,
    /// Human-readable place ("city, address" or "city, country")
    pub location: String,
    /// Which adapter contributed this event
    pub source: EventSource,
    /// Link to buy tickets, ticketed events only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
    /// Promotional image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Ticket price range, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
    /// Free-text description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current-weather tag on trending suggestions ("24°C")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
}

impl Event {
    /// Sentinel date for events whose upstream reports none.
    ///
    /// Sorts after every real date so undated entries land at the end of
    /// the feed.
    #[must_use]
    pub fn missing_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
    }
}

/// Category of a safety alert
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Dangerous weather (heavy rain, strong wind, thunderstorm)
    SevereWeather,
    /// Inconvenient but not dangerous weather
    Weather,
    /// Earthquake, flood, cyclone and similar
    NaturalDisaster,
    /// Government-style travel advisory
    TravelAdvisory,
    /// Disease outbreaks and other health notices
    Health,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlertKind::SevereWeather => "severe_weather",
            AlertKind::Weather => "weather",
            AlertKind::NaturalDisaster => "natural_disaster",
            AlertKind::TravelAdvisory => "travel_advisory",
            AlertKind::Health => "health",
        };
        write!(f, "{label}")
    }
}

/// Risk tier of a safety alert.
///
/// Declaration order is the severity order: `Critical` sorts before `High`
/// before `Medium` before `Low`, so an ascending sort puts the most severe
/// alerts first.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Fixed rank used for ordering: critical(0) < high(1) < medium(2) < low(3)
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
        }
    }

    /// Lenient parse for upstream severity strings.
    ///
    /// Unknown or empty values map to `Low`; the closed enum keeps ordering
    /// decisions away from raw strings.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        };
        write!(f, "{label}")
    }
}

/// One entry in the safety alert list
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Alert {
    /// Alert category
    #[serde(rename = "type")]
    pub kind: AlertKind,
    /// Risk tier driving the sort order
    pub severity: Severity,
    /// Short headline shown to the traveler
    pub title: String,
    /// What is happening
    pub message: String,
    /// What the traveler should do about it
    pub action: String,
    /// When it occurs; an ISO day for weather alerts, free text ("Ongoing")
    /// for disasters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Tiered rating derived from the safety score
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SafetyRating {
    Safe,
    Caution,
    Risk,
}

impl SafetyRating {
    /// Band the clamped 0-100 score into a rating
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            SafetyRating::Safe
        } else if score >= 60 {
            SafetyRating::Caution
        } else {
            SafetyRating::Risk
        }
    }
}

impl fmt::Display for SafetyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SafetyRating::Safe => "Safe",
            SafetyRating::Caution => "Caution",
            SafetyRating::Risk => "Risk",
        };
        write!(f, "{label}")
    }
}

/// Exact per-severity tally over a final alert list
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl AlertCounts {
    /// Count alerts per severity bucket
    #[must_use]
    pub fn tally(alerts: &[Alert]) -> Self {
        let mut counts = AlertCounts::default();
        for alert in alerts {
            match alert.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
        }
        counts
    }

    /// Total number of alerts across all buckets
    #[must_use]
    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Safety verdict for a destination and date range.
///
/// Computed fresh per request from a score baseline of 100; never cached
/// or persisted.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SafetyAssessment {
    /// Severity-weighted score, clamped to 0..=100; higher is safer
    pub score: u8,
    /// Tier derived from the score
    pub rating: SafetyRating,
    /// All alerts, sorted most severe first (stable within a tier)
    pub alerts: Vec<Alert>,
    /// Per-severity tally over `alerts`
    pub alert_count: AlertCounts,
    /// One of three fixed advice strings banded on the score
    pub advice: String,
    /// General tips from the synthesizer, or the fallback set
    pub safety_tips: Vec<String>,
}

/// Inclusive date range shared by both request paths
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `date` falls within the range, bounds included
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Calendar year of the range start, for providers that filter by year
    #[must_use]
    pub fn start_year(&self) -> i32 {
        self.start.year()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Geographic coordinates produced by the location resolver
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Parameters of one events-feed request
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    /// Destination city as supplied by the caller
    pub city: String,
    /// ISO 3166-1 alpha-2 country code
    pub country_code: String,
    /// Inclusive travel window
    pub range: DateRange,
    /// Optional category filter; `None` or "all" means no filter
    pub category: Option<String>,
}

impl EventQuery {
    /// Category filter to forward upstream, with "all" mapped to no filter
    #[must_use]
    pub fn category_filter(&self) -> Option<&str> {
        match self.category.as_deref() {
            None => None,
            Some(c) if c.eq_ignore_ascii_case("all") => None,
            Some(c) => Some(c),
        }
    }
}
