//! Location resolution
//!
//! Maps a destination city name to coordinates for the weather-backed
//! paths. The resolver is a trait so a geocoding-backed implementation can
//! replace the shipped static table without touching call sites.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::models::Coordinates;
use crate::{Result, TripSenseError};

/// Service resolving destination names to coordinates
#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// Resolve `city` to coordinates.
    ///
    /// Unknown destinations fail with [`TripSenseError::LocationNotFound`];
    /// implementations must not silently substitute another place.
    async fn resolve(&self, city: &str) -> Result<Coordinates>;
}

/// Resolver backed by a fixed city table.
///
/// Lookup is case-insensitive and ignores surrounding whitespace. An
/// optional fallback city can be configured for unknown destinations; by
/// default they are rejected.
pub struct StaticLocationResolver {
    cities: HashMap<String, Coordinates>,
    fallback: Option<String>,
}

impl StaticLocationResolver {
    /// Resolver preloaded with the supported destination cities
    #[must_use]
    pub fn with_default_cities() -> Self {
        let mut cities = HashMap::new();
        cities.insert("mumbai".to_string(), Coordinates::new(19.0760, 72.8777));
        cities.insert("delhi".to_string(), Coordinates::new(28.6139, 77.2090));
        cities.insert("bangalore".to_string(), Coordinates::new(12.9716, 77.5946));
        cities.insert("goa".to_string(), Coordinates::new(15.2993, 74.1240));
        cities.insert("jaipur".to_string(), Coordinates::new(26.9124, 75.7873));
        cities.insert("kerala".to_string(), Coordinates::new(10.8505, 76.2711));
        cities.insert("manali".to_string(), Coordinates::new(32.2432, 77.1892));
        cities.insert("shimla".to_string(), Coordinates::new(31.1048, 77.1734));

        Self {
            cities,
            fallback: None,
        }
    }

    /// Use `city` for destinations the table does not know
    #[must_use]
    pub fn with_fallback_city<S: Into<String>>(mut self, city: S) -> Self {
        self.fallback = Some(city.into());
        self
    }

    fn lookup(&self, city: &str) -> Option<Coordinates> {
        self.cities
            .get(city.trim().to_lowercase().as_str())
            .copied()
    }
}

#[async_trait]
impl LocationResolver for StaticLocationResolver {
    async fn resolve(&self, city: &str) -> Result<Coordinates> {
        if let Some(coords) = self.lookup(city) {
            debug!(
                "Resolved '{}' to ({}, {})",
                city, coords.latitude, coords.longitude
            );
            return Ok(coords);
        }

        if let Some(fallback) = &self.fallback {
            if let Some(coords) = self.lookup(fallback) {
                debug!("Unknown city '{}', falling back to '{}'", city, fallback);
                return Ok(coords);
            }
        }

        Err(TripSenseError::location_not_found(city))
    }
}
