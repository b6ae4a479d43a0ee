//! `TripSense` - travel intelligence for events, safety, and trip planning
//!
//! This library aggregates ticketed events, public holidays, and trending
//! spots into a single feed, scores destination safety from weather and
//! advisory signals, and drives a conversational travel assistant.

pub mod aggregator;
pub mod api;
pub mod assistant;
pub mod config;
pub mod error;
pub mod history;
pub mod location;
pub mod models;
pub mod providers;
pub mod reasoning;
pub mod safety;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use aggregator::{EventAggregator, EventsFeed};
pub use assistant::{ChatInput, ItineraryPlan, ItineraryRequest, TravelAssistant};
pub use config::TripSenseConfig;
pub use error::{ProviderError, SynthesisError, TripSenseError};
pub use history::{MemoryHistoryStore, SearchHistoryStore};
pub use location::{LocationResolver, StaticLocationResolver};
pub use models::{Alert, Event, EventQuery, SafetyAssessment, Severity};
pub use safety::SafetyService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripSenseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
