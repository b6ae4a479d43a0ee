//! Safety assessment pipeline
//!
//! Three stages feed one assessment: threshold checks over the daily
//! forecast, AI-synthesized disaster and advisory alerts, and the scorer
//! that merges both into a banded 0-100 score.

pub mod advisory;
pub mod scorer;
pub mod weather_risk;

pub use scorer::SafetyService;
