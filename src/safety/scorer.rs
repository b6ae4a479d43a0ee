//! Safety scoring and assessment assembly
//!
//! Starts every trip at the baseline score, applies the weather and advisory
//! deltas, then bands, sorts and tallies. The weather and advisory lookups
//! run concurrently; either may drop out without failing the assessment, but
//! an unresolvable destination is a hard error.

use std::sync::Arc;

use tracing::warn;

use crate::Result;
use crate::location::LocationResolver;
use crate::models::{AlertCounts, DateRange, SafetyAssessment, SafetyRating};
use crate::reasoning::ReasoningClient;
use crate::safety::advisory::{self, AdvisoryReport};
use crate::safety::weather_risk::{self, WeatherRiskReport};
use crate::weather::WeatherClient;

/// Every assessment starts here and only loses points
const BASELINE_SCORE: i32 = 100;

/// Builds safety assessments for a destination and date range
#[derive(Clone)]
pub struct SafetyService {
    resolver: Arc<dyn LocationResolver>,
    weather: Arc<WeatherClient>,
    reasoning: Arc<ReasoningClient>,
}

impl SafetyService {
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

    /// Assess travel safety for `destination` over `range`.
    ///
    /// Fails only when the destination cannot be resolved. A weather lookup
    /// failure skips the weather alerts; a synthesis failure is absorbed by
    /// the advisory fallback. Both gone still yields the baseline score.
    pub async fn assess(
        &self,
        destination: &str,
        range: &DateRange,
    ) -> Result<SafetyAssessment> {
        let coords = self.resolver.resolve(destination).await?;

        let (forecast, advisory) = tokio::join!(
            self.weather.daily_forecast(coords, range),
            advisory::synthesize(&self.reasoning, destination, range),
        );

        let weather_report = match forecast {
            Ok(series) => weather_risk::analyze(&series),
            Err(e) => {
                warn!("Weather lookup for {destination} failed, skipping weather alerts: {e}");
                WeatherRiskReport::default()
            }
        };

        Ok(compose_assessment(weather_report, advisory))
    }
}

/// Merge the two reports into the final assessment.
///
/// Alerts sort most severe first; the sort is stable, so alerts of equal
/// severity keep their source order (weather before advisory).
fn compose_assessment(
    weather: WeatherRiskReport,
    advisory: AdvisoryReport,
) -> SafetyAssessment {
    let mut alerts = weather.alerts;
    alerts.extend(advisory.alerts);
    alerts.sort_by_key(|alert| alert.severity.rank());

    let raw = BASELINE_SCORE + weather.score_delta + advisory.score_delta;
    let score = raw.clamp(0, 100) as u8;

    SafetyAssessment {
        score,
        rating: SafetyRating::from_score(score),
        alert_count: AlertCounts::tally(&alerts),
        advice: advice_for(score).to_string(),
        safety_tips: advisory.safety_tips,
        alerts,
    }
}

/// Fixed advice string banded on the clamped score
fn advice_for(score: u8) -> &'static str {
    if score < 50 {
        "⚠️ Current conditions are not ideal. Consider rescheduling your trip."
    } else if score < 70 {
        "⚡ Weather conditions may affect your plans. Stay flexible and monitor updates."
    } else {
        "✅ Conditions look good for travel! Have a safe trip."
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::*;
    use crate::TripSenseError;
    use crate::config::{ReasoningConfig, WeatherConfig};
    use crate::location::StaticLocationResolver;
    use crate::models::{Alert, AlertKind, Severity};

    fn create_test_alert(severity: Severity, title: &str) -> Alert {
        Alert {
            kind: AlertKind::SevereWeather,
            severity,
            title: title.to_string(),
            message: String::new(),
            action: String::new(),
            date: None,
        }
    }

    fn create_test_range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 8).unwrap(),
        )
    }

    fn create_advisory(alerts: Vec<Alert>, score_delta: i32) -> AdvisoryReport {
        AdvisoryReport {
            alerts,
            score_delta,
            safety_tips: vec!["tip".to_string()],
        }
    }

    #[test]
    fn test_compose_single_weather_alert() {
        let weather = WeatherRiskReport {
            alerts: vec![create_test_alert(Severity::High, "⛈️ Heavy Rain Warning")],
            score_delta: -15,
        };

        let assessment = compose_assessment(weather, create_advisory(vec![], 0));

        assert_eq!(assessment.score, 85);
        assert_eq!(assessment.rating, SafetyRating::Safe);
        assert_eq!(assessment.alerts.len(), 1);
        assert_eq!(assessment.alert_count.high, 1);
        assert!(assessment.advice.starts_with('✅'));
    }

    #[test]
    fn test_compose_sorts_most_severe_first() {
        let weather = WeatherRiskReport {
            alerts: vec![
                create_test_alert(Severity::High, "⛈️ Heavy Rain Warning"),
                create_test_alert(Severity::High, "💨 Strong Wind Warning"),
                create_test_alert(Severity::Critical, "⚡ Thunderstorm Alert"),
            ],
            score_delta: -45,
        };

        let assessment = compose_assessment(weather, create_advisory(vec![], 0));

        assert_eq!(assessment.score, 55);
        assert_eq!(assessment.rating, SafetyRating::Risk);
        let titles: Vec<&str> = assessment
            .alerts
            .iter()
            .map(|a| a.title.as_str())
            .collect();
        // Stable sort keeps rain before wind within the high tier
        assert_eq!(
            titles,
            vec![
                "⚡ Thunderstorm Alert",
                "⛈️ Heavy Rain Warning",
                "💨 Strong Wind Warning"
            ]
        );
    }

    #[test]
    fn test_compose_interleaves_sources_by_severity() {
        let weather = WeatherRiskReport {
            alerts: vec![create_test_alert(Severity::Medium, "🌧️ Rainy Day")],
            score_delta: -5,
        };
        let advisory = create_advisory(
            vec![
                create_test_alert(Severity::Critical, "⛔ Travel Not Recommended"),
                create_test_alert(Severity::Medium, "🏥 Health Advisory"),
            ],
            -45,
        );

        let assessment = compose_assessment(weather, advisory);

        let titles: Vec<&str> = assessment
            .alerts
            .iter()
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(
            titles,
            vec![
                "⛔ Travel Not Recommended",
                "🌧️ Rainy Day",
                "🏥 Health Advisory"
            ]
        );
        assert_eq!(assessment.alert_count.critical, 1);
        assert_eq!(assessment.alert_count.medium, 2);
        assert_eq!(assessment.alert_count.total(), 3);
    }

    #[test]
    fn test_score_clamps_at_zero() {
        let weather = WeatherRiskReport {
            alerts: vec![],
            score_delta: -80,
        };

        let assessment = compose_assessment(weather, create_advisory(vec![], -50));

        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.rating, SafetyRating::Risk);
        assert!(assessment.advice.starts_with('⚠'));
    }

    #[rstest]
    #[case(0, '⚠')]
    #[case(49, '⚠')]
    #[case(50, '⚡')]
    #[case(69, '⚡')]
    #[case(70, '✅')]
    #[case(100, '✅')]
    fn test_advice_bands(#[case] score: u8, #[case] leading: char) {
        assert!(advice_for(score).starts_with(leading));
    }

    #[test]
    fn test_tips_come_from_the_advisory() {
        let assessment = compose_assessment(
            WeatherRiskReport::default(),
            create_advisory(vec![], 0),
        );

        assert_eq!(assessment.score, 100);
        assert_eq!(assessment.safety_tips, vec!["tip".to_string()]);
    }

    fn create_test_service(weather_base_url: &str) -> SafetyService {
        let weather_config = WeatherConfig {
            base_url: weather_base_url.to_string(),
            timeout_seconds: 10,
            timezone: "Asia/Kolkata".to_string(),
        };
        let reasoning_config = ReasoningConfig {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            timeout_seconds: 30,
        };

        SafetyService::new(
            Arc::new(StaticLocationResolver::with_default_cities()),
            Arc::new(WeatherClient::new(&weather_config).unwrap()),
            Arc::new(ReasoningClient::new(&reasoning_config).unwrap()),
        )
    }

    #[tokio::test]
    async fn test_assess_unknown_destination_is_a_hard_error() {
        let service = create_test_service("https://api.open-meteo.com/v1");

        let result = service.assess("atlantis", &create_test_range()).await;

        assert!(matches!(
            result,
            Err(TripSenseError::LocationNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_assess_degrades_to_baseline_when_everything_fails() {
        // Unparseable weather URL and a keyless reasoning client fail both
        // lookups before any request leaves the process.
        let service = create_test_service("not a base url");

        let assessment = service
            .assess("goa", &create_test_range())
            .await
            .unwrap();

        assert_eq!(assessment.score, 100);
        assert_eq!(assessment.rating, SafetyRating::Safe);
        assert!(assessment.alerts.is_empty());
        assert_eq!(assessment.safety_tips.len(), 3);
    }
}
