//! AI-synthesized disaster and advisory alerts
//!
//! Asks the reasoning model for disaster risks, travel advisories and health
//! notices over the trip window, then maps the JSON into alerts. The model
//! output is never trusted: every field deserializes as optional, records
//! missing their required fields are dropped, and any request or decode
//! failure degrades to a fixed tip set with no alerts and no score change.

use serde::Deserialize;
use tracing::warn;

use crate::error::SynthesisError;
use crate::models::{Alert, AlertKind, DateRange, Severity};
use crate::reasoning::{ChatMessage, ReasoningClient};

const ADVISORY_TEMPERATURE: f32 = 0.3;

const AVOID_PENALTY: i32 = 40;
const CAUTION_PENALTY: i32 = 10;
const HEALTH_PENALTY: i32 = 5;

/// Tips served when the synthesizer is unavailable
const FALLBACK_TIPS: [&str; 3] = [
    "Keep emergency numbers handy",
    "Share itinerary with family",
    "Have travel insurance",
];

const SYSTEM_PROMPT: &str =
    "You are a travel safety expert providing real-time risk assessments.";

/// JSON shape the model is asked to fill in
const RESPONSE_SCHEMA: &str = r#"{
  "disasters": [
    {
      "type": "earthquake/flood/landslide/cyclone/none",
      "severity": "low/medium/high/critical",
      "description": "Brief description",
      "date": "when it occurred or expected",
      "affected_areas": ["area1", "area2"]
    }
  ],
  "travel_advisory": {
    "level": "safe/caution/avoid",
    "reason": "explanation",
    "recommendations": ["tip1", "tip2"]
  },
  "health_alerts": ["any disease outbreaks or health concerns"],
  "general_safety_tips": ["tip1", "tip2", "tip3"]
}"#;

/// Synthesized contribution to the safety assessment
#[derive(Debug)]
pub struct AdvisoryReport {
    pub alerts: Vec<Alert>,
    /// Summed score change, never positive
    pub score_delta: i32,
    pub safety_tips: Vec<String>,
}

impl AdvisoryReport {
    /// Report used when synthesis fails: no alerts, fixed tips
    fn fallback() -> Self {
        Self {
            alerts: Vec::new(),
            score_delta: 0,
            safety_tips: FALLBACK_TIPS.iter().map(|tip| (*tip).to_string()).collect(),
        }
    }
}

/// Synthesize advisory alerts for the destination and window.
///
/// Never fails; a broken or unreachable model yields the fallback report so
/// the weather-only assessment can still go out.
pub async fn synthesize(
    reasoning: &ReasoningClient,
    destination: &str,
    range: &DateRange,
) -> AdvisoryReport {
    match request(reasoning, destination, range).await {
        Ok(payload) => map_payload(payload),
        Err(e) => {
            warn!("Safety synthesis for {destination} failed, using fallback tips: {e}");
            AdvisoryReport::fallback()
        }
    }
}

async fn request(
    reasoning: &ReasoningClient,
    destination: &str,
    range: &DateRange,
) -> std::result::Result<SafetyPayload, SynthesisError> {
    let messages = [
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(advisory_prompt(destination, range)),
    ];

    let raw = reasoning
        .complete_json(&messages, ADVISORY_TEMPERATURE)
        .await?;

    serde_json::from_str(&raw).map_err(|e| SynthesisError::malformed(e.to_string()))
}

fn advisory_prompt(destination: &str, range: &DateRange) -> String {
    format!(
        "Check current natural disaster risks and travel advisories for {destination}, \
         India for dates {range}.\n\n\
         Consider:\n\
         - Recent earthquakes, landslides, floods\n\
         - Cyclone/storm warnings\n\
         - Political unrest or safety concerns\n\
         - Disease outbreaks\n\
         - Road closures\n\n\
         Return JSON:\n\
         {RESPONSE_SCHEMA}\n\n\
         If no major concerns, return empty arrays but include general safety tips."
    )
}

fn map_payload(payload: SafetyPayload) -> AdvisoryReport {
    let mut report = AdvisoryReport {
        alerts: Vec::new(),
        score_delta: 0,
        safety_tips: payload.general_safety_tips,
    };

    for disaster in payload.disasters {
        if let Some(alert) = disaster.into_alert() {
            report.score_delta -= disaster_penalty(alert.severity);
            report.alerts.push(alert);
        }
    }

    if let Some(advisory) = payload.travel_advisory {
        if let Some((alert, penalty)) = advisory.into_alert() {
            report.score_delta -= penalty;
            report.alerts.push(alert);
        }
    }

    for notice in payload.health_alerts {
        report.alerts.push(Alert {
            kind: AlertKind::Health,
            severity: Severity::Medium,
            title: "🏥 Health Advisory".to_string(),
            message: notice,
            action: "Carry necessary medications, get vaccinations if needed.".to_string(),
            date: None,
        });
        report.score_delta -= HEALTH_PENALTY;
    }

    report
}

fn disaster_penalty(severity: Severity) -> i32 {
    match severity {
        Severity::Low => 5,
        Severity::Medium => 15,
        Severity::High => 30,
        Severity::Critical => 50,
    }
}

/// Word-initial capitals, as in "flood" to "Flood"
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Model output envelope; every field may be absent or mistyped
#[derive(Debug, Default, Deserialize)]
struct SafetyPayload {
    #[serde(default)]
    disasters: Vec<DisasterRecord>,
    travel_advisory: Option<AdvisoryRecord>,
    #[serde(default)]
    health_alerts: Vec<String>,
    #[serde(default)]
    general_safety_tips: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DisasterRecord {
    #[serde(rename = "type")]
    kind: Option<String>,
    severity: Option<String>,
    description: Option<String>,
    date: Option<String>,
    #[serde(default)]
    affected_areas: Vec<String>,
}

impl DisasterRecord {
    /// Untyped records and the explicit "none" marker carry no alert
    fn into_alert(self) -> Option<Alert> {
        let kind = self.kind?;
        if kind == "none" {
            return None;
        }

        let severity = Severity::parse_lenient(self.severity.as_deref().unwrap_or_default());
        let areas = if self.affected_areas.is_empty() {
            "Unknown".to_string()
        } else {
            self.affected_areas.join(", ")
        };

        Some(Alert {
            kind: AlertKind::NaturalDisaster,
            severity,
            title: format!("🚨 {} Alert", title_case(&kind)),
            message: self.description.unwrap_or_default(),
            action: format!(
                "Monitor local news, follow evacuation orders if issued. Affected areas: {areas}"
            ),
            date: Some(self.date.unwrap_or_else(|| "Ongoing".to_string())),
        })
    }
}

#[derive(Debug, Deserialize)]
struct AdvisoryRecord {
    level: Option<String>,
    reason: Option<String>,
    recommendations: Option<Vec<String>>,
}

impl AdvisoryRecord {
    /// "safe" and unknown levels carry no alert
    fn into_alert(self) -> Option<(Alert, i32)> {
        match self.level.as_deref() {
            Some("avoid") => Some((
                Alert {
                    kind: AlertKind::TravelAdvisory,
                    severity: Severity::Critical,
                    title: "⛔ Travel Not Recommended".to_string(),
                    message: self
                        .reason
                        .unwrap_or_else(|| "Safety concerns".to_string()),
                    action: "Consider postponing trip or choosing alternative destination."
                        .to_string(),
                    date: None,
                },
                AVOID_PENALTY,
            )),
            Some("caution") => {
                let action = match &self.recommendations {
                    Some(recs) if !recs.is_empty() => recs.join(", "),
                    _ => "Stay alert".to_string(),
                };
                Some((
                    Alert {
                        kind: AlertKind::TravelAdvisory,
                        severity: Severity::Medium,
                        title: "⚠️ Exercise Caution".to_string(),
                        message: self
                            .reason
                            .unwrap_or_else(|| "Minor safety concerns".to_string()),
                        action,
                        date: None,
                    },
                    CAUTION_PENALTY,
                ))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::*;
    use crate::config::ReasoningConfig;

    fn parse(body: &str) -> SafetyPayload {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_none_and_untyped_disasters_are_dropped() {
        let payload = parse(
            r#"{
                "disasters": [
                    {"type": "none", "severity": "low"},
                    {"severity": "critical", "description": "no type field"},
                    {"type": "flood", "severity": "high", "description": "River overflow"}
                ]
            }"#,
        );

        let report = map_payload(payload);

        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].title, "🚨 Flood Alert");
        assert_eq!(report.score_delta, -30);
    }

    #[rstest]
    #[case("low", Severity::Low, -5)]
    #[case("medium", Severity::Medium, -15)]
    #[case("high", Severity::High, -30)]
    #[case("critical", Severity::Critical, -50)]
    #[case("apocalyptic", Severity::Low, -5)]
    fn test_disaster_severity_drives_penalty(
        #[case] severity: &str,
        #[case] expected: Severity,
        #[case] delta: i32,
    ) {
        let body = format!(
            r#"{{"disasters": [{{"type": "cyclone", "severity": "{severity}", "description": "d"}}]}}"#
        );
        let report = map_payload(parse(&body));

        assert_eq!(report.alerts[0].severity, expected);
        assert_eq!(report.score_delta, delta);
    }

    #[test]
    fn test_disaster_alert_fields() {
        let payload = parse(
            r#"{
                "disasters": [{
                    "type": "flood",
                    "severity": "high",
                    "description": "River overflow expected",
                    "date": "2025-07-03",
                    "affected_areas": ["Panjim", "Mapusa"]
                }]
            }"#,
        );

        let report = map_payload(payload);
        let alert = &report.alerts[0];

        assert_eq!(alert.kind, AlertKind::NaturalDisaster);
        assert_eq!(alert.message, "River overflow expected");
        assert!(alert.action.ends_with("Affected areas: Panjim, Mapusa"));
        assert_eq!(alert.date.as_deref(), Some("2025-07-03"));
    }

    #[test]
    fn test_disaster_defaults_for_missing_fields() {
        let payload = parse(r#"{"disasters": [{"type": "landslide"}]}"#);

        let report = map_payload(payload);
        let alert = &report.alerts[0];

        assert_eq!(alert.severity, Severity::Low);
        assert_eq!(alert.title, "🚨 Landslide Alert");
        assert_eq!(alert.message, "");
        assert!(alert.action.ends_with("Affected areas: Unknown"));
        assert_eq!(alert.date.as_deref(), Some("Ongoing"));
    }

    #[test]
    fn test_avoid_advisory_is_critical() {
        let payload = parse(
            r#"{"travel_advisory": {"level": "avoid", "reason": "Active cyclone warning"}}"#,
        );

        let report = map_payload(payload);

        assert_eq!(report.alerts.len(), 1);
        let alert = &report.alerts[0];
        assert_eq!(alert.kind, AlertKind::TravelAdvisory);
        assert_eq!(alert.severity, Severity::Critical);
        assert_eq!(alert.title, "⛔ Travel Not Recommended");
        assert_eq!(alert.message, "Active cyclone warning");
        assert!(alert.date.is_none());
        assert_eq!(report.score_delta, -40);
    }

    #[test]
    fn test_caution_advisory_joins_recommendations() {
        let payload = parse(
            r#"{
                "travel_advisory": {
                    "level": "caution",
                    "reason": "Monsoon season",
                    "recommendations": ["Check road conditions", "Avoid night travel"]
                }
            }"#,
        );

        let report = map_payload(payload);
        let alert = &report.alerts[0];

        assert_eq!(alert.severity, Severity::Medium);
        assert_eq!(alert.action, "Check road conditions, Avoid night travel");
        assert_eq!(report.score_delta, -10);
    }

    #[test]
    fn test_caution_advisory_without_recommendations() {
        let payload = parse(r#"{"travel_advisory": {"level": "caution"}}"#);

        let report = map_payload(payload);
        let alert = &report.alerts[0];

        assert_eq!(alert.message, "Minor safety concerns");
        assert_eq!(alert.action, "Stay alert");
    }

    #[test]
    fn test_safe_advisory_adds_nothing() {
        let payload = parse(
            r#"{"travel_advisory": {"level": "safe", "reason": "All clear"}}"#,
        );

        let report = map_payload(payload);

        assert!(report.alerts.is_empty());
        assert_eq!(report.score_delta, 0);
    }

    #[test]
    fn test_health_alerts_each_cost_five() {
        let payload = parse(
            r#"{"health_alerts": ["Dengue cases rising", "Water contamination reported"]}"#,
        );

        let report = map_payload(payload);

        assert_eq!(report.alerts.len(), 2);
        assert_eq!(report.score_delta, -10);
        for alert in &report.alerts {
            assert_eq!(alert.kind, AlertKind::Health);
            assert_eq!(alert.severity, Severity::Medium);
            assert_eq!(alert.title, "🏥 Health Advisory");
        }
        assert_eq!(report.alerts[0].message, "Dengue cases rising");
    }

    #[test]
    fn test_tips_pass_through_on_success() {
        let payload = parse(r#"{"general_safety_tips": ["Drink bottled water"]}"#);

        let report = map_payload(payload);

        assert_eq!(report.safety_tips, vec!["Drink bottled water".to_string()]);
        assert!(report.alerts.is_empty());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("flood"), "Flood");
        assert_eq!(title_case("flash flood"), "Flash Flood");
        assert_eq!(title_case("CYCLONE"), "Cyclone");
    }

    #[test]
    fn test_prompt_names_destination_and_window() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 8).unwrap(),
        );
        let prompt = advisory_prompt("goa", &range);

        assert!(prompt.contains("for goa, India"));
        assert!(prompt.contains("for dates 2025-07-01 to 2025-07-08"));
        assert!(prompt.contains("\"disasters\""));
    }

    #[tokio::test]
    async fn test_synthesize_without_credentials_falls_back() {
        let config = ReasoningConfig {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            timeout_seconds: 30,
        };
        let reasoning = ReasoningClient::new(&config).unwrap();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 8).unwrap(),
        );

        let report = synthesize(&reasoning, "goa", &range).await;

        assert!(report.alerts.is_empty());
        assert_eq!(report.score_delta, 0);
        assert_eq!(report.safety_tips.len(), 3);
        assert_eq!(report.safety_tips[0], "Keep emergency numbers handy");
    }
}
