//! End-to-end tests over the public crate API: provider fan-out into the
//! events feed, safety assessment degradation, and assistant error paths.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use tripsense::aggregator::EventAggregator;
use tripsense::assistant::{ChatInput, TravelAssistant, UserProfile};
use tripsense::config::{ReasoningConfig, WeatherConfig};
use tripsense::error::{ProviderError, SynthesisError, TripSenseError};
use tripsense::history::{MemoryHistoryStore, SearchHistoryStore};
use tripsense::location::StaticLocationResolver;
use tripsense::models::{DateRange, Event, EventQuery, EventSource, SafetyRating};
use tripsense::providers::EventProvider;
use tripsense::reasoning::ReasoningClient;
use tripsense::safety::SafetyService;
use tripsense::weather::WeatherClient;

struct StubProvider {
    name: &'static str,
    events: Vec<Event>,
    fail: bool,
}

#[async_trait]
impl EventProvider for StubProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, _query: &EventQuery) -> Result<Vec<Event>, ProviderError> {
        if self.fail {
            Err(ProviderError::upstream(self.name, "stub failure"))
        } else {
            Ok(self.events.clone())
        }
    }
}

fn create_test_event(name: &str, date: NaiveDate, source: EventSource) -> Event {
    Event {
        name: name.to_string(),
        category: "Music".to_string(),
        date,
        time: "19:00".to_string(),
        venue: "Test Venue".to_string(),
        location: "goa".to_string(),
        source,
        ticket_url: None,
        image: None,
        price_range: None,
        description: None,
        weather: None,
    }
}

fn create_test_query() -> EventQuery {
    EventQuery {
        city: "goa".to_string(),
        country_code: "IN".to_string(),
        range: DateRange::new(
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 8).unwrap(),
        ),
        category: None,
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
}

/// Weather client pointed at an unparseable URL and a keyless reasoning
/// client. Every upstream call fails before a request leaves the process.
fn create_dead_upstreams() -> (Arc<WeatherClient>, Arc<ReasoningClient>) {
    let weather_config = WeatherConfig {
        base_url: "not a base url".to_string(),
        timeout_seconds: 10,
        timezone: "Asia/Kolkata".to_string(),
    };
    let reasoning_config = ReasoningConfig {
        api_key: None,
        base_url: "https://api.groq.com/openai/v1".to_string(),
        model: "llama-3.3-70b-versatile".to_string(),
        timeout_seconds: 30,
    };
    (
        Arc::new(WeatherClient::new(&weather_config).unwrap()),
        Arc::new(ReasoningClient::new(&reasoning_config).unwrap()),
    )
}

#[tokio::test]
async fn feed_merges_all_sources_in_date_order() {
    let aggregator = EventAggregator::new(vec![
        Arc::new(StubProvider {
            name: "ticketed",
            events: vec![
                create_test_event("Sunburn Festival", day(6), EventSource::Ticketed),
                create_test_event("Jazz Night", day(2), EventSource::Ticketed),
                create_test_event("Mystery Gig", Event::missing_date(), EventSource::Ticketed),
            ],
            fail: false,
        }),
        Arc::new(StubProvider {
            name: "holidays",
            events: vec![create_test_event("Eid", day(4), EventSource::Holiday)],
            fail: false,
        }),
        Arc::new(StubProvider {
            name: "trending",
            events: vec![create_test_event(
                "Chapora Fort",
                day(1),
                EventSource::WeatherTrend,
            )],
            fail: false,
        }),
    ]);

    let feed = aggregator.aggregate(&create_test_query()).await;

    assert!(feed.success);
    assert_eq!(feed.total_events, 5);
    let names: Vec<&str> = feed.events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Chapora Fort",
            "Jazz Night",
            "Eid",
            "Sunburn Festival",
            "Mystery Gig"
        ]
    );
}

#[tokio::test]
async fn feed_keeps_healthy_providers_when_one_fails() {
    let aggregator = EventAggregator::new(vec![
        Arc::new(StubProvider {
            name: "ticketed",
            events: vec![],
            fail: true,
        }),
        Arc::new(StubProvider {
            name: "holidays",
            events: vec![create_test_event("Diwali", day(3), EventSource::Holiday)],
            fail: false,
        }),
        Arc::new(StubProvider {
            name: "trending",
            events: vec![create_test_event("Nandi Hills", day(1), EventSource::WeatherTrend)],
            fail: false,
        }),
    ]);

    let feed = aggregator.aggregate(&create_test_query()).await;

    assert!(feed.success);
    assert_eq!(feed.total_events, 2);
    assert_eq!(feed.events[0].name, "Nandi Hills");
    assert_eq!(feed.events[1].name, "Diwali");
}

#[tokio::test]
async fn feed_serializes_with_wire_field_names() {
    let aggregator = EventAggregator::new(vec![Arc::new(StubProvider {
        name: "ticketed",
        events: vec![create_test_event("Jazz Night", day(2), EventSource::Ticketed)],
        fail: false,
    })]);

    let feed = aggregator.aggregate(&create_test_query()).await;
    let value = serde_json::to_value(&feed).unwrap();

    assert_eq!(value["success"], true);
    assert_eq!(value["total_events"], 1);
    assert_eq!(value["city"], "goa");
    assert_eq!(value["date_range"], "2025-07-01 to 2025-07-08");
    let event = &value["events"][0];
    assert_eq!(event["type"], "Music");
    assert_eq!(event["source"], "ticketed");
    assert_eq!(event["date"], "2025-07-02");
    // Unset optionals stay off the wire entirely
    assert!(event.get("ticket_url").is_none());
    assert!(event.get("price_range").is_none());
}

#[tokio::test]
async fn assessment_uses_fallback_city_for_unknown_destination() {
    let (weather, reasoning) = create_dead_upstreams();
    let resolver = StaticLocationResolver::with_default_cities().with_fallback_city("goa");
    let service = SafetyService::new(Arc::new(resolver), weather, reasoning);

    let assessment = service
        .assess("some village nobody mapped", &create_test_query().range)
        .await
        .unwrap();

    // Fallback coordinates resolve, then both signal paths degrade
    assert_eq!(assessment.score, 100);
    assert_eq!(assessment.rating, SafetyRating::Safe);
    assert!(assessment.alerts.is_empty());
    assert_eq!(assessment.alert_count.total(), 0);
    assert_eq!(assessment.safety_tips.len(), 3);
    assert!(assessment.advice.starts_with('✅'));
}

#[tokio::test]
async fn assessment_rejects_unknown_destination_without_fallback() {
    let (weather, reasoning) = create_dead_upstreams();
    let resolver = StaticLocationResolver::with_default_cities();
    let service = SafetyService::new(Arc::new(resolver), weather, reasoning);

    let err = service
        .assess("atlantis", &create_test_query().range)
        .await
        .unwrap_err();

    assert!(matches!(err, TripSenseError::LocationNotFound { .. }));
    assert_eq!(
        err.user_message(),
        "Unknown destination 'atlantis'. Try one of the supported cities."
    );
}

#[tokio::test]
async fn chat_failure_surfaces_error_and_writes_no_history() {
    let (weather, reasoning) = create_dead_upstreams();
    let safety = SafetyService::new(
        Arc::new(StaticLocationResolver::with_default_cities()),
        weather,
        Arc::clone(&reasoning),
    );
    let store = Arc::new(MemoryHistoryStore::new());
    let assistant = TravelAssistant::new(
        reasoning,
        safety,
        Arc::clone(&store) as Arc<dyn SearchHistoryStore>,
    );

    let err = assistant
        .chat(ChatInput {
            message: "Plan me a weekend in Goa".to_string(),
            user_profile: UserProfile::default(),
            conversation_history: vec![],
            user_id: Some("user-7".to_string()),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TripSenseError::Synthesis(SynthesisError::Credentials)
    ));
    let searches = store.recent_searches("user-7", 5).await.unwrap();
    assert!(searches.is_empty());
}
