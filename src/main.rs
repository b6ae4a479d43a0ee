use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use tripsense::aggregator::EventAggregator;
use tripsense::api::AppState;
use tripsense::assistant::TravelAssistant;
use tripsense::config::TripSenseConfig;
use tripsense::history::MemoryHistoryStore;
use tripsense::location::{LocationResolver, StaticLocationResolver};
use tripsense::providers::{
    EventProvider, HolidayProvider, TicketedEventsProvider, TrendingSpotsProvider,
};
use tripsense::reasoning::ReasoningClient;
use tripsense::safety::SafetyService;
use tripsense::weather::WeatherClient;
use tripsense::web;

#[tokio::main]
async fn main() -> Result<()> {
    let config = TripSenseConfig::load()?;
    init_tracing(&config)?;

    tracing::info!("Starting TripSense v{}", tripsense::VERSION);

    let resolver = build_resolver(&config);
    let weather = Arc::new(WeatherClient::new(&config.weather)?);
    let reasoning = Arc::new(ReasoningClient::new(&config.reasoning)?);

    let providers: Vec<Arc<dyn EventProvider>> = vec![
        Arc::new(TicketedEventsProvider::new(&config.ticketed)?),
        Arc::new(HolidayProvider::new(&config.holidays)?),
        Arc::new(TrendingSpotsProvider::new(
            Arc::clone(&resolver),
            Arc::clone(&weather),
            Arc::clone(&reasoning),
        )),
    ];

    let safety = SafetyService::new(resolver, weather, Arc::clone(&reasoning));
    let assistant = TravelAssistant::new(
        reasoning,
        safety.clone(),
        Arc::new(MemoryHistoryStore::new()),
    );

    let state = Arc::new(AppState {
        aggregator: EventAggregator::new(providers),
        safety,
        assistant,
        defaults: config.defaults.clone(),
    });

    web::run(&config.server, state).await?;
    Ok(())
}

fn init_tracing(config: &TripSenseConfig) -> Result<()> {
    let directive = format!("tripsense={}", config.logging.level).parse()?;
    let filter = EnvFilter::from_default_env().add_directive(directive);
    match config.logging.format.as_str() {
        "json" => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    Ok(())
}

fn build_resolver(config: &TripSenseConfig) -> Arc<dyn LocationResolver> {
    let resolver = StaticLocationResolver::with_default_cities();
    let resolver = match &config.defaults.fallback_city {
        Some(city) => resolver.with_fallback_city(city.clone()),
        None => resolver,
    };
    Arc::new(resolver)
}
