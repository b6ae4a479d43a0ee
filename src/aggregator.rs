//! Multi-provider event aggregation
//!
//! Fans a query out to every registered provider at once and merges whatever
//! comes back. A provider failure is logged and skipped; the feed itself
//! always succeeds. The merge is deterministic: providers contribute in
//! registration order, then a stable sort puts events in date order with
//! undated events last.

use std::sync::Arc;

use futures::future;
use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{Event, EventQuery};
use crate::providers::EventProvider;

/// Aggregated feed for one query
#[derive(Debug, Serialize)]
pub struct EventsFeed {
    pub success: bool,
    pub total_events: usize,
    pub events: Vec<Event>,
    pub city: String,
    pub date_range: String,
}

/// Fans queries out to the registered event providers
pub struct EventAggregator {
    providers: Vec<Arc<dyn EventProvider>>,
}

impl EventAggregator {
    pub fn new(providers: Vec<Arc<dyn EventProvider>>) -> Self {
        Self { providers }
    }

    /// Collect events from every provider.
    ///
    /// Never fails: providers that error are dropped from the merge and the
    /// feed reports success with whatever remains.
    pub async fn aggregate(&self, query: &EventQuery) -> EventsFeed {
        let fetches = self.providers.iter().map(|provider| provider.fetch(query));
        let outcomes = future::join_all(fetches).await;

        let mut events = Vec::new();
        for (provider, outcome) in self.providers.iter().zip(outcomes) {
            match outcome {
                Ok(batch) => {
                    debug!("Provider {} contributed {} events", provider.name(), batch.len());
                    events.extend(batch);
                }
                Err(e) => {
                    warn!("Provider {} failed, continuing without it: {e}", provider.name());
                }
            }
        }

        events.sort_by_key(|event| event.date);

        EventsFeed {
            success: true,
            total_events: events.len(),
            events,
            city: query.city.clone(),
            date_range: query.range.to_string(),
        }
    }
}
