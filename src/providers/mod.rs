//! Event provider adapters
//!
//! Each adapter normalizes one upstream source into [`Event`] records. The
//! aggregator treats every adapter as independently fallible: an error from
//! one becomes an empty contribution, never a failed feed.

pub mod holidays;
pub mod ticketed;
pub mod trending;

pub use holidays::HolidayProvider;
pub use ticketed::TicketedEventsProvider;
pub use trending::TrendingSpotsProvider;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::models::{Event, EventQuery};

/// One upstream source of normalized events
#[async_trait]
pub trait EventProvider: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &'static str;

    /// Fetch and normalize events for the query.
    ///
    /// One outbound call per invocation; the client's timeout bounds it.
    /// Implementations return whatever subset of the query they can serve
    /// and leave range filtering to themselves (upstreams differ in what
    /// they can filter server-side).
    async fn fetch(&self, query: &EventQuery)
    -> std::result::Result<Vec<Event>, ProviderError>;
}
