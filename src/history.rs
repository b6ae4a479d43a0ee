//! Per-user search and chat history
//!
//! The store is a trait so the in-memory implementation can be swapped for a
//! durable backend without touching the assistant. Callers treat every store
//! operation as optional: failures are logged and the request continues.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::Result;
use crate::reasoning::ChatMessage;

/// One structured search extracted from a chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchRecord {
    pub destination: Option<String>,
    pub duration_days: Option<u32>,
    pub budget_inr: Option<f64>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Store for chat turns and extracted search records
#[async_trait]
pub trait SearchHistoryStore: Send + Sync {
    /// Append a chat turn to the user's log
    async fn record_message(&self, user_id: &str, message: &ChatMessage) -> Result<()>;

    /// Append an extracted search record
    async fn record_search(&self, user_id: &str, record: SearchRecord) -> Result<()>;

    /// Up to `limit` most recent searches, newest first
    async fn recent_searches(&self, user_id: &str, limit: usize) -> Result<Vec<SearchRecord>>;
}

/// Process-local store keyed by user id
#[derive(Default)]
pub struct MemoryHistoryStore {
    messages: RwLock<HashMap<String, Vec<ChatMessage>>>,
    searches: RwLock<HashMap<String, Vec<SearchRecord>>>,
}

impl MemoryHistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SearchHistoryStore for MemoryHistoryStore {
    async fn record_message(&self, user_id: &str, message: &ChatMessage) -> Result<()> {
        let mut messages = self.messages.write().await;
        messages
            .entry(user_id.to_string())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn record_search(&self, user_id: &str, record: SearchRecord) -> Result<()> {
        let mut searches = self.searches.write().await;
        searches
            .entry(user_id.to_string())
            .or_default()
            .push(record);
        Ok(())
    }

    async fn recent_searches(&self, user_id: &str, limit: usize) -> Result<Vec<SearchRecord>> {
        let searches = self.searches.read().await;
        let recent = searches
            .get(user_id)
            .map(|records| records.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default();
        Ok(recent)
    }
}
