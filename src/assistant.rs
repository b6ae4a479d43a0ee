//! Conversational assistant and itinerary planning
//!
//! Both paths are thin orchestration over the reasoning client: chat builds
//! a profile-aware system prompt plus a bounded history window, itinerary
//! planning folds the user's recent searches into the prompt. History-store
//! writes and entity extraction ride along after a successful chat turn and
//! never fail the request.

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::Result;
use crate::error::SynthesisError;
use crate::history::{SearchHistoryStore, SearchRecord};
use crate::models::{Alert, DateRange, SafetyAssessment};
use crate::reasoning::{ChatMessage, ReasoningClient};
use crate::safety::SafetyService;

/// Chat turns from the request beyond this window are dropped
const CHAT_HISTORY_WINDOW: usize = 5;
/// Past searches folded into the itinerary prompt
const SEARCH_HISTORY_WINDOW: usize = 3;

const CHAT_TEMPERATURE: f32 = 0.7;
const CHAT_MAX_TOKENS: u32 = 512;
const EXTRACTION_TEMPERATURE: f32 = 0.2;
const ITINERARY_TEMPERATURE: f32 = 0.8;
const ITINERARY_MAX_TOKENS: u32 = 4096;

const ITINERARY_SYSTEM_PROMPT: &str = "You are an expert Indian travel planner who creates \
     detailed, practical, and budget-friendly itineraries.";

/// Advice shown when the trip dates are missing or the safety check fails
const DEFAULT_BEST_TIME_ADVICE: &str = "✅ Conditions look good for travel!";

/// Traveler profile echoed into the chat system prompt
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub travel_style: Option<String>,
}

/// One chat turn with optional profile and history context
#[derive(Debug, Deserialize)]
pub struct ChatInput {
    pub message: String,
    #[serde(default)]
    pub user_profile: UserProfile,
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
    pub user_id: Option<String>,
}

/// Parameters for a generated itinerary
#[derive(Debug, Deserialize)]
pub struct ItineraryRequest {
    pub destination: String,
    #[serde(rename = "duration")]
    pub duration_days: u32,
    #[serde(rename = "budget")]
    pub budget_inr: f64,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default = "default_traveler_type")]
    pub traveler_type: String,
    /// Trip start; when present the trip window also gets a safety check
    pub start_date: Option<NaiveDate>,
    pub user_id: Option<String>,
}

fn default_traveler_type() -> String {
    "solo".to_string()
}

/// Generated itinerary bundled with the trip-window safety check
#[derive(Debug)]
pub struct ItineraryPlan {
    pub itinerary: String,
    pub safety_alerts: Vec<Alert>,
    pub safety_score: u8,
    pub best_time_advice: String,
}

/// Profile-aware chat and itinerary generation
pub struct TravelAssistant {
    reasoning: Arc<ReasoningClient>,
    safety: SafetyService,
    history: Arc<dyn SearchHistoryStore>,
}

impl TravelAssistant {
    pub fn new(
        reasoning: Arc<ReasoningClient>,
        safety: SafetyService,
        history: Arc<dyn SearchHistoryStore>,
    ) -> Self {
        Self {
            reasoning,
            safety,
            history,
        }
    }

    /// Answer one chat turn.
    ///
    /// A completion failure is the caller's problem; the trailing history
    /// writes and entity extraction are not.
    pub async fn chat(&self, input: ChatInput) -> Result<String> {
        let mut messages = vec![ChatMessage::system(chat_system_prompt(&input.user_profile))];
        messages.extend(history_tail(&input.conversation_history).iter().cloned());
        messages.push(ChatMessage::user(input.message.clone()));

        let reply = self
            .reasoning
            .complete_text(&messages, CHAT_TEMPERATURE, CHAT_MAX_TOKENS)
            .await?;

        if let Some(user_id) = &input.user_id {
            self.remember_turn(user_id, &input.message, &reply).await;
        }

        Ok(reply)
    }

    /// Generate a day-wise itinerary, personalized with recent searches.
    ///
    /// When the request carries a start date the trip window also gets a
    /// safety assessment; a failed assessment degrades to the no-alerts
    /// defaults rather than failing the itinerary. The search itself is
    /// recorded fail-soft.
    pub async fn plan_itinerary(&self, request: ItineraryRequest) -> Result<ItineraryPlan> {
        let context = match &request.user_id {
            Some(user_id) => self.search_history_context(user_id).await,
            None => String::new(),
        };

        let messages = [
            ChatMessage::system(ITINERARY_SYSTEM_PROMPT),
            ChatMessage::user(itinerary_prompt(&request, &context)),
        ];

        let itinerary = self
            .reasoning
            .complete_text(&messages, ITINERARY_TEMPERATURE, ITINERARY_MAX_TOKENS)
            .await?;

        let plan = match self.trip_safety(&request).await {
            Some(assessment) => ItineraryPlan {
                itinerary,
                safety_alerts: assessment.alerts,
                safety_score: assessment.score,
                best_time_advice: assessment.advice,
            },
            None => ItineraryPlan {
                itinerary,
                safety_alerts: Vec::new(),
                safety_score: 100,
                best_time_advice: DEFAULT_BEST_TIME_ADVICE.to_string(),
            },
        };

        if let Some(user_id) = &request.user_id {
            self.remember_search(user_id, &request).await;
        }

        Ok(plan)
    }

    /// Safety assessment over the trip window, when the start date is known
    async fn trip_safety(&self, request: &ItineraryRequest) -> Option<SafetyAssessment> {
        let start = request.start_date?;
        let range = trip_range(start, request.duration_days)?;
        match self.safety.assess(&request.destination, &range).await {
            Ok(assessment) => Some(assessment),
            Err(e) => {
                warn!(
                    "Safety check for {} failed, returning itinerary without it: {e}",
                    request.destination
                );
                None
            }
        }
    }

    async fn remember_search(&self, user_id: &str, request: &ItineraryRequest) {
        let record = SearchRecord {
            destination: Some(request.destination.clone()),
            duration_days: Some(request.duration_days),
            budget_inr: Some(request.budget_inr),
            interests: request.interests.clone(),
            recorded_at: Utc::now(),
        };
        if let Err(e) = self.history.record_search(user_id, record).await {
            warn!("Could not save search history for {user_id}: {e}");
        }
    }

    async fn remember_turn(&self, user_id: &str, message: &str, reply: &str) {
        if let Err(e) = self
            .history
            .record_message(user_id, &ChatMessage::user(message))
            .await
        {
            warn!("Failed to record chat turn for {user_id}: {e}");
        }
        if let Err(e) = self
            .history
            .record_message(user_id, &ChatMessage::assistant(reply))
            .await
        {
            warn!("Failed to record chat turn for {user_id}: {e}");
        }

        match self.extract_entities(message).await {
            Ok(Some(record)) => {
                if let Err(e) = self.history.record_search(user_id, record).await {
                    warn!("Failed to record search history for {user_id}: {e}");
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Entity extraction failed for {user_id}: {e}"),
        }
    }

    /// Pull structured travel entities out of a chat message
    async fn extract_entities(
        &self,
        text: &str,
    ) -> std::result::Result<Option<SearchRecord>, SynthesisError> {
        let prompt = format!(
            "Extract travel-related entities from this text:\n\
             \"{text}\"\n\n\
             Return JSON with these fields (null if not mentioned):\n\
             {{\n\
               \"destination\": \"city name\",\n\
               \"duration\": number of days,\n\
               \"budget\": amount in INR,\n\
               \"interests\": [list],\n\
               \"dates\": \"YYYY-MM-DD or null\",\n\
               \"travelers\": number,\n\
               \"accommodation_type\": \"hotel/hostel/resort or null\"\n\
             }}"
        );

        let raw = self
            .reasoning
            .complete_json(&[ChatMessage::user(prompt)], EXTRACTION_TEMPERATURE)
            .await?;

        let payload: EntityPayload =
            serde_json::from_str(&raw).map_err(|e| SynthesisError::malformed(e.to_string()))?;

        Ok(payload.into_record())
    }

    async fn search_history_context(&self, user_id: &str) -> String {
        match self
            .history
            .recent_searches(user_id, SEARCH_HISTORY_WINDOW)
            .await
        {
            Ok(records) => render_history_context(&records),
            Err(e) => {
                warn!("Could not fetch search history for {user_id}: {e}");
                String::new()
            }
        }
    }
}

fn chat_system_prompt(profile: &UserProfile) -> String {
    format!(
        "You are a friendly, knowledgeable AI travel assistant.\n\n\
         User Profile:\n\
         - Name: {name}\n\
         - Interests: {interests}\n\
         - Travel Style: {style}\n\n\
         Your personality:\n\
         - Conversational and warm\n\
         - Use emojis occasionally\n\
         - Give practical, actionable advice\n\
         - Remember their preferences in responses\n\
         - Be enthusiastic about travel\n\n\
         When they ask about destinations, consider their interests. When discussing \
         budgets, align with their style.",
        name = profile.name.as_deref().unwrap_or("Traveler"),
        interests = profile.interests.join(", "),
        style = profile.travel_style.as_deref().unwrap_or("casual"),
    )
}

fn itinerary_prompt(request: &ItineraryRequest, history_context: &str) -> String {
    format!(
        "Create a detailed {duration}-day travel itinerary for {destination}.\n\n\
         User Profile:\n\
         - Budget: ₹{budget}\n\
         - Interests: {interests}\n\
         - Traveler Type: {traveler_type}\n\
         {history_context}\n\
         Include:\n\
         1. Day-wise schedule with timings (morning, afternoon, evening)\n\
         2. Mix of popular attractions AND hidden local gems\n\
         3. Street food spots and authentic local restaurants (not just chains)\n\
         4. Local transport details (specific bus numbers, metro routes, auto rickshaw fares)\n\
         5. Budget accommodation options (hostels for students, mid-range for families)\n\
         6. Daily cost breakdown (transport, food, activities, accommodation)\n\
         7. Best times to visit each place to avoid crowds\n\
         8. Safety tips and local etiquette\n\n\
         **IMPORTANT**: Clearly mention specific famous places/attractions by name.\n\n\
         Format it clearly with headers for each day. Make it practical, realistic, and \
         budget-friendly for Indian travelers.",
        duration = request.duration_days,
        destination = request.destination,
        budget = request.budget_inr,
        interests = request.interests.join(", "),
        traveler_type = request.traveler_type,
    )
}

fn render_history_context(records: &[SearchRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut context = String::from("\n\n📊 User's Travel History:\n");
    for record in records {
        let destination = record.destination.as_deref().unwrap_or("Unknown");
        let budget = record
            .budget_inr
            .map_or_else(|| "N/A".to_string(), |b| b.to_string());
        context.push_str(&format!(
            "- Previously searched: {destination} (Budget: ₹{budget})\n"
        ));
    }
    context.push_str("\nUse this to personalize recommendations based on their preferences.\n");
    context
}

fn history_tail(history: &[ChatMessage]) -> &[ChatMessage] {
    let start = history.len().saturating_sub(CHAT_HISTORY_WINDOW);
    &history[start..]
}

/// Trip window from start date plus duration; `None` on calendar overflow
fn trip_range(start: NaiveDate, duration_days: u32) -> Option<DateRange> {
    let end = start.checked_add_days(Days::new(u64::from(duration_days)))?;
    Some(DateRange::new(start, end))
}

/// Model output for entity extraction; only the stored fields are declared
#[derive(Debug, Deserialize)]
struct EntityPayload {
    destination: Option<String>,
    duration: Option<f64>,
    budget: Option<f64>,
    interests: Option<Vec<String>>,
}

impl EntityPayload {
    /// `None` when the message carried nothing worth remembering
    fn into_record(self) -> Option<SearchRecord> {
        let interests = self.interests.unwrap_or_default();
        if self.destination.is_none()
            && self.duration.is_none()
            && self.budget.is_none()
            && interests.is_empty()
        {
            return None;
        }

        Some(SearchRecord {
            destination: self.destination,
            duration_days: self.duration.map(|d| d as u32),
            budget_inr: self.budget,
            interests,
            recorded_at: Utc::now(),
        })
    }
}
