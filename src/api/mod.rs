//! HTTP surface
//!
//! Thin wiring over the aggregator, safety service and assistant. Handlers
//! validate input, delegate, and translate errors: validation problems and
//! unknown destinations come back as 422 with a JSON body, everything else
//! as 500 with a user-facing message.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::TripSenseError;
use crate::aggregator::{EventAggregator, EventsFeed};
use crate::assistant::{ChatInput, ItineraryRequest, TravelAssistant};
use crate::config::DefaultsConfig;
use crate::models::{
    Alert, AlertCounts, DateRange, EventQuery, SafetyAssessment, SafetyRating,
};
use crate::safety::SafetyService;

/// Shared service handles for the handlers
pub struct AppState {
    pub aggregator: EventAggregator,
    pub safety: SafetyService,
    pub assistant: TravelAssistant,
    pub defaults: DefaultsConfig,
}

/// Routes mounted under `/api`
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/events", post(events))
        .route("/safety-alerts", post(safety_alerts))
        .route("/chat", post(chat))
        .route("/itinerary", post(itinerary))
        .with_state(state)
}

/// Liveness probe, mounted at the root
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct EventsRequest {
    pub city: String,
    pub country_code: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    pub category: Option<String>,
}

async fn events(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EventsRequest>,
) -> Result<Json<EventsFeed>, ApiError> {
    let range = validated_range("city", &request.city, request.start_date, request.end_date)?;

    let query = EventQuery {
        city: request.city,
        country_code: request
            .country_code
            .unwrap_or_else(|| state.defaults.country_code.clone()),
        range,
        category: request.category,
    };

    info!("Events request for {} over {}", query.city, query.range);
    Ok(Json(state.aggregator.aggregate(&query).await))
}

#[derive(Debug, Deserialize)]
pub struct SafetyRequest {
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct SafetyAlertsResponse {
    pub success: bool,
    pub destination: String,
    pub date_range: String,
    pub safety_score: u8,
    pub safety_rating: SafetyRating,
    pub alerts: Vec<Alert>,
    pub general_safety_tips: Vec<String>,
    pub best_time_advice: String,
    pub alert_count: AlertCounts,
}

impl SafetyAlertsResponse {
    fn new(destination: String, range: &DateRange, assessment: SafetyAssessment) -> Self {
        Self {
            success: true,
            destination,
            date_range: range.to_string(),
            safety_score: assessment.score,
            safety_rating: assessment.rating,
            alerts: assessment.alerts,
            general_safety_tips: assessment.safety_tips,
            best_time_advice: assessment.advice,
            alert_count: assessment.alert_count,
        }
    }
}

async fn safety_alerts(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SafetyRequest>,
) -> Result<Json<SafetyAlertsResponse>, ApiError> {
    let range = validated_range(
        "destination",
        &request.destination,
        request.start_date,
        request.end_date,
    )?;

    info!("Safety assessment for {} over {}", request.destination, range);
    let assessment = state.safety.assess(&request.destination, &range).await?;

    Ok(Json(SafetyAlertsResponse::new(
        request.destination,
        &range,
        assessment,
    )))
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ChatInput>,
) -> Result<Json<ChatResponse>, ApiError> {
    if input.message.trim().is_empty() {
        return Err(TripSenseError::validation("message must not be empty").into());
    }

    let reply = state.assistant.chat(input).await?;
    Ok(Json(ChatResponse {
        success: true,
        response: reply,
    }))
}

#[derive(Debug, Serialize)]
pub struct ItineraryResponse {
    pub success: bool,
    pub itinerary: String,
    pub destination: String,
    pub duration: u32,
    pub safety_alerts: Vec<Alert>,
    pub safety_score: u8,
    pub best_time_advice: String,
}

async fn itinerary(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ItineraryRequest>,
) -> Result<Json<ItineraryResponse>, ApiError> {
    if request.destination.trim().is_empty() {
        return Err(TripSenseError::validation("destination must not be empty").into());
    }
    if request.duration_days == 0 {
        return Err(TripSenseError::validation("duration must be at least 1 day").into());
    }

    let destination = request.destination.clone();
    let duration = request.duration_days;
    let plan = state.assistant.plan_itinerary(request).await?;
    Ok(Json(ItineraryResponse {
        success: true,
        itinerary: plan.itinerary,
        destination,
        duration,
        safety_alerts: plan.safety_alerts,
        safety_score: plan.safety_score,
        best_time_advice: plan.best_time_advice,
    }))
}

/// Check the common non-empty-name and date-order rules
fn validated_range(
    field: &str,
    value: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> std::result::Result<DateRange, TripSenseError> {
    if value.trim().is_empty() {
        return Err(TripSenseError::validation(format!(
            "{field} must not be empty"
        )));
    }
    if start > end {
        return Err(TripSenseError::validation(
            "start_date must not be after end_date",
        ));
    }
    Ok(DateRange::new(start, end))
}

/// Error wrapper translating domain errors into HTTP responses
pub struct ApiError(TripSenseError);

impl From<TripSenseError> for ApiError {
    fn from(e: TripSenseError) -> Self {
        Self(e)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TripSenseError::Validation { .. } | TripSenseError::LocationNotFound { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        let body = Json(ErrorBody {
            success: false,
            error: self.0.user_message(),
        });
        (status, body).into_response()
    }
}
