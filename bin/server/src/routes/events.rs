//! Marketing event routes. Every handler requires an authenticated caller;
//! events are shared across the whole team.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use seminar_pulse_core::EventId;
use seminar_pulse_marketing::{
    EVENTS_COLLECTION, EventInput, EventSortField, EventWithMetrics, MarketingEvent, SortOrder,
    sort_events,
};
use seminar_pulse_store::{from_document, to_document};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsParams {
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub success: bool,
    pub count: usize,
    pub events: Vec<EventWithMetrics>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub success: bool,
    pub event: EventWithMetrics,
}

#[derive(Debug, Serialize)]
pub struct DeleteEventResponse {
    pub success: bool,
    pub message: String,
}

fn parse_id(raw: &str) -> Result<EventId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation(format!("invalid event id '{raw}'")))
}

/// Loads every stored event, skipping documents that no longer decode.
pub(crate) async fn load_events(state: &AppState) -> Result<Vec<MarketingEvent>, ApiError> {
    let documents = state.store.query(EVENTS_COLLECTION, None, None).await?;
    Ok(documents
        .into_iter()
        .filter_map(|doc| {
            match from_document::<MarketingEvent>(EVENTS_COLLECTION, doc.data) {
                Ok(event) => Some(event),
                Err(report) => {
                    warn!(id = %doc.id, error = %report, "skipping malformed event");
                    None
                }
            }
        })
        .collect())
}

async fn load_event(state: &AppState, id: EventId) -> Result<MarketingEvent, ApiError> {
    let document = state
        .store
        .get(EVENTS_COLLECTION, &id.to_string())
        .await?
        .ok_or_else(|| ApiError::not_found("event not found"))?;
    Ok(from_document(EVENTS_COLLECTION, document)?)
}

async fn save_event(state: &AppState, event: &MarketingEvent) -> Result<(), ApiError> {
    let document = to_document(EVENTS_COLLECTION, event)?;
    state
        .store
        .set(EVENTS_COLLECTION, &event.id.to_string(), document)
        .await?;
    Ok(())
}

/// `GET /api/marketing-events?sortBy=&order=&limit=`
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    RequireAuth(_caller): RequireAuth,
    params: Result<Query<ListEventsParams>, QueryRejection>,
) -> Result<Json<EventsResponse>, ApiError> {
    let Query(params) = params?;
    let field = params
        .sort_by
        .as_deref()
        .map(str::parse::<EventSortField>)
        .transpose()?
        .unwrap_or_default();
    let order = params
        .order
        .as_deref()
        .map(str::parse::<SortOrder>)
        .transpose()?
        .unwrap_or_default();
    let limit = params
        .limit
        .unwrap_or(state.listing.max_event_limit)
        .min(state.listing.max_event_limit);

    let mut events = load_events(&state).await?;
    sort_events(&mut events, field, order);
    events.truncate(limit);

    let events: Vec<EventWithMetrics> = events.into_iter().map(EventWithMetrics::from).collect();
    Ok(Json(EventsResponse {
        success: true,
        count: events.len(),
        events,
    }))
}

/// `POST /api/marketing-events`
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    RequireAuth(caller): RequireAuth,
    payload: Result<Json<EventInput>, JsonRejection>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let Json(input) = payload?;
    let event = input.into_event(caller.uid().clone())?;
    save_event(&state, &event).await?;
    info!(id = %event.id, created_by = %caller.uid(), "marketing event created");

    Ok((
        StatusCode::CREATED,
        Json(EventResponse {
            success: true,
            event: event.into(),
        }),
    ))
}

/// `GET /api/marketing-events/{id}`
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    RequireAuth(_caller): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = load_event(&state, parse_id(&id)?).await?;
    Ok(Json(EventResponse {
        success: true,
        event: event.into(),
    }))
}

/// `PUT /api/marketing-events/{id}`
///
/// Fields absent from the body keep their stored values.
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<String>,
    payload: Result<Json<EventInput>, JsonRejection>,
) -> Result<Json<EventResponse>, ApiError> {
    let Json(input) = payload?;
    let mut event = load_event(&state, parse_id(&id)?).await?;
    input.apply_to(&mut event)?;
    save_event(&state, &event).await?;
    info!(id = %event.id, updated_by = %caller.uid(), "marketing event updated");

    Ok(Json(EventResponse {
        success: true,
        event: event.into(),
    }))
}

/// `DELETE /api/marketing-events/{id}`
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<DeleteEventResponse>, ApiError> {
    let id = parse_id(&id)?;
    if !state.store.delete(EVENTS_COLLECTION, &id.to_string()).await? {
        return Err(ApiError::not_found("event not found"));
    }
    info!(%id, deleted_by = %caller.uid(), "marketing event deleted");

    Ok(Json(DeleteEventResponse {
        success: true,
        message: "Event deleted successfully".to_string(),
    }))
}
