//! Dashboard analytics.

use axum::{Json, extract::State};
use serde::Serialize;
use seminar_pulse_marketing::PortfolioSummary;
use std::sync::Arc;

use super::events::load_events;
use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub summary: PortfolioSummary,
}

/// `GET /api/analytics/summary`
pub async fn summary(
    State(state): State<Arc<AppState>>,
    RequireAuth(_caller): RequireAuth,
) -> Result<Json<SummaryResponse>, ApiError> {
    let events = load_events(&state).await?;
    Ok(Json(SummaryResponse {
        success: true,
        summary: PortfolioSummary::from_events(&events),
    }))
}
