//! The `insights` endpoint.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use shopsight_core::{Period, PeriodParseError};
use tracing::instrument;

use crate::engine::metrics::{InsightsReport, compute_insights};
use crate::error::AppError;
use crate::state::AppState;

use super::{Filter, load_sales};

/// Query parameters for the insights endpoint.
#[derive(Debug, Deserialize)]
pub struct InsightsQuery {
    /// Aggregation period: "weekly" (default), "monthly" or "yearly".
    pub period: Option<String>,
    /// Inclusive start date (YYYY-MM-DD).
    pub start_date: Option<String>,
    /// Inclusive end date (YYYY-MM-DD).
    pub end_date: Option<String>,
    /// Category filter.
    pub category: Option<String>,
    /// Item type filter.
    pub item_type: Option<String>,
}

/// Descriptive analytics: best/worst sellers, peak/non-peak days, margin
/// extremes, revenue trend and KPI metadata.
///
/// # Errors
///
/// Returns a bad-request error for an invalid period or filter parameter.
/// An empty (or fully filtered-out) dataset is not an error; it yields an
/// empty-shaped report.
#[instrument(skip(state))]
pub async fn insights(
    State(state): State<AppState>,
    Query(query): Query<InsightsQuery>,
) -> Result<Json<InsightsReport>, AppError> {
    let period: Period = query
        .period
        .as_deref()
        .unwrap_or("weekly")
        .parse()
        .map_err(|e: PeriodParseError| AppError::BadRequest(e.to_string()))?;
    let filter = Filter::parse(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        query.category,
        query.item_type,
    )?;

    let records = filter.apply(load_sales(&state).await?);

    Ok(Json(compute_insights(&records, period)))
}
