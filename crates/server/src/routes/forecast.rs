//! The `forecast` endpoint.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use shopsight_core::ForecastResult;
use tracing::instrument;

use crate::engine::forecast::{self, DEFAULT_SPIKE_THRESHOLD};
use crate::error::AppError;
use crate::state::AppState;

use super::{Filter, load_sales};

/// Query parameters for the forecast endpoint.
#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    /// Forecast horizon in days (default 7).
    pub period_days: Option<usize>,
    /// Spike threshold multiplier (default 1.5).
    pub spike_threshold: Option<f64>,
    /// Inclusive start date (YYYY-MM-DD).
    pub start_date: Option<String>,
    /// Inclusive end date (YYYY-MM-DD).
    pub end_date: Option<String>,
    /// Category filter.
    pub category: Option<String>,
    /// Item type filter.
    pub item_type: Option<String>,
}

/// Demand forecast with revenue projection and spike flags.
///
/// The forecast always succeeds for a non-empty filtered dataset: thin
/// history selects a simpler strategy and a failed model fit falls back to
/// the flat mean, never an error. An empty dataset yields an empty result.
///
/// # Errors
///
/// Returns a bad-request error for invalid horizon, threshold or filter
/// parameters.
#[instrument(skip(state))]
pub async fn forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ForecastResult>, AppError> {
    let period_days = query.period_days.unwrap_or(7);
    if period_days == 0 {
        return Err(AppError::BadRequest(
            "period_days must be at least 1".to_string(),
        ));
    }

    let spike_threshold = query.spike_threshold.unwrap_or(DEFAULT_SPIKE_THRESHOLD);
    if !spike_threshold.is_finite() || spike_threshold <= 0.0 {
        return Err(AppError::BadRequest(
            "spike_threshold must be a positive number".to_string(),
        ));
    }

    let filter = Filter::parse(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        query.category,
        query.item_type,
    )?;

    let records = filter.apply(load_sales(&state).await?);

    Ok(Json(forecast::forecast(&records, period_days, spike_threshold)))
}
