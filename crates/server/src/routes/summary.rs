//! The `summarize_insights` endpoint.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use shopsight_core::{Period, PeriodParseError};
use tracing::instrument;

use crate::engine::metrics::compute_insights;
use crate::engine::narrate::{
    forecast_prompt, insights_prompt, render_summary, validate_forecast_object,
};
use crate::error::AppError;
use crate::state::AppState;

use super::{Filter, load_sales};

/// Query parameters for the summarize endpoint.
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
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

/// Response for the summarize endpoint.
///
/// `summary` is always present and deterministic. The narrated fields
/// degrade independently: a failed or unconfigured text-generation call
/// leaves them null with an explanatory note, and the numeric summary
/// stands.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    /// Deterministic templated summary of the numeric results.
    pub summary: String,
    /// Model-narrated prose insights, when narration succeeded.
    pub narrated: Option<String>,
    /// Why `narrated` is null, when it is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narration_error: Option<String>,
    /// Model-generated 7-day revenue forecast, when narration succeeded.
    pub ai_forecast: Option<BTreeMap<String, f64>>,
    /// Why `ai_forecast` is null, when it is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_forecast_error: Option<String>,
}

/// Narrated summary: the templated paragraph plus collaborator prose and a
/// structured 7-day forecast.
///
/// # Errors
///
/// Returns a bad-request error for an invalid period or filter parameter.
/// Narration failures are not request errors; they degrade their fields.
#[instrument(skip(state))]
pub async fn summarize_insights(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
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
    let report = compute_insights(&records, period);
    let summary = render_summary(&report);

    let mut response = SummaryResponse {
        summary,
        narrated: None,
        narration_error: None,
        ai_forecast: None,
        ai_forecast_error: None,
    };

    let Some(claude) = state.claude() else {
        let note = "text generation is not configured".to_string();
        response.narration_error = Some(note.clone());
        response.ai_forecast_error = Some(note);
        return Ok(Json(response));
    };

    // Narration is best-effort: each call degrades its own field
    match claude.generate_prose(&insights_prompt(&response.summary)).await {
        Ok(prose) => response.narrated = Some(prose),
        Err(e) => {
            tracing::warn!("insight narration failed: {e}");
            response.narration_error = Some(e.to_string());
        }
    }

    let avg_daily_revenue = report.metadata.kpis.avg_daily_revenue.unwrap_or(0.0);
    match claude
        .generate_structured(&forecast_prompt(&response.summary, avg_daily_revenue))
        .await
    {
        Ok(value) => match validate_forecast_object(&value) {
            Ok(forecast) => response.ai_forecast = Some(forecast),
            Err(e) => {
                tracing::warn!("structured forecast was unusable: {e}");
                response.ai_forecast_error = Some(e.to_string());
            }
        },
        Err(e) => {
            tracing::warn!("structured forecast generation failed: {e}");
            response.ai_forecast_error = Some(e.to_string());
        }
    }

    Ok(Json(response))
}
