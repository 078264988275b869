//! The `recommendations` endpoint.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use shopsight_core::RecommendationSet;
use tracing::instrument;

use crate::engine::recommend;
use crate::error::AppError;
use crate::state::AppState;

use super::{Filter, load_inventory, load_sales};

/// Query parameters for the recommendations endpoint.
#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    /// Inclusive start date (YYYY-MM-DD).
    pub start_date: Option<String>,
    /// Inclusive end date (YYYY-MM-DD).
    pub end_date: Option<String>,
    /// Category filter.
    pub category: Option<String>,
    /// Item type filter.
    pub item_type: Option<String>,
}

/// Restock, pricing and bundling recommendations.
///
/// Each list degrades independently: no inventory feed empties restock and
/// pricing, no invoice column empties bundling, and an empty dataset
/// yields three empty lists - never an error.
///
/// # Errors
///
/// Returns a bad-request error for invalid filter parameters.
#[instrument(skip(state))]
pub async fn recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationsQuery>,
) -> Result<Json<RecommendationSet>, AppError> {
    let filter = Filter::parse(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        query.category,
        query.item_type,
    )?;

    let sales = filter.apply(load_sales(&state).await?);
    let inventory = load_inventory(&state).await?;

    Ok(Json(recommend::recommendations(&sales, &inventory)))
}
