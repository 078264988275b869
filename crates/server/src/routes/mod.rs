//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health               - Liveness check
//! GET  /health/ready         - Readiness check (data store reachable)
//!
//! # Analytics (all read-only)
//! GET  /insights             - Best/worst sellers, peak days, margins, trend
//! GET  /forecast             - Demand forecast with spike flags
//! GET  /recommendations      - Restock / pricing / bundling suggestions
//! GET  /summarize_insights   - Templated summary plus narrated prose
//! ```
//!
//! Every analytics endpoint accepts optional `start_date`, `end_date`
//! (YYYY-MM-DD), `category` and `item_type` filters. Invalid parameters
//! reject the request before computation; empty datasets return
//! well-formed empty-shaped responses.

pub mod forecast;
pub mod insights;
pub mod recommendations;
pub mod summary;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use chrono::NaiveDate;
use shopsight_core::{InventoryRecord, SalesRecord};

use crate::error::AppError;
use crate::normalize::{normalize_inventory, normalize_sales};
use crate::state::AppState;

/// Build the service router.
#[must_use]
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/insights", get(insights::insights))
        .route("/forecast", get(forecast::forecast))
        .route("/recommendations", get(recommendations::recommendations))
        .route("/summarize_insights", get(summary::summarize_insights))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the data store is readable before returning OK.
/// Returns 503 Service Unavailable if the dataset cannot be loaded.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let store = state.store();
    let result = tokio::task::spawn_blocking(move || store.fetch_sales()).await;
    match result {
        Ok(Ok(_)) => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    }
}

// =============================================================================
// Shared Request Plumbing
// =============================================================================

/// Parsed filter parameters shared by every analytics endpoint.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    category: Option<String>,
    item_type: Option<String>,
}

impl Filter {
    /// Parse raw filter parameters.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error for unparseable dates; filters are
    /// validated before any computation runs.
    pub fn parse(
        start_date: Option<&str>,
        end_date: Option<&str>,
        category: Option<String>,
        item_type: Option<String>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            start_date: parse_date_param("start_date", start_date)?,
            end_date: parse_date_param("end_date", end_date)?,
            category,
            item_type,
        })
    }

    /// Apply the filter to normalized sales records.
    #[must_use]
    pub fn apply(&self, records: Vec<SalesRecord>) -> Vec<SalesRecord> {
        records
            .into_iter()
            .filter(|r| {
                self.start_date.is_none_or(|start| r.date >= start)
                    && self.end_date.is_none_or(|end| r.date <= end)
                    && self.category.as_ref().is_none_or(|c| &r.category == c)
                    && self.item_type.as_ref().is_none_or(|t| &r.item_type == t)
            })
            .collect()
    }
}

/// Parse an optional `YYYY-MM-DD` query parameter.
fn parse_date_param(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| AppError::BadRequest(format!("invalid {name} '{s}', expected YYYY-MM-DD")))
        })
        .transpose()
}

/// Load and normalize the sales snapshot for a request.
///
/// The file read runs on the blocking pool; the snapshot is request-scoped
/// and never shared across requests.
pub(crate) async fn load_sales(state: &AppState) -> Result<Vec<SalesRecord>, AppError> {
    let store = state.store();
    let rows = tokio::task::spawn_blocking(move || store.fetch_sales())
        .await
        .map_err(|e| AppError::Internal(format!("blocking task failed: {e}")))??;
    Ok(normalize_sales(&rows))
}

/// Load and normalize the inventory snapshot for a request.
pub(crate) async fn load_inventory(state: &AppState) -> Result<Vec<InventoryRecord>, AppError> {
    let store = state.store();
    let rows = tokio::task::spawn_blocking(move || store.fetch_inventory())
        .await
        .map_err(|e| AppError::Internal(format!("blocking task failed: {e}")))??;
    Ok(normalize_inventory(&rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, category: &str, item_type: &str) -> SalesRecord {
        SalesRecord {
            date: NaiveDate::from_ymd_opt(2025, 3, day).expect("valid date"),
            product: "Widget".to_string(),
            category: category.to_string(),
            item_type: item_type.to_string(),
            price: 10.0,
            cost: 4.0,
            quantity: 1.0,
            invoice_id: None,
        }
    }

    #[test]
    fn test_filter_parse_rejects_bad_dates() {
        let err = Filter::parse(Some("03/01/2025"), None, None, None).expect_err("should reject");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_filter_applies_date_range_inclusive() {
        let filter = Filter::parse(Some("2025-03-02"), Some("2025-03-03"), None, None)
            .expect("valid filter");
        let records = vec![
            record(1, "X", "A"),
            record(2, "X", "A"),
            record(3, "X", "A"),
            record(4, "X", "A"),
        ];

        let kept = filter.apply(records);
        let days: Vec<NaiveDate> = kept.iter().map(|r| r.date).collect();
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2025, 3, 2).expect("valid date"),
                NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date"),
            ]
        );
    }

    #[test]
    fn test_filter_applies_category_and_item_type() {
        let filter =
            Filter::parse(None, None, Some("X".to_string()), Some("A".to_string()))
                .expect("valid filter");
        let records = vec![record(1, "X", "A"), record(1, "Y", "A"), record(1, "X", "B")];

        let kept = filter.apply(records);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = Filter::default();
        let records = vec![record(1, "X", "A"), record(2, "Y", "B")];
        assert_eq!(filter.apply(records).len(), 2);
    }
}
