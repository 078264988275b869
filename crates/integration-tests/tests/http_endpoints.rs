//! HTTP-level tests over the full router.
//!
//! Each test drives the service through `tower::ServiceExt::oneshot` with
//! an in-memory data store: the real extraction, validation, engine and
//! serialization paths, no sockets.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use shopsight_integration_tests::{app, inventory_row, sales_row};
use tower::ServiceExt;

async fn get(router: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("valid request"),
        )
        .await
        .expect("infallible service");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, body)
}

fn widget_fortnight() -> Vec<Value> {
    (1..=14)
        .map(|d| sales_row(&format!("2025-03-{d:02}"), "Widget", 10.0, f64::from(d)))
        .collect()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_is_ok() {
    let (status, body) = get(app(vec![], vec![]), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_string()));
}

#[tokio::test]
async fn test_readiness_with_memory_store() {
    let (status, _) = get(app(vec![], vec![]), "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Parameter Validation
// =============================================================================

#[tokio::test]
async fn test_invalid_period_is_client_error() {
    let (status, body) = get(app(widget_fortnight(), vec![]), "/insights?period=daily").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body
        .get("error")
        .and_then(Value::as_str)
        .expect("error message");
    assert!(message.contains("daily"));
}

#[tokio::test]
async fn test_invalid_period_rejected_even_on_empty_dataset() {
    let (status, _) = get(app(vec![], vec![]), "/insights?period=hourly").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_date_filter_is_client_error() {
    let (status, _) = get(
        app(widget_fortnight(), vec![]),
        "/forecast?start_date=03-01-2025",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_zero_horizon_is_client_error() {
    let (status, _) = get(app(widget_fortnight(), vec![]), "/forecast?period_days=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Empty Dataset Shapes
// =============================================================================

#[tokio::test]
async fn test_empty_dataset_insights_shape() {
    let (status, body) = get(app(vec![], vec![]), "/insights").await;
    assert_eq!(status, StatusCode::OK);

    let sales = body.get("sales").expect("sales block");
    assert_eq!(
        sales
            .get("best_selling_products")
            .and_then(Value::as_array)
            .map(Vec::len),
        Some(0)
    );
    assert_eq!(body.get("revenue_trends"), Some(&Value::String("Unknown".to_string())));
}

#[tokio::test]
async fn test_empty_dataset_recommendations_shape() {
    let (status, body) = get(app(vec![], vec![]), "/recommendations").await;
    assert_eq!(status, StatusCode::OK);

    for key in ["restock", "pricing", "bundling"] {
        assert_eq!(
            body.get(key).and_then(Value::as_array).map(Vec::len),
            Some(0),
            "{key} must be an empty list"
        );
    }
}

#[tokio::test]
async fn test_empty_dataset_forecast_shape() {
    let (status, body) = get(app(vec![], vec![]), "/forecast").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("forecast"), Some(&serde_json::json!({})));
    assert_eq!(body.get("historical_spikes"), Some(&serde_json::json!({})));
}

// =============================================================================
// Forecast Endpoint
// =============================================================================

#[tokio::test]
async fn test_forecast_reports_regime_and_history() {
    let (status, body) = get(app(widget_fortnight(), vec![]), "/forecast?period_days=7").await;
    assert_eq!(status, StatusCode::OK);

    let metadata = body.get("metadata").expect("metadata block");
    assert_eq!(
        metadata.get("regime"),
        Some(&Value::String("short".to_string()))
    );
    assert_eq!(
        metadata.get("historical_days_used").and_then(Value::as_u64),
        Some(14)
    );

    let forecast = body
        .get("forecast")
        .and_then(Value::as_object)
        .expect("forecast map");
    assert_eq!(forecast.len(), 7);
    assert!(forecast.contains_key("2025-03-15"));
    assert!(forecast.contains_key("2025-03-21"));
}

#[tokio::test]
async fn test_forecast_filters_by_category() {
    let mut rows = widget_fortnight();
    rows.push(serde_json::json!({
        "date": "2025-03-01",
        "product": "Other",
        "category": "Y",
        "price": 99.0,
        "quantity": 1000
    }));

    // Filtering to category X leaves the widget fortnight only
    let (status, body) = get(app(rows, vec![]), "/forecast?category=X").await;
    assert_eq!(status, StatusCode::OK);
    let metadata = body.get("metadata").expect("metadata block");
    assert!(
        (metadata
            .get("avg_price")
            .and_then(Value::as_f64)
            .expect("avg price")
            - 10.0)
            .abs()
            < 1e-9
    );
}

// =============================================================================
// Recommendations Endpoint
// =============================================================================

#[tokio::test]
async fn test_recommendations_with_inventory() {
    // 14 days of accelerating Widget sales, stock below minimum
    let inventory = vec![inventory_row("Widget", 5.0, 10.0, 10.0, 4.0, 10.0)];
    let (status, body) = get(app(widget_fortnight(), inventory), "/recommendations").await;
    assert_eq!(status, StatusCode::OK);

    let restock = body
        .get("restock")
        .and_then(Value::as_array)
        .expect("restock list");
    assert_eq!(restock.len(), 1);
    let rec = restock.first().expect("one recommendation");
    assert_eq!(rec.get("urgency"), Some(&Value::String("Critical".to_string())));
    assert_eq!(rec.get("product"), Some(&Value::String("Widget".to_string())));
}

// =============================================================================
// Summarize Endpoint
// =============================================================================

#[tokio::test]
async fn test_summarize_degrades_without_narrator() {
    let (status, body) = get(app(widget_fortnight(), vec![]), "/summarize_insights").await;
    assert_eq!(status, StatusCode::OK);

    // The numeric summary is present and real
    let summary = body
        .get("summary")
        .and_then(Value::as_str)
        .expect("summary text");
    assert!(summary.contains("14 active sales days"));
    assert!(summary.contains("Widget"));

    // Narration degraded, not failed
    assert_eq!(body.get("narrated"), Some(&Value::Null));
    assert_eq!(body.get("ai_forecast"), Some(&Value::Null));
    let note = body
        .get("narration_error")
        .and_then(Value::as_str)
        .expect("degradation note");
    assert!(note.contains("not configured"));
}

#[tokio::test]
async fn test_summarize_empty_dataset() {
    let (status, body) = get(app(vec![], vec![]), "/summarize_insights").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body.get("summary"),
        Some(&Value::String(
            "No sales data available for the selected filters.".to_string()
        ))
    );
}
