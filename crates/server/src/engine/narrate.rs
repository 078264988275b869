//! The insight narrator.
//!
//! Renders numeric results into a deterministic natural-language summary
//! and builds the prompts sent to the text-generation collaborator. The
//! collaborator is treated as unreliable: its output may be malformed or
//! empty, and every failure is reported as a degraded field while the
//! numeric results stand.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use super::metrics::InsightsReport;

/// Number of days in the structured forecast the collaborator returns.
const FORECAST_DAYS: usize = 7;

/// A structured response from the collaborator that could not be used.
#[derive(Debug, Error)]
pub enum NarrationError {
    /// No JSON object could be found in the response text.
    #[error("no JSON object in response")]
    NoJsonObject,

    /// The response contained invalid JSON.
    #[error("malformed JSON in response: {0}")]
    MalformedJson(String),

    /// The JSON object did not have exactly the expected forecast keys.
    #[error("forecast object must have exactly the keys day_1..day_7")]
    WrongShape,

    /// A forecast value was not numeric.
    #[error("forecast value for {0} is not a number")]
    NonNumericValue(String),
}

/// Render the numeric insight results into a flat summary paragraph.
///
/// Deterministic templating, no model call; this text is returned to the
/// caller alongside any narrated prose so the numbers are always available.
#[must_use]
pub fn render_summary(report: &InsightsReport) -> String {
    let kpis = &report.metadata.kpis;
    if kpis.days_observed == 0 {
        return "No sales data available for the selected filters.".to_string();
    }

    let mut parts = vec![
        format!(
            "Over {} active sales days, total revenue was {:.2} with total profit {:.2}.",
            kpis.days_observed, kpis.total_revenue, kpis.total_profit
        ),
    ];

    if let Some(avg) = kpis.avg_daily_revenue {
        parts.push(format!("Average daily revenue was {avg:.2}."));
    }
    if let Some(day) = &kpis.highest_day {
        parts.push(format!(
            "The strongest day was {} ({:.2})",
            day.date, day.revenue
        ));
    }
    if let Some(day) = &kpis.lowest_day {
        parts.push(format!(
            "and the weakest was {} ({:.2}).",
            day.date, day.revenue
        ));
    }
    if let Some(best) = report.sales.best_selling_products.first() {
        parts.push(format!(
            "The best seller was {} with {:.0} units sold.",
            best.product, best.quantity
        ));
    }
    parts.push(format!(
        "{} peak and {} non-peak sales days were identified.",
        report.sales.peak_sales_days.len(),
        report.sales.non_peak_sales_days.len()
    ));
    parts.push(format!("Overall revenue trend: {}.", report.revenue_trends));

    parts.join(" ")
}

/// Prompt asking the collaborator for free-form business insights.
#[must_use]
pub fn insights_prompt(summary: &str) -> String {
    format!(
        "You are a business analyst AI expert.\n\
         Analyze the following sales data and provide:\n\n\
         1. **Key Insights** (3-4 bullet points)\n\
         2. **Trend Analysis** (why sales are moving this way)\n\
         3. **Next 7-Day Outlook** (predicted trend)\n\
         4. **Actionable Recommendations** (3-4 specific actions)\n\n\
         Sales Summary:\n{summary}\n\n\
         Format the response with clear sections and bullet points."
    )
}

/// Prompt asking the collaborator for a strict 7-day JSON forecast.
#[must_use]
pub fn forecast_prompt(summary: &str, avg_daily_revenue: f64) -> String {
    format!(
        "Based on this sales data, provide ONLY a JSON forecast for the next 7 days.\n\n\
         Sales Summary:\n{summary}\n\n\
         Return ONLY valid JSON (no other text):\n\
         {{\n\
         \"day_1\": 25000,\n\
         \"day_2\": 26000,\n\
         \"day_3\": 27000,\n\
         \"day_4\": 26500,\n\
         \"day_5\": 28000,\n\
         \"day_6\": 29000,\n\
         \"day_7\": 30000\n\
         }}\n\n\
         Base the numbers on average daily revenue of {avg_daily_revenue:.2} and the trend."
    )
}

/// Parse the collaborator's structured forecast response from raw text.
///
/// The response text is trimmed to its outermost braces before parsing
/// (models often wrap JSON in prose) and must contain exactly the keys
/// `day_1`..`day_7` with numeric values.
///
/// # Errors
///
/// Returns a [`NarrationError`] describing how the response failed; the
/// caller reports it as a degraded field, never as a request failure.
pub fn parse_forecast_json(text: &str) -> Result<BTreeMap<String, f64>, NarrationError> {
    let start = text.find('{').ok_or(NarrationError::NoJsonObject)?;
    let end = text.rfind('}').ok_or(NarrationError::NoJsonObject)?;
    let json = text.get(start..=end).ok_or(NarrationError::NoJsonObject)?;

    let parsed: Value =
        serde_json::from_str(json).map_err(|e| NarrationError::MalformedJson(e.to_string()))?;
    validate_forecast_object(&parsed)
}

/// Validate an already-parsed forecast object.
///
/// # Errors
///
/// Returns [`NarrationError::WrongShape`] unless the value is an object
/// with exactly the keys `day_1`..`day_7`, and
/// [`NarrationError::NonNumericValue`] when a value is not a number.
pub fn validate_forecast_object(value: &Value) -> Result<BTreeMap<String, f64>, NarrationError> {
    let Value::Object(map) = value else {
        return Err(NarrationError::WrongShape);
    };

    if map.len() != FORECAST_DAYS {
        return Err(NarrationError::WrongShape);
    }

    let mut forecast = BTreeMap::new();
    for day in 1..=FORECAST_DAYS {
        let key = format!("day_{day}");
        let entry = map.get(&key).ok_or(NarrationError::WrongShape)?;
        let number = entry
            .as_f64()
            .ok_or_else(|| NarrationError::NonNumericValue(key.clone()))?;
        forecast.insert(key, number);
    }

    Ok(forecast)
}
