//! Descriptive metrics and trend analysis.
//!
//! Aggregation by period, best/worst sellers, peak/non-peak day
//! classification and a crude revenue trend signal.

use std::collections::BTreeMap;
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shopsight_core::{Period, SalesRecord};

/// Percentile for peak-day classification.
pub const PEAK_PERCENTILE: f64 = 0.80;
/// Percentile for non-peak-day classification.
pub const NON_PEAK_PERCENTILE: f64 = 0.20;
/// Default list length for top/bottom rankings.
pub const DEFAULT_TOP_N: usize = 5;

// =============================================================================
// Report Types
// =============================================================================

/// Total quantity sold for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductQuantity {
    /// Product identifier.
    pub product: String,
    /// Summed quantity across the analyzed records.
    pub quantity: f64,
}

/// Mean margin for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMargin {
    /// Product identifier.
    pub product: String,
    /// Mean per-row margin ratio, over rows where the margin is defined.
    pub avg_margin: f64,
}

/// Revenue observed on a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRevenue {
    /// The day.
    pub date: NaiveDate,
    /// Summed revenue for the day.
    pub revenue: f64,
}

/// Direction of the revenue trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    /// Mean day-over-day change is non-negative.
    Upward,
    /// Mean day-over-day change is negative.
    Downward,
    /// Not enough history to compute a change.
    Unknown,
}

impl TrendDirection {
    /// Display label for responses.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upward => "Upward Trend",
            Self::Downward => "Downward Trend",
            Self::Unknown => "Unknown",
        }
    }
}

/// Peak/non-peak day classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakAnalysis {
    /// Days at or above the peak revenue threshold.
    pub peak_days: BTreeMap<NaiveDate, f64>,
    /// Days at or below the non-peak revenue threshold.
    pub non_peak_days: BTreeMap<NaiveDate, f64>,
    /// 80th-percentile daily revenue, when defined.
    pub peak_threshold: Option<f64>,
    /// 20th-percentile daily revenue, when defined.
    pub non_peak_threshold: Option<f64>,
}

/// Headline KPIs for the analyzed window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    /// Summed revenue.
    pub total_revenue: f64,
    /// Summed profit.
    pub total_profit: f64,
    /// Profit as a ratio of revenue, when revenue is non-zero.
    pub gross_margin: Option<f64>,
    /// Mean per-row revenue, when any rows exist.
    pub average_order_value: Option<f64>,
    /// Mean per-day revenue, when any days exist.
    pub avg_daily_revenue: Option<f64>,
    /// The day with the most revenue.
    pub highest_day: Option<DayRevenue>,
    /// The day with the least revenue.
    pub lowest_day: Option<DayRevenue>,
    /// Number of distinct days with sales activity.
    pub days_observed: usize,
}

/// Sales-side insight block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesInsights {
    /// Top products by summed quantity, best first.
    pub best_selling_products: Vec<ProductQuantity>,
    /// Bottom products by summed quantity, worst first.
    pub worst_selling_products: Vec<ProductQuantity>,
    /// Peak revenue days.
    pub peak_sales_days: BTreeMap<NaiveDate, f64>,
    /// Non-peak revenue days.
    pub non_peak_sales_days: BTreeMap<NaiveDate, f64>,
}

/// Item-side insight block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemInsights {
    /// Products with the highest mean margin.
    pub high_margin_items: Vec<ProductMargin>,
    /// Products with the lowest mean margin.
    pub low_margin_items: Vec<ProductMargin>,
}

/// Percentile thresholds used for the peak classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdMetadata {
    /// Percentile rank for peak days.
    pub peak_percentile: f64,
    /// Percentile rank for non-peak days.
    pub non_peak_percentile: f64,
    /// Revenue value at the peak percentile.
    pub peak_value: Option<f64>,
    /// Revenue value at the non-peak percentile.
    pub non_peak_value: Option<f64>,
}

/// Supporting metadata for an insights report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightMetadata {
    /// Peak classification thresholds.
    pub thresholds: ThresholdMetadata,
    /// Period used for the aggregate block.
    pub period_grouping: String,
    /// Revenue summed per period bucket.
    pub period_sales: BTreeMap<String, f64>,
    /// Headline KPIs.
    pub kpis: Kpis,
}

/// The full `insights` endpoint payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightsReport {
    /// Sales-side insights.
    pub sales: SalesInsights,
    /// Item-side insights.
    pub items: ItemInsights,
    /// Revenue trend label.
    pub revenue_trends: String,
    /// Supporting metadata.
    pub metadata: InsightMetadata,
}

// =============================================================================
// Aggregation
// =============================================================================

/// Revenue summed per calendar day.
#[must_use]
pub fn daily_revenue(records: &[SalesRecord]) -> BTreeMap<NaiveDate, f64> {
    let mut totals = BTreeMap::new();
    for r in records {
        *totals.entry(r.date).or_insert(0.0) += r.revenue();
    }
    totals
}

/// Quantity summed per calendar day.
#[must_use]
pub fn daily_quantity(records: &[SalesRecord]) -> BTreeMap<NaiveDate, f64> {
    let mut totals = BTreeMap::new();
    for r in records {
        *totals.entry(r.date).or_insert(0.0) += r.quantity;
    }
    totals
}

/// Revenue summed per period bucket.
///
/// Pure function of the records; the input is never mutated, so repeated
/// calls with the same records and period yield identical output.
#[must_use]
pub fn aggregate(records: &[SalesRecord], period: Period) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for r in records {
        *totals.entry(period.bucket(r.date)).or_insert(0.0) += r.revenue();
    }
    totals
}

/// Total quantity per product in first-seen row order.
///
/// The stable order is what makes ranking ties deterministic: products tied
/// on quantity rank in natural row order.
#[must_use]
pub fn product_quantity_totals(records: &[SalesRecord]) -> Vec<ProductQuantity> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<ProductQuantity> = Vec::new();

    for r in records {
        if let Some(&i) = index.get(r.product.as_str()) {
            if let Some(entry) = totals.get_mut(i) {
                entry.quantity += r.quantity;
            }
        } else {
            index.insert(r.product.as_str(), totals.len());
            totals.push(ProductQuantity {
                product: r.product.clone(),
                quantity: r.quantity,
            });
        }
    }

    totals
}

/// Top/bottom-n products by summed quantity.
///
/// Ties break by natural row order (stable sort over first-seen totals).
#[must_use]
pub fn best_worst(records: &[SalesRecord], n: usize) -> (Vec<ProductQuantity>, Vec<ProductQuantity>) {
    let totals = product_quantity_totals(records);

    let mut best = totals.clone();
    best.sort_by(|a, b| b.quantity.total_cmp(&a.quantity));
    best.truncate(n);

    let mut worst = totals;
    worst.sort_by(|a, b| a.quantity.total_cmp(&b.quantity));
    worst.truncate(n);

    (best, worst)
}

// =============================================================================
// Peak / Non-Peak Classification
// =============================================================================

/// Linear-interpolation quantile over sorted values.
///
/// Matches the numpy/pandas default: position `q * (n - 1)` interpolated
/// between its neighbors. Returns `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let lower = sorted.get(lo).copied()?;
    let upper = sorted.get(hi).copied()?;
    Some(upper.mul_add(pos - pos.floor(), lower * (1.0 - (pos - pos.floor()))))
}

/// Classify days by revenue percentile rank.
///
/// Days at or above the 80th percentile are peak; days at or below the 20th
/// are non-peak. With fewer than 5 distinct days the thresholds can
/// degenerate to a single boundary value and the two sets may overlap -
/// that is the documented behavior of a percentile split over a tiny
/// distribution, not a special case.
#[must_use]
pub fn peak_non_peak(daily: &BTreeMap<NaiveDate, f64>) -> PeakAnalysis {
    let mut sorted: Vec<f64> = daily.values().copied().collect();
    sorted.sort_by(f64::total_cmp);

    let peak_threshold = quantile(&sorted, PEAK_PERCENTILE);
    let non_peak_threshold = quantile(&sorted, NON_PEAK_PERCENTILE);

    let peak_days = peak_threshold.map_or_else(BTreeMap::new, |t| {
        daily
            .iter()
            .filter(|&(_, &v)| v >= t)
            .map(|(&d, &v)| (d, v))
            .collect()
    });
    let non_peak_days = non_peak_threshold.map_or_else(BTreeMap::new, |t| {
        daily
            .iter()
            .filter(|&(_, &v)| v <= t)
            .map(|(&d, &v)| (d, v))
            .collect()
    });

    PeakAnalysis {
        peak_days,
        non_peak_days,
        peak_threshold,
        non_peak_threshold,
    }
}

// =============================================================================
// Trend
// =============================================================================

/// Direction of the mean day-over-day revenue change.
///
/// A single large outlier dominates this average; it is a crude trend
/// signal, not a robust statistic.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Day counts will never exceed f64 precision
pub fn trend_direction(daily: &BTreeMap<NaiveDate, f64>) -> TrendDirection {
    let values: Vec<f64> = daily.values().copied().collect();

    let mut changes = Vec::new();
    for pair in values.windows(2) {
        if let [prev, curr] = pair {
            // A change from a zero day is undefined, not zero
            if *prev != 0.0 {
                changes.push((curr - prev) / prev);
            }
        }
    }

    if changes.is_empty() {
        return TrendDirection::Unknown;
    }

    let avg = changes.iter().sum::<f64>() / changes.len() as f64;
    if avg >= 0.0 {
        TrendDirection::Upward
    } else {
        TrendDirection::Downward
    }
}

// =============================================================================
// Margins & KPIs
// =============================================================================

/// Top/bottom-n products by mean margin.
///
/// Rows with an undefined margin (zero revenue) are excluded from the mean;
/// products with no defined margin at all are excluded from both lists.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Row counts will never exceed f64 precision
pub fn margin_extremes(records: &[SalesRecord], n: usize) -> (Vec<ProductMargin>, Vec<ProductMargin>) {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut sums: Vec<(String, f64, usize)> = Vec::new();

    for r in records {
        let Some(margin) = r.margin() else { continue };
        if let Some(&i) = index.get(r.product.as_str()) {
            if let Some((_, sum, count)) = sums.get_mut(i) {
                *sum += margin;
                *count += 1;
            }
        } else {
            index.insert(r.product.as_str(), sums.len());
            sums.push((r.product.clone(), margin, 1));
        }
    }

    let means: Vec<ProductMargin> = sums
        .into_iter()
        .map(|(product, sum, count)| ProductMargin {
            product,
            avg_margin: sum / count as f64,
        })
        .collect();

    let mut high = means.clone();
    high.sort_by(|a, b| b.avg_margin.total_cmp(&a.avg_margin));
    high.truncate(n);

    let mut low = means;
    low.sort_by(|a, b| a.avg_margin.total_cmp(&b.avg_margin));
    low.truncate(n);

    (high, low)
}

/// Headline KPIs over the analyzed records.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Row counts will never exceed f64 precision
pub fn kpis(records: &[SalesRecord]) -> Kpis {
    let total_revenue: f64 = records.iter().map(SalesRecord::revenue).sum();
    let total_profit: f64 = records.iter().map(SalesRecord::profit).sum();

    let gross_margin = (total_revenue > 0.0).then(|| total_profit / total_revenue);
    let average_order_value =
        (!records.is_empty()).then(|| total_revenue / records.len() as f64);

    let daily = daily_revenue(records);
    let avg_daily_revenue =
        (!daily.is_empty()).then(|| daily.values().sum::<f64>() / daily.len() as f64);

    let highest_day = daily
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(&date, &revenue)| DayRevenue { date, revenue });
    let lowest_day = daily
        .iter()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(&date, &revenue)| DayRevenue { date, revenue });

    Kpis {
        total_revenue,
        total_profit,
        gross_margin,
        average_order_value,
        avg_daily_revenue,
        highest_day,
        lowest_day,
        days_observed: daily.len(),
    }
}

// =============================================================================
// Report Assembly
// =============================================================================

/// Compute the full insights report for the `insights` endpoint.
///
/// An empty input yields a well-formed empty-shaped report, never an error.
#[must_use]
pub fn compute_insights(records: &[SalesRecord], period: Period) -> InsightsReport {
    if records.is_empty() {
        return InsightsReport {
            revenue_trends: TrendDirection::Unknown.label().to_string(),
            metadata: InsightMetadata {
                thresholds: ThresholdMetadata {
                    peak_percentile: PEAK_PERCENTILE,
                    non_peak_percentile: NON_PEAK_PERCENTILE,
                    ..ThresholdMetadata::default()
                },
                period_grouping: period.label().to_string(),
                ..InsightMetadata::default()
            },
            ..InsightsReport::default()
        };
    }

    let (best, worst) = best_worst(records, DEFAULT_TOP_N);
    let daily = daily_revenue(records);
    let peaks = peak_non_peak(&daily);
    let (high_margin, low_margin) = margin_extremes(records, DEFAULT_TOP_N);

    InsightsReport {
        sales: SalesInsights {
            best_selling_products: best,
            worst_selling_products: worst,
            peak_sales_days: peaks.peak_days,
            non_peak_sales_days: peaks.non_peak_days,
        },
        items: ItemInsights {
            high_margin_items: high_margin,
            low_margin_items: low_margin,
        },
        revenue_trends: trend_direction(&daily).label().to_string(),
        metadata: InsightMetadata {
            thresholds: ThresholdMetadata {
                peak_percentile: PEAK_PERCENTILE,
                non_peak_percentile: NON_PEAK_PERCENTILE,
                peak_value: peaks.peak_threshold,
                non_peak_value: peaks.non_peak_threshold,
            },
            period_grouping: period.label().to_string(),
            period_sales: aggregate(records, period),
            kpis: kpis(records),
        },
    }
}
