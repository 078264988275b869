//! The recommendation engine.
//!
//! Three independent sub-analyses over the same filtered dataset: restock
//! urgency from sales velocity and stock levels, pricing actions from
//! demand percentiles and margins, and bundling suggestions from invoice
//! co-occurrence. Each degrades to an empty list when its prerequisite data
//! is absent; siblings are unaffected.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use shopsight_core::{
    BundleRecommendation, InventoryRecord, PricingAction, PricingRecommendation,
    RecommendationSet, RestockRecommendation, RestockUrgency, SalesRecord,
};

use super::metrics::{NON_PEAK_PERCENTILE, PEAK_PERCENTILE, quantile};

/// Days of cover below which restocking becomes high urgency.
const HIGH_URGENCY_DAYS: f64 = 7.0;
/// Days of cover below which restocking becomes medium urgency.
const MEDIUM_URGENCY_DAYS: f64 = 14.0;
/// Projected demand window for the suggested reorder quantity, in days.
const REORDER_COVER_DAYS: f64 = 14.0;
/// Margin above which a fast seller can absorb a price increase.
const STRONG_MARGIN: f64 = 0.3;
/// Margin below which pricing needs review.
const WEAK_MARGIN: f64 = 0.1;
/// Stock level above which a slow mover is worth discounting.
const DISCOUNT_STOCK_FLOOR: f64 = 20.0;
/// Flat suggested discount for bundles, percent.
const BUNDLE_DISCOUNT_PCT: f64 = 10.0;
/// Number of bundle pairs to return.
const TOP_BUNDLES: usize = 5;

/// Run all three sub-analyses.
#[must_use]
pub fn recommendations(
    sales: &[SalesRecord],
    inventory: &[InventoryRecord],
) -> RecommendationSet {
    RecommendationSet {
        restock: restock(sales, inventory),
        pricing: pricing(sales, inventory),
        bundling: bundling(sales),
    }
}

// =============================================================================
// Restock
// =============================================================================

/// Restock urgency per inventory item with matching sales.
///
/// Average daily demand is the mean of per-day summed quantity over the
/// days the product actually sold. Items with zero demand are skipped -
/// "days remaining" is undefined for them. The urgency checks run in
/// priority order and the first match wins: a critically low stock level
/// outranks whatever the days-of-cover math would say.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Day counts will never exceed f64 precision
pub fn restock(
    sales: &[SalesRecord],
    inventory: &[InventoryRecord],
) -> Vec<RestockRecommendation> {
    let mut per_product_daily: HashMap<&str, BTreeMap<NaiveDate, f64>> = HashMap::new();
    for r in sales {
        *per_product_daily
            .entry(r.product.as_str())
            .or_default()
            .entry(r.date)
            .or_insert(0.0) += r.quantity;
    }

    let mut out = Vec::new();
    for item in inventory {
        let Some(daily) = per_product_daily.get(item.name.as_str()) else {
            continue;
        };

        let avg_demand = daily.values().sum::<f64>() / daily.len() as f64;
        if avg_demand <= 0.0 {
            continue;
        }

        let days_remaining = item.current_stock / avg_demand;
        let urgency = if item.current_stock <= item.min_stock {
            RestockUrgency::Critical
        } else if days_remaining < HIGH_URGENCY_DAYS {
            RestockUrgency::High
        } else if days_remaining < MEDIUM_URGENCY_DAYS {
            RestockUrgency::Medium
        } else {
            continue;
        };

        let suggested_order_qty = item.reorder_qty.max((avg_demand * REORDER_COVER_DAYS).ceil());
        let reason = match urgency {
            RestockUrgency::Critical => format!(
                "stock ({}) is at or below the minimum level ({})",
                item.current_stock, item.min_stock
            ),
            RestockUrgency::High | RestockUrgency::Medium => format!(
                "about {days_remaining:.1} days of stock left at {avg_demand:.1} units/day"
            ),
        };

        out.push(RestockRecommendation {
            product: item.name.clone(),
            urgency,
            current_stock: item.current_stock,
            avg_daily_demand: avg_demand,
            days_remaining,
            suggested_order_qty,
            reason,
        });
    }

    out
}

// =============================================================================
// Pricing
// =============================================================================

/// Pricing actions per inventory item with a known selling price.
///
/// The demand thresholds are the 80th/20th percentiles of the per-product
/// total-quantity distribution. Rules run in order, first match wins;
/// items priced at zero are skipped entirely (their margin is undefined).
#[must_use]
pub fn pricing(
    sales: &[SalesRecord],
    inventory: &[InventoryRecord],
) -> Vec<PricingRecommendation> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for r in sales {
        *totals.entry(r.product.as_str()).or_insert(0.0) += r.quantity;
    }

    let mut distribution: Vec<f64> = totals.values().copied().collect();
    distribution.sort_by(f64::total_cmp);
    let p_high = quantile(&distribution, PEAK_PERCENTILE);
    let p_low = quantile(&distribution, NON_PEAK_PERCENTILE);

    let mut out = Vec::new();
    for item in inventory {
        let Some(margin) = item.selling_margin() else {
            continue;
        };
        let quantity = totals.get(item.name.as_str()).copied().unwrap_or(0.0);

        let (action, reason) = if p_high.is_some_and(|p| quantity >= p) && margin > STRONG_MARGIN {
            (
                PricingAction::Increase,
                format!(
                    "top-seller ({quantity:.0} units) with a {:.0}% margin, consider a 5% price increase",
                    margin * 100.0
                ),
            )
        } else if p_low.is_some_and(|p| quantity <= p) && item.current_stock > DISCOUNT_STOCK_FLOOR
        {
            (
                PricingAction::Discount,
                format!(
                    "slow mover with {:.0} units in stock, consider a 5-10% discount",
                    item.current_stock
                ),
            )
        } else if margin < WEAK_MARGIN {
            (
                PricingAction::Review,
                format!("margin {:.0}% is below 10%, review pricing strategy", margin * 100.0),
            )
        } else {
            continue;
        };

        out.push(PricingRecommendation {
            product: item.name.clone(),
            action,
            selling_price: item.selling_price,
            margin,
            total_quantity_sold: quantity,
            reason,
        });
    }

    out
}

// =============================================================================
// Bundling
// =============================================================================

/// Product-pair bundling suggestions from invoice co-occurrence.
///
/// Needs a transaction identifier on the sales rows; feeds without one
/// yield an empty list. Products are deduplicated within each invoice and
/// pair identity is order-independent, so `[A, B]` and `[B, A]` count into
/// the same entry.
#[must_use]
pub fn bundling(sales: &[SalesRecord]) -> Vec<BundleRecommendation> {
    let mut invoices: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for r in sales {
        let Some(invoice) = r.invoice_id.as_deref() else {
            continue;
        };
        invoices.entry(invoice).or_default().insert(r.product.as_str());
    }

    let mut pair_counts: HashMap<(&str, &str), u64> = HashMap::new();
    for products in invoices.values() {
        let products: Vec<&str> = products.iter().copied().collect();
        for (i, a) in products.iter().enumerate() {
            for b in products.iter().skip(i + 1) {
                // BTreeSet iteration is sorted, so (a, b) is already the
                // canonical orientation of the pair
                *pair_counts.entry((a, b)).or_insert(0) += 1;
            }
        }
    }

    let mut pairs: Vec<((&str, &str), u64)> = pair_counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs.truncate(TOP_BUNDLES);

    pairs
        .into_iter()
        .map(|((a, b), count)| BundleRecommendation {
            products: [a.to_string(), b.to_string()],
            times_bought_together: count,
            suggested_discount_pct: BUNDLE_DISCOUNT_PCT,
            reason: format!("{a} and {b} were bought together in {count} transactions"),
        })
        .collect()
}
