//! Restock, pricing and bundling recommendations.

use serde::{Deserialize, Serialize};

/// How urgently an item needs restocking.
///
/// Ordered from most to least urgent; the classifier applies the checks in
/// this order and the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestockUrgency {
    /// Stock is at or below the configured minimum.
    Critical,
    /// Under a week of projected demand remains.
    High,
    /// Under two weeks of projected demand remains.
    Medium,
}

impl RestockUrgency {
    /// Display label for responses.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
        }
    }
}

/// A restock suggestion for a single inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestockRecommendation {
    /// Product the recommendation applies to.
    pub product: String,
    /// Urgency tier.
    pub urgency: RestockUrgency,
    /// Units currently on hand.
    pub current_stock: f64,
    /// Average units sold per active sales day.
    pub avg_daily_demand: f64,
    /// Projected days of cover at the current demand rate.
    pub days_remaining: f64,
    /// Suggested reorder quantity (at least two weeks of demand).
    pub suggested_order_qty: f64,
    /// Human-readable justification.
    pub reason: String,
}

/// Pricing action suggested for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingAction {
    /// High demand and healthy margin: raise the price ~5%.
    Increase,
    /// Slow mover with stock piling up: discount 5-10%.
    Discount,
    /// Margin too thin to be sustainable: review the pricing strategy.
    Review,
}

/// A pricing suggestion for a single inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRecommendation {
    /// Product the recommendation applies to.
    pub product: String,
    /// Suggested action.
    pub action: PricingAction,
    /// Current selling price.
    pub selling_price: f64,
    /// Selling margin ratio at the current prices.
    pub margin: f64,
    /// Total units sold over the analyzed window.
    pub total_quantity_sold: f64,
    /// Human-readable justification.
    pub reason: String,
}

/// A product-pair bundling suggestion mined from invoice co-occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleRecommendation {
    /// The two products, in lexical order.
    pub products: [String; 2],
    /// Number of invoices containing both products.
    pub times_bought_together: u64,
    /// Flat suggested bundle discount, percent.
    pub suggested_discount_pct: f64,
    /// Human-readable justification.
    pub reason: String,
}

/// A single recommendation of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recommendation {
    /// Inventory is running out.
    Restock(RestockRecommendation),
    /// Price looks misaligned with demand or margin.
    Pricing(PricingRecommendation),
    /// Products frequently bought together.
    Bundle(BundleRecommendation),
}

/// The full output of the recommendation engine.
///
/// Every list may be empty; a missing prerequisite (no inventory feed, no
/// invoice column) empties the affected list without touching its siblings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    /// Restock urgency suggestions.
    pub restock: Vec<RestockRecommendation>,
    /// Pricing suggestions.
    pub pricing: Vec<PricingRecommendation>,
    /// Bundling suggestions.
    pub bundling: Vec<BundleRecommendation>,
}

impl RecommendationSet {
    /// Flatten into a single tagged stream, restock first.
    #[must_use]
    pub fn into_recommendations(self) -> Vec<Recommendation> {
        let mut all = Vec::with_capacity(
            self.restock.len() + self.pricing.len() + self.bundling.len(),
        );
        all.extend(self.restock.into_iter().map(Recommendation::Restock));
        all.extend(self.pricing.into_iter().map(Recommendation::Pricing));
        all.extend(self.bundling.into_iter().map(Recommendation::Bundle));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_labels() {
        assert_eq!(RestockUrgency::Critical.label(), "Critical");
        assert_eq!(RestockUrgency::High.label(), "High");
        assert_eq!(RestockUrgency::Medium.label(), "Medium");
    }

    #[test]
    fn test_empty_set_flattens_to_empty() {
        assert!(RecommendationSet::default().into_recommendations().is_empty());
    }

    #[test]
    fn test_flatten_preserves_kind_order() {
        let set = RecommendationSet {
            restock: vec![RestockRecommendation {
                product: "Widget".to_string(),
                urgency: RestockUrgency::Critical,
                current_stock: 1.0,
                avg_daily_demand: 2.0,
                days_remaining: 0.5,
                suggested_order_qty: 28.0,
                reason: "stock at or below minimum".to_string(),
            }],
            pricing: vec![],
            bundling: vec![BundleRecommendation {
                products: ["Bolt".to_string(), "Nut".to_string()],
                times_bought_together: 4,
                suggested_discount_pct: 10.0,
                reason: "frequently bought together".to_string(),
            }],
        };

        let all = set.into_recommendations();
        assert_eq!(all.len(), 2);
        assert!(matches!(all.first(), Some(Recommendation::Restock(_))));
        assert!(matches!(all.get(1), Some(Recommendation::Bundle(_))));
    }
}
