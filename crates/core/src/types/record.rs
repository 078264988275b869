//! Normalized sales and inventory records.
//!
//! Raw source rows are schemaless JSON maps; the server's normalizer turns
//! them into these fully-populated records. Derived monetary fields are
//! always recomputed from price/cost/quantity, never stored independently.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single normalized sales transaction row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Calendar date of the sale.
    pub date: NaiveDate,
    /// Product identifier (joins to [`InventoryRecord::name`]).
    pub product: String,
    /// Product category.
    pub category: String,
    /// Item type (a second, coarser grouping axis).
    pub item_type: String,
    /// Unit sale price.
    pub price: f64,
    /// Unit cost.
    pub cost: f64,
    /// Units sold in this row.
    pub quantity: f64,
    /// Transaction/invoice identifier, when the feed carries one.
    /// Absent in most feeds - bundling analysis degrades without it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
}

impl SalesRecord {
    /// Revenue for this row (price x quantity).
    #[must_use]
    pub fn revenue(&self) -> f64 {
        self.price * self.quantity
    }

    /// Total cost for this row (cost x quantity).
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.cost * self.quantity
    }

    /// Profit for this row (revenue - total cost).
    #[must_use]
    pub fn profit(&self) -> f64 {
        self.revenue() - self.total_cost()
    }

    /// Profit margin as a ratio of revenue.
    ///
    /// Returns `None` when revenue is zero. A zero-revenue row has no
    /// defined margin; representing it as 0.0 would corrupt averages.
    #[must_use]
    pub fn margin(&self) -> Option<f64> {
        let revenue = self.revenue();
        if revenue > 0.0 {
            Some(self.profit() / revenue)
        } else {
            None
        }
    }
}

/// A single normalized inventory row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Item name (joins to [`SalesRecord::product`]).
    pub name: String,
    /// Units currently on hand.
    pub current_stock: f64,
    /// Minimum stock level before the item is considered critical.
    pub min_stock: f64,
    /// Standing reorder quantity configured for the item.
    pub reorder_qty: f64,
    /// Unit purchase price.
    pub buying_price: f64,
    /// Unit selling price. Zero means "unknown" and excludes the item
    /// from margin-based pricing analysis.
    pub selling_price: f64,
}

impl InventoryRecord {
    /// Selling margin as a ratio of the selling price.
    ///
    /// Returns `None` when the selling price is zero or negative.
    #[must_use]
    pub fn selling_margin(&self) -> Option<f64> {
        if self.selling_price > 0.0 {
            Some((self.selling_price - self.buying_price) / self.selling_price)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(price: f64, cost: f64, quantity: f64) -> SalesRecord {
        SalesRecord {
            date: NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date"),
            product: "Widget".to_string(),
            category: "X".to_string(),
            item_type: "Unknown".to_string(),
            price,
            cost,
            quantity,
            invoice_id: None,
        }
    }

    #[test]
    fn test_derived_fields() {
        let r = record(10.0, 4.0, 3.0);
        assert!((r.revenue() - 30.0).abs() < f64::EPSILON);
        assert!((r.total_cost() - 12.0).abs() < f64::EPSILON);
        assert!((r.profit() - 18.0).abs() < f64::EPSILON);
        assert!((r.margin().expect("margin defined") - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_margin_undefined_for_zero_revenue() {
        // A giveaway row has no margin, not a zero margin
        assert_eq!(record(0.0, 4.0, 3.0).margin(), None);
        assert_eq!(record(10.0, 4.0, 0.0).margin(), None);
    }

    #[test]
    fn test_selling_margin_guard() {
        let item = InventoryRecord {
            name: "Widget".to_string(),
            current_stock: 10.0,
            min_stock: 2.0,
            reorder_qty: 5.0,
            buying_price: 6.0,
            selling_price: 0.0,
        };
        assert_eq!(item.selling_margin(), None);

        let priced = InventoryRecord {
            selling_price: 10.0,
            ..item
        };
        assert!((priced.selling_margin().expect("margin defined") - 0.4).abs() < 1e-12);
    }
}
