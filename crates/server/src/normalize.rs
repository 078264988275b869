//! Dataset normalization.
//!
//! Raw rows arrive as schemaless JSON maps with columns that may be absent,
//! null, or the wrong type. Normalization never rejects a row - it degrades
//! it, filling every missing or unparseable column from a fixed default
//! policy so that a report is always available:
//!
//! | column | default |
//! |---|---|
//! | `date` | today |
//! | `price`, `cost` | 0 |
//! | `quantity` | 1 |
//! | `product`, `category`, `item_type` | "Unknown" |
//! | `invoice_id` | none |

use chrono::NaiveDate;
use serde_json::Value;
use shopsight_core::{InventoryRecord, SalesRecord};

const UNKNOWN: &str = "Unknown";

/// Normalize raw sales rows into fully-populated records.
///
/// Pure function of the input rows (and the current date, used only to fill
/// missing sale dates).
#[must_use]
pub fn normalize_sales(rows: &[Value]) -> Vec<SalesRecord> {
    let today = chrono::Utc::now().date_naive();
    normalize_sales_with_today(rows, today)
}

/// Normalization with an explicit "today" for the missing-date default.
#[must_use]
pub fn normalize_sales_with_today(rows: &[Value], today: NaiveDate) -> Vec<SalesRecord> {
    rows.iter()
        .map(|row| SalesRecord {
            date: date_field(row, "date").unwrap_or(today),
            product: string_field(row, "product"),
            category: string_field(row, "category"),
            item_type: string_field(row, "item_type"),
            price: number_field(row, "price", 0.0),
            cost: number_field(row, "cost", 0.0),
            quantity: number_field(row, "quantity", 1.0),
            invoice_id: optional_string_field(row, "invoice_id"),
        })
        .collect()
}

/// Normalize raw inventory rows into fully-populated records.
#[must_use]
pub fn normalize_inventory(rows: &[Value]) -> Vec<InventoryRecord> {
    rows.iter()
        .map(|row| InventoryRecord {
            name: string_field(row, "name"),
            current_stock: number_field(row, "currentStock", 0.0),
            min_stock: number_field(row, "minStock", 0.0),
            reorder_qty: number_field(row, "reorderQty", 0.0),
            buying_price: number_field(row, "buyingPrice", 0.0),
            selling_price: number_field(row, "sellingPrice", 0.0),
        })
        .collect()
}

/// Read a string column, defaulting to "Unknown".
fn string_field(row: &Value, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => UNKNOWN.to_string(),
    }
}

/// Read an optional string column; missing, null or empty means absent.
fn optional_string_field(row: &Value, key: &str) -> Option<String> {
    match row.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Read a numeric column as a JSON number or numeric string.
///
/// Unparseable and non-finite values coerce to the column default.
fn number_field(row: &Value, key: &str, default: f64) -> f64 {
    let parsed = match row.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => v,
        _ => default,
    }
}

/// Read a date column as `YYYY-MM-DD`, accepting a full timestamp prefix
/// (the upstream export stamps sale dates as RFC 3339 datetimes).
fn date_field(row: &Value, key: &str) -> Option<NaiveDate> {
    let raw = row.get(key)?.as_str()?;
    let prefix = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}
