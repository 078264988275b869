//! Integration test support for Shopsight.
//!
//! Builders for raw dataset rows and a router wired to an in-memory data
//! store, so tests exercise the full request path without touching the
//! filesystem or the network.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use serde_json::{Value, json};
use shopsight_server::config::ServerConfig;
use shopsight_server::routes;
use shopsight_server::state::AppState;
use shopsight_server::store::MemoryStore;

/// A raw sales row as the upstream feed would deliver it.
#[must_use]
pub fn sales_row(date: &str, product: &str, price: f64, quantity: f64) -> Value {
    json!({
        "date": date,
        "product": product,
        "category": "X",
        "item_type": "Unknown",
        "price": price,
        "cost": price / 2.0,
        "quantity": quantity,
    })
}

/// A raw inventory row as the upstream feed would deliver it.
#[must_use]
pub fn inventory_row(
    name: &str,
    current_stock: f64,
    min_stock: f64,
    reorder_qty: f64,
    buying_price: f64,
    selling_price: f64,
) -> Value {
    json!({
        "name": name,
        "currentStock": current_stock,
        "minStock": min_stock,
        "reorderQty": reorder_qty,
        "buyingPrice": buying_price,
        "sellingPrice": selling_price,
    })
}

/// A server configuration for tests; no narration, no Sentry.
#[must_use]
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".parse::<IpAddr>().expect("valid address"),
        port: 0,
        sales_data_path: PathBuf::from("unused-in-tests.json"),
        inventory_data_path: None,
        claude: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 1.0,
    }
}

/// Build the service router over an in-memory dataset.
#[must_use]
pub fn app(sales: Vec<Value>, inventory: Vec<Value>) -> Router {
    let state = AppState::new(test_config(), Arc::new(MemoryStore::new(sales, inventory)));
    routes::router().with_state(state)
}
