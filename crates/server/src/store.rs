//! Data access handle for the source dataset.
//!
//! The service is read-only analytics: each request takes a fresh snapshot
//! of the raw sales and inventory rows through an explicit [`DataStore`]
//! handle owned by the application state. There is no ambient connection
//! and no caching; the source data is owned by the external data store.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Errors from reading the source dataset.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading the backing file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The backing file was not valid JSON.
    #[error("malformed data in {path}: {source}")]
    Malformed {
        /// Path that failed to parse.
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backing file parsed but was not an array of rows.
    #[error("expected a JSON array of rows in {path}")]
    NotAnArray {
        /// Path with the wrong shape.
        path: String,
    },
}

/// Read-only access to the raw tabular dataset.
///
/// Rows are schemaless JSON maps; the normalizer is responsible for turning
/// them into typed records. Implementations must be cheap to call per
/// request - the service snapshots the full dataset every time.
pub trait DataStore: Send + Sync {
    /// Fetch all raw sales rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source cannot be read or parsed.
    fn fetch_sales(&self) -> Result<Vec<Value>, StoreError>;

    /// Fetch all raw inventory rows.
    ///
    /// Implementations without an inventory feed return an empty list;
    /// inventory-dependent analyses degrade rather than fail.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source cannot be read or parsed.
    fn fetch_inventory(&self) -> Result<Vec<Value>, StoreError>;
}

/// A [`DataStore`] backed by JSON files exported from the upstream system.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    sales_path: PathBuf,
    inventory_path: Option<PathBuf>,
}

impl JsonFileStore {
    /// Create a store reading from the given file paths.
    #[must_use]
    pub fn new(sales_path: PathBuf, inventory_path: Option<PathBuf>) -> Self {
        Self {
            sales_path,
            inventory_path,
        }
    }
}

impl DataStore for JsonFileStore {
    fn fetch_sales(&self) -> Result<Vec<Value>, StoreError> {
        read_rows(&self.sales_path)
    }

    fn fetch_inventory(&self) -> Result<Vec<Value>, StoreError> {
        match &self.inventory_path {
            Some(path) => read_rows(path),
            None => Ok(Vec::new()),
        }
    }
}

/// Read a JSON file containing an array of row objects.
fn read_rows(path: &Path) -> Result<Vec<Value>, StoreError> {
    let display = path.display().to_string();

    let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: display.clone(),
        source,
    })?;

    let parsed: Value = serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
        path: display.clone(),
        source,
    })?;

    match parsed {
        Value::Array(rows) => Ok(rows),
        _ => Err(StoreError::NotAnArray { path: display }),
    }
}

/// An in-memory [`DataStore`] for tests and embedded use.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sales: Vec<Value>,
    inventory: Vec<Value>,
}

impl MemoryStore {
    /// Create a store over the given raw rows.
    #[must_use]
    pub const fn new(sales: Vec<Value>, inventory: Vec<Value>) -> Self {
        Self { sales, inventory }
    }
}

impl DataStore for MemoryStore {
    fn fetch_sales(&self) -> Result<Vec<Value>, StoreError> {
        Ok(self.sales.clone())
    }

    fn fetch_inventory(&self) -> Result<Vec<Value>, StoreError> {
        Ok(self.inventory.clone())
    }
}
