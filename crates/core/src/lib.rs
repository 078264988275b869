//! Shopsight Core - Shared domain types.
//!
//! This crate provides common types used across all Shopsight components:
//! - `server` - The read-only analytics, forecasting and recommendation service
//! - `integration-tests` - Cross-module scenarios over the engine and HTTP surface
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Sales/inventory records, daily series, forecast results,
//!   recommendations and period parsing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
