//! Shopsight server library.
//!
//! This crate provides the analytics service as a library, allowing the
//! engine and HTTP surface to be tested without a running process.
//!
//! # Architecture
//!
//! - Axum web framework serving four read-only query endpoints
//! - A [`store::DataStore`] handle snapshotting the source dataset per request
//! - Pure engine modules (normalize, metrics, forecast, recommend, narrate)
//! - Claude API for optional insight narration
//!
//! Every request independently loads the full dataset, computes in memory
//! and returns; the service never mutates source data.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod claude;
pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod routes;
pub mod state;
pub mod store;
