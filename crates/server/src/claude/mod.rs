//! Claude API integration for insight narration.
//!
//! The text-generation collaborator behind the `summarize_insights`
//! endpoint. Exposes exactly two operations:
//!
//! - [`ClaudeClient::generate_prose`] - free-form insight/recommendation text
//! - [`ClaudeClient::generate_structured`] - a strict JSON object parsed
//!   from the response
//!
//! The collaborator is optional and unreliable by contract: the client is
//! only constructed when an API key is configured, requests carry a
//! timeout, and every failure surfaces as a [`ClaudeError`] the caller
//! reports as a degraded response field. Narration never blocks or corrupts
//! the numeric parts of a response.

pub mod client;
pub mod error;
pub mod types;

pub use client::ClaudeClient;
pub use error::ClaudeError;
