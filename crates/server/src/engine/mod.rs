//! The analytics engine.
//!
//! Pure, synchronous computation over normalized records. Data flows one
//! way: normalized rows feed the metrics calculator, the forecast engine
//! and the recommendation engine independently; the narrator renders their
//! numeric output into text. No module here performs I/O.

pub mod forecast;
pub mod metrics;
pub mod narrate;
pub mod recommend;
