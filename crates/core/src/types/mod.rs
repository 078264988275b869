//! Core types for Shopsight.
//!
//! Everything here is derived per request from the source dataset; nothing
//! is persisted by the service itself.

pub mod forecast;
pub mod period;
pub mod recommendation;
pub mod record;
pub mod series;

pub use forecast::{ForecastMetadata, ForecastRegime, ForecastResult};
pub use period::{Period, PeriodParseError};
pub use recommendation::{
    BundleRecommendation, PricingAction, PricingRecommendation, Recommendation, RecommendationSet,
    RestockRecommendation, RestockUrgency,
};
pub use record::{InventoryRecord, SalesRecord};
pub use series::DailySeries;
