//! Reporting periods for aggregate queries.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected period parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid period '{0}', expected one of: weekly, monthly, yearly")]
pub struct PeriodParseError(pub String);

/// Calendar period used to bucket records for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// ISO week-of-year buckets.
    Weekly,
    /// Calendar month buckets.
    Monthly,
    /// Calendar year buckets.
    Yearly,
}

impl Period {
    /// Bucket key for a date under this period.
    ///
    /// Weekly keys pair the ISO week-year with the ISO week number, so the
    /// days around a year boundary land in a single bucket.
    #[must_use]
    pub fn bucket(self, date: NaiveDate) -> String {
        match self {
            Self::Weekly => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Self::Monthly => format!("{}-{:02}", date.year(), date.month()),
            Self::Yearly => format!("{}", date.year()),
        }
    }

    /// Display label for responses.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(PeriodParseError(other.to_string())),
        }
    }
}
