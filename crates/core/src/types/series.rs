//! Gap-filled daily time series.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// An ordered daily series with one entry per calendar day.
///
/// The series spans the full inclusive range between its first and last
/// observed date with no gaps; days with no underlying activity carry 0.
/// The weekly seasonal forecaster and the rolling spike windows both assume
/// this fixed-period grid, so the invariant is enforced at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    points: Vec<(NaiveDate, f64)>,
}

impl DailySeries {
    /// Build a gap-filled series from per-day totals.
    ///
    /// Every calendar day between the earliest and latest key is present in
    /// the result, zero-filled where the input has no entry. An empty input
    /// yields an empty series.
    #[must_use]
    pub fn gap_filled(totals: &BTreeMap<NaiveDate, f64>) -> Self {
        let (Some((&first, _)), Some((&last, _))) =
            (totals.first_key_value(), totals.last_key_value())
        else {
            return Self::default();
        };

        let mut points = Vec::new();
        let mut day = first;
        loop {
            points.push((day, totals.get(&day).copied().unwrap_or(0.0)));
            if day == last {
                break;
            }
            let Some(next) = day.checked_add_days(Days::new(1)) else {
                break;
            };
            day = next;
        }

        Self { points }
    }

    /// Number of days in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no days.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The (date, value) points in calendar order.
    #[must_use]
    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    /// The values in calendar order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }

    /// The last date in the series, if any.
    #[must_use]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|(d, _)| *d)
    }

    /// Arithmetic mean of the values. Zero for an empty series.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Day counts will never exceed f64 precision
    pub fn mean(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.iter().map(|(_, v)| v).sum::<f64>() / self.points.len() as f64
    }

    /// Sample standard deviation of the values.
    ///
    /// Returns `None` for series shorter than two days, where the sample
    /// deviation is undefined.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Day counts will never exceed f64 precision
    pub fn sample_std(&self) -> Option<f64> {
        if self.points.len() < 2 {
            return None;
        }
        let mean = self.mean();
        let ss: f64 = self.points.iter().map(|(_, v)| (v - mean).powi(2)).sum();
        Some((ss / (self.points.len() - 1) as f64).sqrt())
    }
}
