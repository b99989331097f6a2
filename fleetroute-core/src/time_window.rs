//! Normalised service time windows.
//!
//! A [`TimeWindow`] is constructed once at the request boundary so the
//! solvers never chase optional-field fallback chains. Construction
//! validates ordering; downstream code can rely on `earliest <= latest`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by [`TimeWindow::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeWindowError {
    /// `latest` precedes `earliest`.
    #[error("time window closes before it opens ({latest} < {earliest})")]
    Inverted {
        /// Window open instant.
        earliest: DateTime<Utc>,
        /// Window close instant.
        latest: DateTime<Utc>,
    },
}

/// An inclusive `[earliest, latest]` service interval.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use fleetroute_core::TimeWindow;
///
/// let open = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
/// let close = Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap();
/// let window = TimeWindow::new(open, close)?;
/// assert_eq!(window.duration_minutes(), 540.0);
/// # Ok::<(), fleetroute_core::TimeWindowError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Earliest permissible service instant.
    pub earliest: DateTime<Utc>,
    /// Latest permissible service instant.
    pub latest: DateTime<Utc>,
}

impl TimeWindow {
    /// Validates ordering and constructs a window.
    pub fn new(earliest: DateTime<Utc>, latest: DateTime<Utc>) -> Result<Self, TimeWindowError> {
        if latest < earliest {
            return Err(TimeWindowError::Inverted { earliest, latest });
        }
        Ok(Self { earliest, latest })
    }

    /// Whether `at` falls inside the window, boundaries included.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.earliest <= at && at <= self.latest
    }

    /// Window length in fractional minutes.
    #[must_use]
    pub fn duration_minutes(&self) -> f64 {
        (self.latest - self.earliest).num_seconds() as f64 / 60.0
    }

    /// Whether two windows share at least one instant.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.earliest <= other.latest && other.earliest <= self.latest
    }
}
