//! Half-open time windows for period-over-period comparisons.

use chrono::{DateTime, Duration, Utc};

/// A half-open interval `[start, end)` over review posting times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The window covering the `days` days ending at `end` (exclusive).
    #[must_use]
    pub fn last_days(end: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    /// The window of equal length immediately before this one.
    ///
    /// Non-overlapping by construction: `preceding().end == self.start`.
    #[must_use]
    pub fn preceding(&self) -> Self {
        let length = self.end - self.start;
        Self {
            start: self.start - length,
            end: self.start,
        }
    }

    /// Inclusive-low, exclusive-high membership test.
    #[must_use]
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }

    /// Window length in fractional days. Zero or negative for degenerate
    /// windows; callers guard before dividing.
    #[must_use]
    pub fn days(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let secs = (self.end - self.start).num_seconds() as f64;
        secs / 86_400.0
    }
}
