//! Histogram-style bucketing for chart rendering.
//!
//! Buckets are fixed and mutually exclusive: every input lands in exactly
//! one, so bucket counts always sum to the input length. Normalization
//! denominators are floored at 1 so an all-empty histogram renders as
//! zeros instead of dividing by zero.

use chrono::{Datelike, Timelike};
use serde::Serialize;

use revlens_core::Review;

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Upper bounds (exclusive) of the response-time buckets, in hours.
/// The last bucket is unbounded above.
const RESPONSE_TIME_BOUNDS: [f64; 4] = [2.0, 6.0, 12.0, 24.0];

pub const RESPONSE_TIME_LABELS: [&str; 5] = ["< 2h", "2-6h", "6-12h", "12-24h", "> 24h"];

/// One day-of-week bucket. `normalized` scales the count to the busiest
/// day (0-100) for bar-chart rendering.
#[derive(Debug, Clone, Serialize)]
pub struct DayOfWeekBucket {
    pub day: &'static str,
    pub count: usize,
    pub normalized: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseTimeBucket {
    pub label: &'static str,
    pub count: usize,
}

/// One populated cell of the hour-of-day × day-of-week heatmap.
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapCell {
    /// Day of week, Sunday = 0 … Saturday = 6.
    pub day: u32,
    /// Hour of day, 0-23.
    pub hour: u32,
    pub count: usize,
    /// `count / max(all cell counts)`, in `(0, 1]`.
    pub intensity: f64,
}

/// Partition reviews into the 7 calendar weekday buckets (UTC),
/// Sunday = 0 through Saturday = 6.
#[must_use]
pub fn day_of_week_histogram(reviews: &[Review]) -> [DayOfWeekBucket; 7] {
    let mut counts = [0_usize; 7];
    for review in reviews {
        let idx = review.posted_at.weekday().num_days_from_sunday() as usize;
        counts[idx] += 1;
    }

    let max = counts.iter().copied().max().unwrap_or(0).max(1);
    std::array::from_fn(|i| DayOfWeekBucket {
        day: DAY_NAMES[i],
        count: counts[i],
        normalized: ratio(counts[i], max) * 100.0,
    })
}

/// Classify response durations (hours) into the five fixed ranges
/// `[0,2) [2,6) [6,12) [12,24) [24,∞)`.
///
/// Boundaries are inclusive-low, exclusive-high: exactly 2.0 hours falls
/// in the second bucket.
#[must_use]
pub fn response_time_histogram(hours: &[f64]) -> [ResponseTimeBucket; 5] {
    let mut counts = [0_usize; 5];
    for &h in hours {
        let idx = RESPONSE_TIME_BOUNDS
            .iter()
            .position(|&bound| h < bound)
            .unwrap_or(RESPONSE_TIME_BOUNDS.len());
        counts[idx] += 1;
    }

    std::array::from_fn(|i| ResponseTimeBucket {
        label: RESPONSE_TIME_LABELS[i],
        count: counts[i],
    })
}

/// Sparse `(day, hour) → count` heatmap with per-cell intensity relative
/// to the busiest cell. Cells are ordered by `(day, hour)` for stable
/// output; empty cells are omitted.
#[must_use]
pub fn hour_day_heatmap(reviews: &[Review]) -> Vec<HeatmapCell> {
    let mut counts = std::collections::BTreeMap::<(u32, u32), usize>::new();
    for review in reviews {
        let day = review.posted_at.weekday().num_days_from_sunday();
        let hour = review.posted_at.hour();
        *counts.entry((day, hour)).or_insert(0) += 1;
    }

    let max = counts.values().copied().max().unwrap_or(0).max(1);
    counts
        .into_iter()
        .map(|((day, hour), count)| HeatmapCell {
            day,
            hour,
            count,
            intensity: ratio(count, max),
        })
        .collect()
}

fn ratio(part: usize, whole: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let r = part as f64 / whole as f64;
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::review;
    use revlens_core::Sentiment;

    #[test]
    fn day_histogram_keys_sunday_zero() {
        // 2026-03-01 is a Sunday, 2026-03-04 a Wednesday.
        let reviews = vec![
            review(5, Sentiment::Positive, "2026-03-01T09:00:00Z"),
            review(4, Sentiment::Positive, "2026-03-01T18:00:00Z"),
            review(3, Sentiment::Neutral, "2026-03-04T12:00:00Z"),
        ];
        let buckets = day_of_week_histogram(&reviews);
        assert_eq!(buckets[0].day, "Sunday");
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[3].count, 1);
        assert_eq!(buckets[0].normalized, 100.0);
        assert_eq!(buckets[3].normalized, 50.0);
    }

    #[test]
    fn day_histogram_counts_sum_to_input_length() {
        let reviews: Vec<_> = (1..=9)
            .map(|d| {
                review(
                    4,
                    Sentiment::Positive,
                    &format!("2026-03-0{}T10:00:00Z", (d % 9) + 1),
                )
            })
            .collect();
        let buckets = day_of_week_histogram(&reviews);
        let total: usize = buckets.iter().map(|b| b.count).sum();
        assert_eq!(total, reviews.len());
    }

    #[test]
    fn day_histogram_empty_input_normalizes_to_zero() {
        let buckets = day_of_week_histogram(&[]);
        for b in buckets {
            assert_eq!(b.count, 0);
            assert_eq!(b.normalized, 0.0);
            assert!(b.normalized.is_finite());
        }
    }

    #[test]
    fn response_time_boundary_is_inclusive_low() {
        let buckets = response_time_histogram(&[2.0]);
        assert_eq!(buckets[0].count, 0, "2.0 must not land in [0,2)");
        assert_eq!(buckets[1].count, 1, "2.0 belongs to [2,6)");
    }

    #[test]
    fn response_time_every_duration_lands_once() {
        let hours = [0.0, 1.99, 2.0, 5.5, 6.0, 11.9, 12.0, 23.9, 24.0, 240.0];
        let buckets = response_time_histogram(&hours);
        let total: usize = buckets.iter().map(|b| b.count).sum();
        assert_eq!(total, hours.len());
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[1].count, 2);
        assert_eq!(buckets[2].count, 2);
        assert_eq!(buckets[3].count, 2);
        assert_eq!(buckets[4].count, 2, "last bucket is unbounded above");
    }

    #[test]
    fn heatmap_is_sparse_and_scaled() {
        let reviews = vec![
            review(5, Sentiment::Positive, "2026-03-01T09:15:00Z"),
            review(4, Sentiment::Positive, "2026-03-01T09:45:00Z"),
            review(3, Sentiment::Neutral, "2026-03-02T20:00:00Z"),
        ];
        let cells = hour_day_heatmap(&reviews);
        assert_eq!(cells.len(), 2, "only populated cells appear");
        let sunday_nine = &cells[0];
        assert_eq!((sunday_nine.day, sunday_nine.hour), (0, 9));
        assert_eq!(sunday_nine.count, 2);
        assert_eq!(sunday_nine.intensity, 1.0);
        let monday_eight_pm = &cells[1];
        assert_eq!((monday_eight_pm.day, monday_eight_pm.hour), (1, 20));
        assert_eq!(monday_eight_pm.intensity, 0.5);
    }

    #[test]
    fn heatmap_empty_input_yields_no_cells() {
        assert!(hour_day_heatmap(&[]).is_empty());
    }
}
