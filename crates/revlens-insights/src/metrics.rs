//! Scalar KPI aggregation over review snapshots.
//!
//! All ratios follow one convention: a zero denominator yields `0`, never
//! `NaN` or infinity. Averages are exposed unrounded; one-decimal rounding
//! via [`round1`] is a display concern only.

use serde::Serialize;

use revlens_core::{Platform, Review, ReviewStatus, Sentiment};

use crate::window::TimeWindow;

/// KPIs for one review snapshot (optionally restricted to a window).
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricSet {
    pub total: usize,
    /// Arithmetic mean rating, unrounded. `0.0` when empty.
    pub average_rating: f64,
    /// Percentage (0-100) of reviews with any non-pending status.
    pub response_rate: f64,
    /// Percentage (0-100) of reviews with positive sentiment.
    pub positive_rate: f64,
    /// Reviews per day over the window (or the snapshot's own span).
    pub velocity: f64,
    pub pending: usize,
    /// Reviews rated 2 stars or fewer.
    pub low_rated: usize,
}

/// Period-over-period movement of a single metric value.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Trend {
    pub delta: f64,
    /// `delta / previous × 100`, `0` when the previous value is zero.
    pub percent: f64,
}

/// Review volume contributed by one platform.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformShare {
    pub platform: Platform,
    pub count: usize,
    /// Percentage (0-100) of the whole snapshot.
    pub share: f64,
}

/// Sentiment distribution as percentages (0-100 each).
#[derive(Debug, Clone, Default, Serialize)]
pub struct SentimentBreakdown {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

/// Compute all scalar KPIs over a snapshot.
///
/// With a window, only reviews whose `posted_at` falls in `[start, end)`
/// count, and velocity divides by the window length. Without one, velocity
/// divides by the snapshot's own posting-time span, floored at one day.
/// Empty input yields an all-zero [`MetricSet`].
#[must_use]
pub fn compute_metrics(reviews: &[Review], window: Option<TimeWindow>) -> MetricSet {
    let selected: Vec<&Review> = match window {
        Some(w) => reviews.iter().filter(|r| w.contains(r.posted_at)).collect(),
        None => reviews.iter().collect(),
    };

    let total = selected.len();
    if total == 0 {
        return MetricSet::default();
    }

    let rating_sum: u32 = selected.iter().map(|r| u32::from(r.rating)).sum();
    let responded = selected.iter().filter(|r| r.is_responded()).count();
    let positive = selected
        .iter()
        .filter(|r| r.sentiment == Sentiment::Positive)
        .count();
    let pending = selected
        .iter()
        .filter(|r| r.status == ReviewStatus::Pending)
        .count();
    let low_rated = selected.iter().filter(|r| r.rating <= 2).count();

    let days = match window {
        Some(w) => w.days(),
        None => span_days(&selected),
    };

    #[allow(clippy::cast_precision_loss)]
    let total_f = total as f64;

    MetricSet {
        total,
        average_rating: f64::from(rating_sum) / total_f,
        response_rate: percentage(responded, total),
        positive_rate: percentage(positive, total),
        velocity: if days > 0.0 { total_f / days } else { 0.0 },
        pending,
        low_rated,
    }
}

/// Movement from `previous` to `current` with the standard zero-guard.
#[must_use]
pub fn trend(current: f64, previous: f64) -> Trend {
    let delta = current - previous;
    let percent = if previous.abs() < f64::EPSILON {
        0.0
    } else {
        delta / previous * 100.0
    };
    Trend { delta, percent }
}

/// Review counts and shares for every platform, in enumeration order.
#[must_use]
pub fn platform_shares(reviews: &[Review]) -> Vec<PlatformShare> {
    let total = reviews.len();
    Platform::ALL
        .into_iter()
        .map(|platform| {
            let count = reviews.iter().filter(|r| r.platform == platform).count();
            PlatformShare {
                platform,
                count,
                share: percentage(count, total),
            }
        })
        .collect()
}

/// Sentiment distribution of a snapshot, zero-guarded.
#[must_use]
pub fn sentiment_breakdown(reviews: &[Review]) -> SentimentBreakdown {
    let total = reviews.len();
    let count = |s: Sentiment| reviews.iter().filter(|r| r.sentiment == s).count();
    SentimentBreakdown {
        positive: percentage(count(Sentiment::Positive), total),
        neutral: percentage(count(Sentiment::Neutral), total),
        negative: percentage(count(Sentiment::Negative), total),
    }
}

/// Round to one decimal place for display.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = part as f64 / whole as f64;
    ratio * 100.0
}

/// Posting-time span of a snapshot in days, floored at one.
fn span_days(selected: &[&Review]) -> f64 {
    let Some(min) = selected.iter().map(|r| r.posted_at).min() else {
        return 1.0;
    };
    let Some(max) = selected.iter().map(|r| r.posted_at).max() else {
        return 1.0;
    };
    #[allow(clippy::cast_precision_loss)]
    let days = (max - min).num_seconds() as f64 / 86_400.0;
    days.max(1.0)
}
