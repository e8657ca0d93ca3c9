//! Pure aggregation engine for review dashboards.
//!
//! Every function here is synchronous, allocation-light, and side-effect
//! free: it takes an immutable snapshot of reviews and produces fresh
//! derived values. Nothing is cached or updated incrementally; callers
//! recompute from the current snapshot whenever it changes.

pub mod buckets;
pub mod keywords;
pub mod metrics;
pub mod rules;
pub mod window;

pub use buckets::{
    day_of_week_histogram, hour_day_heatmap, response_time_histogram, DayOfWeekBucket,
    HeatmapCell, ResponseTimeBucket,
};
pub use keywords::{extract_keywords, negative_keywords, positive_keywords, KeywordStat};
pub use metrics::{
    compute_metrics, platform_shares, round1, sentiment_breakdown, trend, MetricSet,
    PlatformShare, SentimentBreakdown, Trend,
};
pub use rules::{evaluate_insights, Insight, InsightKind};
pub use window::TimeWindow;
