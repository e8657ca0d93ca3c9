//! Heuristic insight rules over aggregated metrics.
//!
//! A fixed rule set evaluated in a fixed order; each rule fires
//! independently and the output preserves rule order. No ranking, no
//! deduplication.

use serde::Serialize;

use crate::metrics::{round1, trend, MetricSet, PlatformShare};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Success,
    Warning,
    Info,
}

/// A human-readable observation derived from metric snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    /// The headline number behind the insight, unrounded, where one exists.
    pub metric: Option<f64>,
}

impl Insight {
    fn new(
        kind: InsightKind,
        title: impl Into<String>,
        description: impl Into<String>,
        metric: Option<f64>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            metric,
        }
    }
}

/// Evaluate the fixed rule set.
///
/// `recent` and `previous` are metrics over the last and prior 7-day
/// windows; `overall` covers the whole collection; `platforms` is the
/// whole-collection platform breakdown. With zero reviews overall, a
/// single "no data" insight is returned and nothing else evaluates. If
/// no rule fires, a single "nothing notable" insight is returned.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn evaluate_insights(
    recent: &MetricSet,
    previous: &MetricSet,
    overall: &MetricSet,
    platforms: &[PlatformShare],
) -> Vec<Insight> {
    if overall.total == 0 {
        return vec![Insight::new(
            InsightKind::Info,
            "No review data yet",
            "No reviews have been collected for this store. Insights will appear once reviews arrive.",
            None,
        )];
    }

    let mut insights = Vec::new();

    let rating_trend = trend(recent.average_rating, previous.average_rating);

    if recent.total > 0 && rating_trend.delta > 0.0 {
        insights.push(Insight::new(
            InsightKind::Success,
            "Rating improving week over week",
            format!(
                "Average rating rose from {} to {} (+{}).",
                round1(previous.average_rating),
                round1(recent.average_rating),
                round1(rating_trend.delta)
            ),
            Some(rating_trend.delta),
        ));
    }

    if recent.total > 0 && rating_trend.delta < 0.0 {
        insights.push(Insight::new(
            InsightKind::Warning,
            "Rating declining week over week",
            format!(
                "Average rating fell from {} to {} ({}).",
                round1(previous.average_rating),
                round1(recent.average_rating),
                round1(rating_trend.delta)
            ),
            Some(rating_trend.delta),
        ));
    }

    if recent.low_rated > 3 {
        insights.push(Insight::new(
            InsightKind::Warning,
            "Spike in low ratings",
            format!(
                "{} reviews rated 2 stars or fewer arrived in the last 7 days.",
                recent.low_rated
            ),
            Some(recent.low_rated as f64),
        ));
    }

    if overall.pending > 5 {
        insights.push(Insight::new(
            InsightKind::Info,
            "Pending reviews piling up",
            format!("{} reviews are still awaiting moderation.", overall.pending),
            Some(overall.pending as f64),
        ));
    }

    if overall.response_rate >= 90.0 {
        insights.push(Insight::new(
            InsightKind::Success,
            "Strong response rate",
            format!(
                "{}% of all reviews have been handled.",
                round1(overall.response_rate)
            ),
            Some(overall.response_rate),
        ));
    }

    if let Some(dominant) = platforms.iter().find(|p| p.share > 50.0) {
        insights.push(Insight::new(
            InsightKind::Info,
            "Platform concentration",
            format!(
                "{} supplies {}% of all reviews; consider growing presence elsewhere.",
                dominant.platform,
                round1(dominant.share)
            ),
            Some(dominant.share),
        ));
    }

    if overall.positive_rate >= 80.0 {
        insights.push(Insight::new(
            InsightKind::Success,
            "Customers are happy",
            format!(
                "{}% of reviews carry positive sentiment.",
                round1(overall.positive_rate)
            ),
            Some(overall.positive_rate),
        ));
    }

    if insights.is_empty() {
        insights.push(Insight::new(
            InsightKind::Info,
            "Nothing notable this week",
            "Metrics are steady; no rule produced an observation.",
            None,
        ));
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(total: usize, average_rating: f64) -> MetricSet {
        MetricSet {
            total,
            average_rating,
            ..MetricSet::default()
        }
    }

    fn no_platforms() -> Vec<PlatformShare> {
        Vec::new()
    }

    #[test]
    fn empty_collection_yields_single_no_data_insight() {
        let empty = MetricSet::default();
        let insights = evaluate_insights(&empty, &empty, &empty, &no_platforms());
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Info);
        assert!(insights[0].title.contains("No review data"));
    }

    #[test]
    fn improvement_fires_success_with_delta() {
        let recent = metrics(5, 4.5);
        let previous = metrics(5, 4.0);
        let overall = metrics(10, 4.25);
        let insights = evaluate_insights(&recent, &previous, &overall, &no_platforms());
        let first = &insights[0];
        assert_eq!(first.kind, InsightKind::Success);
        assert!(first.title.contains("improving"));
        assert!((first.metric.expect("delta") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn decline_fires_warning() {
        let recent = metrics(5, 3.2);
        let previous = metrics(5, 4.0);
        let overall = metrics(10, 3.6);
        let insights = evaluate_insights(&recent, &previous, &overall, &no_platforms());
        assert_eq!(insights[0].kind, InsightKind::Warning);
        assert!(insights[0].title.contains("declining"));
    }

    #[test]
    fn empty_recent_window_suppresses_trend_rules() {
        let recent = MetricSet::default();
        let previous = metrics(5, 4.0);
        let overall = metrics(5, 4.0);
        let insights = evaluate_insights(&recent, &previous, &overall, &no_platforms());
        assert!(insights
            .iter()
            .all(|i| !i.title.contains("week over week")));
    }

    #[test]
    fn low_rating_rule_requires_more_than_three() {
        let mut recent = metrics(10, 3.0);
        recent.low_rated = 3;
        let overall = metrics(10, 3.0);
        let insights = evaluate_insights(&recent, &metrics(10, 3.0), &overall, &no_platforms());
        assert!(insights.iter().all(|i| !i.title.contains("low ratings")));

        recent.low_rated = 4;
        let insights = evaluate_insights(&recent, &metrics(10, 3.0), &overall, &no_platforms());
        assert!(insights.iter().any(|i| i.title.contains("low ratings")));
    }

    #[test]
    fn pending_backlog_rule_requires_more_than_five() {
        let mut overall = metrics(20, 4.0);
        overall.pending = 6;
        let insights =
            evaluate_insights(&metrics(0, 0.0), &metrics(0, 0.0), &overall, &no_platforms());
        assert!(insights.iter().any(|i| i.title.contains("Pending")));
    }

    #[test]
    fn response_rate_rule_fires_at_ninety() {
        let mut overall = metrics(20, 4.0);
        overall.response_rate = 90.0;
        let insights =
            evaluate_insights(&metrics(0, 0.0), &metrics(0, 0.0), &overall, &no_platforms());
        assert!(insights
            .iter()
            .any(|i| i.kind == InsightKind::Success && i.title.contains("response rate")));
    }

    #[test]
    fn platform_concentration_requires_strict_majority() {
        use revlens_core::Platform;
        let overall = metrics(10, 4.0);
        let half = vec![PlatformShare {
            platform: Platform::Yelp,
            count: 5,
            share: 50.0,
        }];
        let insights = evaluate_insights(&metrics(0, 0.0), &metrics(0, 0.0), &overall, &half);
        assert!(insights.iter().all(|i| !i.title.contains("concentration")));

        let majority = vec![PlatformShare {
            platform: Platform::Yelp,
            count: 6,
            share: 60.0,
        }];
        let insights = evaluate_insights(&metrics(0, 0.0), &metrics(0, 0.0), &overall, &majority);
        let hit = insights
            .iter()
            .find(|i| i.title.contains("concentration"))
            .expect("concentration insight");
        assert!(hit.description.contains("yelp"));
    }

    #[test]
    fn quiet_metrics_yield_nothing_notable() {
        let recent = metrics(2, 4.0);
        let previous = metrics(2, 4.0);
        let overall = metrics(4, 4.0);
        let insights = evaluate_insights(&recent, &previous, &overall, &no_platforms());
        assert_eq!(insights.len(), 1);
        assert!(insights[0].title.contains("Nothing notable"));
    }

    #[test]
    fn multiple_rules_fire_in_fixed_order() {
        let recent = metrics(8, 4.6);
        let previous = metrics(8, 4.1);
        let mut overall = metrics(30, 4.4);
        overall.pending = 7;
        overall.response_rate = 93.0;
        overall.positive_rate = 85.0;
        let insights = evaluate_insights(&recent, &previous, &overall, &no_platforms());
        let titles: Vec<&str> = insights.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Rating improving week over week",
                "Pending reviews piling up",
                "Strong response rate",
                "Customers are happy",
            ]
        );
    }
}
