//! Domain types for customer reviews.
//!
//! Reviews are externally owned: the aggregation engine treats every
//! collection it receives as an immutable snapshot and never mutates a
//! record. Status transitions happen only through explicit update
//! operations in the persistence layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Third-party platform a review was sourced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Google,
    Yelp,
    Facebook,
    TripAdvisor,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Google,
        Platform::Yelp,
        Platform::Facebook,
        Platform::TripAdvisor,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Google => "google",
            Platform::Yelp => "yelp",
            Platform::Facebook => "facebook",
            Platform::TripAdvisor => "tripadvisor",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "google" => Some(Platform::Google),
            "yelp" => Some(Platform::Yelp),
            "facebook" => Some(Platform::Facebook),
            "tripadvisor" => Some(Platform::TripAdvisor),
            _ => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moderation status of a review. Transitions are controlled by the
/// mutation endpoints, never derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Published,
    Rejected,
}

impl ReviewStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Published => "published",
            ReviewStatus::Rejected => "rejected",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReviewStatus::Pending),
            "approved" => Some(ReviewStatus::Approved),
            "published" => Some(ReviewStatus::Published),
            "rejected" => Some(ReviewStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Precomputed tone classification. The engine never derives sentiment
/// from text; it only attributes the stored value to keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single customer review sourced from a third-party platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub store_id: Uuid,
    pub platform: Platform,
    /// Star rating, always in `1..=5`.
    pub rating: u8,
    pub content: String,
    pub author: Option<String>,
    pub posted_at: DateTime<Utc>,
    pub status: ReviewStatus,
    pub sentiment: Sentiment,
    pub is_urgent: bool,
    pub response_content: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl Review {
    /// Hours between posting and the owner's response, if one exists.
    ///
    /// Negative deltas (clock skew in imported data) are floored at zero so
    /// downstream bucketing stays well-defined.
    #[must_use]
    pub fn response_hours(&self) -> Option<f64> {
        let responded_at = self.responded_at?;
        let secs = (responded_at - self.posted_at).num_seconds();
        #[allow(clippy::cast_precision_loss)]
        Some((secs.max(0) as f64) / 3600.0)
    }

    /// Whether the review has been handled (anything but pending).
    #[must_use]
    pub fn is_responded(&self) -> bool {
        self.status != ReviewStatus::Pending
    }
}

/// Validate a rating read from an external row.
///
/// Ratings outside `1..=5` are rejected so callers can skip the record;
/// clamping would silently distort averages.
#[must_use]
pub fn validate_rating(raw: i16) -> Option<u8> {
    u8::try_from(raw).ok().filter(|r| (1..=5).contains(r))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_at(posted: &str, responded: Option<&str>) -> Review {
        Review {
            id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            platform: Platform::Google,
            rating: 4,
            content: "solid".to_string(),
            author: None,
            posted_at: posted.parse().expect("posted_at"),
            status: ReviewStatus::Published,
            sentiment: Sentiment::Positive,
            is_urgent: false,
            response_content: responded.map(|_| "thanks!".to_string()),
            responded_at: responded.map(|s| s.parse().expect("responded_at")),
        }
    }

    #[test]
    fn platform_roundtrips_through_str() {
        for p in Platform::ALL {
            assert_eq!(Platform::parse(p.as_str()), Some(p));
        }
        assert_eq!(Platform::parse("angieslist"), None);
    }

    #[test]
    fn status_parse_rejects_unknown() {
        assert_eq!(ReviewStatus::parse("published"), Some(ReviewStatus::Published));
        assert_eq!(ReviewStatus::parse("archived"), None);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Platform::TripAdvisor).expect("serialize");
        assert_eq!(json, "\"tripadvisor\"");
        let json = serde_json::to_string(&Sentiment::Negative).expect("serialize");
        assert_eq!(json, "\"negative\"");
    }

    #[test]
    fn response_hours_computes_delta() {
        let r = review_at("2026-03-01T08:00:00Z", Some("2026-03-01T14:00:00Z"));
        assert_eq!(r.response_hours(), Some(6.0));
    }

    #[test]
    fn response_hours_none_without_response() {
        let r = review_at("2026-03-01T08:00:00Z", None);
        assert_eq!(r.response_hours(), None);
    }

    #[test]
    fn response_hours_floors_negative_delta() {
        let r = review_at("2026-03-01T08:00:00Z", Some("2026-03-01T07:00:00Z"));
        assert_eq!(r.response_hours(), Some(0.0));
    }

    #[test]
    fn validate_rating_accepts_range() {
        for raw in 1..=5_i16 {
            assert_eq!(validate_rating(raw), Some(u8::try_from(raw).expect("fits")));
        }
    }

    #[test]
    fn validate_rating_rejects_out_of_range() {
        assert_eq!(validate_rating(0), None);
        assert_eq!(validate_rating(6), None);
        assert_eq!(validate_rating(-3), None);
    }
}
