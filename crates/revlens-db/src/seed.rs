//! Demo review generator for development environments.
//!
//! Produces a plausible month of reviews for a store so the dashboard has
//! something to render before real platform data is connected.

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::PgPool;
use uuid::Uuid;

use revlens_core::{Platform, ReviewStatus, Sentiment};

use crate::reviews::{insert_review, NewReview};
use crate::DbError;

const POSITIVE_PHRASES: &[&str] = &[
    "Fantastic service and the staff remembered our usual order.",
    "Great atmosphere, quick service, will absolutely come back.",
    "The brunch menu is excellent and the coffee is consistently good.",
    "Friendly team, clean space, and the food arrived fast.",
];

const NEUTRAL_PHRASES: &[&str] = &[
    "Decent food though the wait was longer than expected.",
    "Average experience overall, nothing stood out either way.",
    "Fine for a quick stop but parking nearby is limited.",
];

const NEGATIVE_PHRASES: &[&str] = &[
    "Cold food and nobody checked on our table for twenty minutes.",
    "Terrible wait times and the order came out wrong twice.",
    "Disappointing visit, the service has really gone downhill.",
];

/// Generate and insert `count` demo reviews for a store.
///
/// Ratings skew positive the way real review distributions do; sentiment
/// tracks the rating; roughly two thirds of non-pending reviews carry an
/// owner response within 48 hours. Returns the number inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails.
pub async fn seed_demo_reviews(
    pool: &PgPool,
    store_id: Uuid,
    count: usize,
) -> Result<usize, DbError> {
    let mut rng = StdRng::from_os_rng();
    let now = Utc::now();

    for _ in 0..count {
        let rating = weighted_rating(&mut rng);
        let sentiment = match rating {
            4 | 5 => Sentiment::Positive,
            3 => Sentiment::Neutral,
            _ => Sentiment::Negative,
        };
        let content = phrase_for(&mut rng, sentiment);
        let platform = Platform::ALL[rng.random_range(0..Platform::ALL.len())];
        let posted_at = now - Duration::minutes(rng.random_range(0..60 * 24 * 30));

        let status = match rng.random_range(0..100) {
            0..=59 => ReviewStatus::Published,
            60..=74 => ReviewStatus::Approved,
            75..=94 => ReviewStatus::Pending,
            _ => ReviewStatus::Rejected,
        };

        let responded = status != ReviewStatus::Pending && rng.random_bool(0.66);
        let responded_at = responded
            .then(|| posted_at + Duration::minutes(rng.random_range(30..60 * 48)));

        let review = NewReview {
            store_id,
            platform,
            rating,
            content: content.to_string(),
            author: None,
            posted_at,
            status,
            sentiment,
            is_urgent: rating <= 2 && status == ReviewStatus::Pending,
            response_content: responded.then(|| "Thank you for the feedback!".to_string()),
            responded_at,
        };
        insert_review(pool, &review).await?;
    }

    Ok(count)
}

fn weighted_rating(rng: &mut StdRng) -> u8 {
    match rng.random_range(0..100) {
        0..=39 => 5,
        40..=64 => 4,
        65..=79 => 3,
        80..=89 => 2,
        _ => 1,
    }
}

fn phrase_for(rng: &mut StdRng, sentiment: Sentiment) -> &'static str {
    let pool = match sentiment {
        Sentiment::Positive => POSITIVE_PHRASES,
        Sentiment::Neutral => NEUTRAL_PHRASES,
        Sentiment::Negative => NEGATIVE_PHRASES,
    };
    pool[rng.random_range(0..pool.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::{list_reviews, ReviewFilter};
    use crate::stores::test_store;

    #[sqlx::test(migrations = "../../migrations")]
    async fn seeds_requested_number_of_valid_reviews(pool: PgPool) {
        let store_id = test_store(&pool, "demo-seed").await;
        let inserted = seed_demo_reviews(&pool, store_id, 25).await.expect("seed");
        assert_eq!(inserted, 25);

        // All rows must survive domain validation on the way back out.
        let reviews = list_reviews(&pool, store_id, ReviewFilter::default(), 100)
            .await
            .expect("list");
        assert_eq!(reviews.len(), 25);
        assert!(reviews.iter().all(|r| (1..=5).contains(&r.rating)));
    }
}
