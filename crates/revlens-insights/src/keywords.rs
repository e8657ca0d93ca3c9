//! Keyword extraction with sentiment attribution.
//!
//! Tokenizes review text, drops short tokens and stop words, keeps only
//! tokens that clear the noise floor, and attributes each surviving
//! keyword the mean rating and dominant sentiment of the reviews that
//! mention it.

use std::collections::HashMap;

use serde::Serialize;

use revlens_core::{Review, Sentiment};

/// Tokens must be strictly longer than this to count.
const MIN_TOKEN_LEN: usize = 3;

/// Minimum occurrences before a keyword surfaces at all.
const NOISE_FLOOR: usize = 3;

/// Cap on the general keyword view.
const GENERAL_CAP: usize = 30;

/// Cap on the positive/negative sub-views.
const VIEW_CAP: usize = 15;

/// Articles, pronouns, and common auxiliaries that carry no signal.
/// Lowercase, checked after token normalization.
const STOP_WORDS: &[&str] = &[
    "about", "after", "again", "also", "because", "been", "before", "being", "could", "does",
    "doing", "even", "every", "from", "have", "having", "here", "into", "just", "more", "most",
    "much", "only", "other", "over", "really", "should", "some", "such", "than", "that", "their",
    "them", "then", "there", "these", "they", "this", "those", "very", "well", "were", "what",
    "when", "where", "which", "while", "will", "with", "would", "your",
];

/// Aggregated statistics for one surviving keyword.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordStat {
    pub keyword: String,
    pub count: usize,
    /// Mean rating of the reviews containing this keyword.
    pub average_rating: f64,
    pub dominant_sentiment: Sentiment,
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    rating_sum: u32,
    positive: usize,
    neutral: usize,
    negative: usize,
}

impl Accumulator {
    fn record(&mut self, rating: u8, sentiment: Sentiment) {
        self.count += 1;
        self.rating_sum += u32::from(rating);
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    // Tie-break order is positive, then neutral, then negative; display
    // classification depends on it.
    fn dominant(&self) -> Sentiment {
        if self.positive >= self.neutral && self.positive >= self.negative {
            Sentiment::Positive
        } else if self.neutral >= self.negative {
            Sentiment::Neutral
        } else {
            Sentiment::Negative
        }
    }
}

/// Extract ranked keywords from a review snapshot.
///
/// Sorted by occurrence count descending (keyword ascending on ties) and
/// capped at 30. Snapshots too small to clear the noise floor yield an
/// empty list.
#[must_use]
pub fn extract_keywords(reviews: &[Review]) -> Vec<KeywordStat> {
    let mut accumulators: HashMap<String, Accumulator> = HashMap::new();

    for review in reviews {
        for token in tokenize(&review.content) {
            accumulators
                .entry(token)
                .or_default()
                .record(review.rating, review.sentiment);
        }
    }

    let mut stats: Vec<KeywordStat> = accumulators
        .into_iter()
        .filter(|(_, acc)| acc.count >= NOISE_FLOOR)
        .map(|(keyword, acc)| {
            #[allow(clippy::cast_precision_loss)]
            let average_rating = f64::from(acc.rating_sum) / acc.count as f64;
            KeywordStat {
                keyword,
                count: acc.count,
                average_rating,
                dominant_sentiment: acc.dominant(),
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.keyword.cmp(&b.keyword))
    });
    stats.truncate(GENERAL_CAP);
    stats
}

/// Keywords whose dominant sentiment is positive, capped at 15.
#[must_use]
pub fn positive_keywords(stats: &[KeywordStat]) -> Vec<KeywordStat> {
    filtered_view(stats, Sentiment::Positive)
}

/// Keywords whose dominant sentiment is negative, capped at 15.
#[must_use]
pub fn negative_keywords(stats: &[KeywordStat]) -> Vec<KeywordStat> {
    filtered_view(stats, Sentiment::Negative)
}

fn filtered_view(stats: &[KeywordStat], sentiment: Sentiment) -> Vec<KeywordStat> {
    stats
        .iter()
        .filter(|s| s.dominant_sentiment == sentiment)
        .take(VIEW_CAP)
        .cloned()
        .collect()
}

/// Lowercase, strip punctuation, split on whitespace, and drop tokens
/// that are too short or stop words. One token may repeat within a
/// single review; each occurrence counts.
fn tokenize(content: &str) -> impl Iterator<Item = String> + '_ {
    content.split_whitespace().filter_map(|word| {
        let token: String = word
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if token.len() <= MIN_TOKEN_LEN || STOP_WORDS.contains(&token.as_str()) {
            None
        } else {
            Some(token)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::review;

    fn with_content(content: &str, rating: u8, sentiment: Sentiment) -> Review {
        let mut r = review(rating, sentiment, "2026-03-01T10:00:00Z");
        r.content = content.to_string();
        r
    }

    #[test]
    fn noise_floor_excludes_rare_tokens() {
        let reviews = vec![
            with_content("great service", 5, Sentiment::Positive),
            with_content("great service", 5, Sentiment::Positive),
            with_content("ok", 3, Sentiment::Neutral),
        ];
        let stats = extract_keywords(&reviews);
        assert!(
            stats.iter().all(|s| s.keyword != "service"),
            "count 2 is below the noise floor"
        );
        assert!(stats.is_empty());
    }

    #[test]
    fn short_tokens_and_stop_words_are_dropped() {
        let reviews = vec![
            with_content("the food was cold", 2, Sentiment::Negative),
            with_content("the food was cold", 2, Sentiment::Negative),
            with_content("the food was cold", 1, Sentiment::Negative),
        ];
        let stats = extract_keywords(&reviews);
        let keywords: Vec<&str> = stats.iter().map(|s| s.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["cold", "food"]);
    }

    #[test]
    fn punctuation_is_stripped_before_matching() {
        let reviews = vec![
            with_content("Amazing! Amazing, amazing...", 5, Sentiment::Positive),
        ];
        let stats = extract_keywords(&reviews);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].keyword, "amazing");
        assert_eq!(stats[0].count, 3);
    }

    #[test]
    fn non_ascii_letters_survive_tokenization() {
        let reviews = vec![
            with_content("Café was lovely", 5, Sentiment::Positive),
            with_content("café again", 5, Sentiment::Positive),
            with_content("the café!", 4, Sentiment::Positive),
        ];
        let stats = extract_keywords(&reviews);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].keyword, "café");
        assert_eq!(stats[0].count, 3);
    }

    #[test]
    fn average_rating_is_mean_of_mentions() {
        let reviews = vec![
            with_content("pizza", 5, Sentiment::Positive),
            with_content("pizza", 4, Sentiment::Positive),
            with_content("pizza", 3, Sentiment::Neutral),
        ];
        let stats = extract_keywords(&reviews);
        assert_eq!(stats.len(), 1);
        assert!((stats[0].average_rating - 4.0).abs() < 1e-12);
    }

    #[test]
    fn dominant_sentiment_tie_breaks_positive_first() {
        let reviews = vec![
            with_content("brunch", 5, Sentiment::Positive),
            with_content("brunch", 4, Sentiment::Positive),
            with_content("brunch", 3, Sentiment::Neutral),
            with_content("brunch", 3, Sentiment::Neutral),
        ];
        let stats = extract_keywords(&reviews);
        assert_eq!(stats[0].dominant_sentiment, Sentiment::Positive);
    }

    #[test]
    fn dominant_sentiment_neutral_beats_negative_on_tie() {
        let reviews = vec![
            with_content("parking", 3, Sentiment::Neutral),
            with_content("parking", 3, Sentiment::Neutral),
            with_content("parking", 1, Sentiment::Negative),
            with_content("parking", 1, Sentiment::Negative),
        ];
        let stats = extract_keywords(&reviews);
        assert_eq!(stats[0].dominant_sentiment, Sentiment::Neutral);
    }

    #[test]
    fn sorted_by_count_then_keyword() {
        let mut reviews = Vec::new();
        for _ in 0..4 {
            reviews.push(with_content("coffee", 5, Sentiment::Positive));
        }
        for _ in 0..3 {
            reviews.push(with_content("bagel toast", 4, Sentiment::Positive));
        }
        let stats = extract_keywords(&reviews);
        let keywords: Vec<&str> = stats.iter().map(|s| s.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["coffee", "bagel", "toast"]);
    }

    #[test]
    fn general_view_caps_at_thirty() {
        let mut reviews = Vec::new();
        for i in 0..40 {
            let word = format!("keyword{i:02}");
            for _ in 0..3 {
                reviews.push(with_content(&word, 4, Sentiment::Positive));
            }
        }
        let stats = extract_keywords(&reviews);
        assert_eq!(stats.len(), 30);
    }

    #[test]
    fn sub_views_filter_and_cap() {
        let mut reviews = Vec::new();
        for i in 0..20 {
            let word = format!("good{i:02}");
            for _ in 0..3 {
                reviews.push(with_content(&word, 5, Sentiment::Positive));
            }
        }
        for _ in 0..3 {
            reviews.push(with_content("soggy", 1, Sentiment::Negative));
        }
        let stats = extract_keywords(&reviews);
        let positive = positive_keywords(&stats);
        let negative = negative_keywords(&stats);
        assert_eq!(positive.len(), 15);
        assert!(positive.iter().all(|s| s.dominant_sentiment == Sentiment::Positive));
        assert_eq!(negative.len(), 1);
        assert_eq!(negative[0].keyword, "soggy");
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(extract_keywords(&[]).is_empty());
    }
}
