//! Realtime review feed over Postgres LISTEN/NOTIFY.
//!
//! The `reviews` table trigger announces every insert/update/delete on the
//! `review_events` channel. [`ReviewFeed`] holds the listening connection
//! and fans events out on a broadcast bus so multiple consumers (snapshot
//! refresher, future push transports) can share one stream. Dropping the
//! feed releases the listening connection back to the pool.

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::DbError;

pub const REVIEW_EVENTS_CHANNEL: &str = "review_events";

/// Broadcast capacity; slow consumers lag and skip old events.
const BUS_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewEventKind {
    Insert,
    Update,
    Delete,
}

/// One change notification, in arrival order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReviewEvent {
    #[serde(rename = "event")]
    pub kind: ReviewEventKind,
    pub id: Uuid,
    pub store_id: Uuid,
}

/// A live subscription to review changes.
pub struct ReviewFeed {
    listener: PgListener,
    sender: broadcast::Sender<ReviewEvent>,
}

impl ReviewFeed {
    /// Open a listening connection on the review events channel.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the connection or LISTEN fails.
    pub async fn connect(pool: &PgPool) -> Result<Self, DbError> {
        let mut listener = PgListener::connect_with(pool).await?;
        listener.listen(REVIEW_EVENTS_CHANNEL).await?;
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Ok(Self { listener, sender })
    }

    /// Subscribe to the event stream. Only events arriving after the call
    /// are delivered.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ReviewEvent> {
        self.sender.subscribe()
    }

    /// Pump notifications onto the bus until the connection fails.
    ///
    /// Malformed payloads are logged and skipped; a bad notification does
    /// not take the feed down.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] when the listening connection is lost;
    /// callers decide whether to reconnect.
    pub async fn run(mut self) -> Result<(), DbError> {
        loop {
            let notification = self.listener.recv().await?;
            match serde_json::from_str::<ReviewEvent>(notification.payload()) {
                Ok(event) => {
                    // send() errors only with zero subscribers; that's fine.
                    let _ = self.sender.send(event);
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        payload = notification.payload(),
                        "ignoring malformed review event payload"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_payload_shape_matches_trigger_json() {
        let payload = r#"{"event":"insert","id":"6f1c1a9e-0d9f-4a4a-9b87-2f4f9d1f2a10","store_id":"1d0a54d2-5f3e-4b2e-8c8e-9a7b6c5d4e3f"}"#;
        let event: ReviewEvent = serde_json::from_str(payload).expect("parse");
        assert_eq!(event.kind, ReviewEventKind::Insert);
    }

    #[test]
    fn unknown_event_kind_fails_parse() {
        let payload = r#"{"event":"truncate","id":"6f1c1a9e-0d9f-4a4a-9b87-2f4f9d1f2a10","store_id":"1d0a54d2-5f3e-4b2e-8c8e-9a7b6c5d4e3f"}"#;
        assert!(serde_json::from_str::<ReviewEvent>(payload).is_err());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn trigger_delivers_insert_events(pool: PgPool) {
        use crate::reviews::{insert_review, NewReview};
        use crate::stores::test_store;
        use revlens_core::{Platform, ReviewStatus, Sentiment};

        let feed = ReviewFeed::connect(&pool).await.expect("connect feed");
        let mut events = feed.subscribe();
        let pump = tokio::spawn(feed.run());

        let store_id = test_store(&pool, "feed-test").await;
        let review_id = insert_review(
            &pool,
            &NewReview {
                store_id,
                platform: Platform::Yelp,
                rating: 4,
                content: "quick lunch".to_string(),
                author: None,
                posted_at: chrono::Utc::now(),
                status: ReviewStatus::Pending,
                sentiment: Sentiment::Positive,
                is_urgent: false,
                response_content: None,
                responded_at: None,
            },
        )
        .await
        .expect("insert");

        let event = tokio::time::timeout(std::time::Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for event")
            .expect("bus closed");
        assert_eq!(event.kind, ReviewEventKind::Insert);
        assert_eq!(event.id, review_id);
        assert_eq!(event.store_id, store_id);

        pump.abort();
    }
}
