use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::{Signal, SignalInsert, SignalStatus};
use crate::repositories::SignalRepository;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("signal store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

/// Snapshot ordering. `Desc` is insertion order, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    #[default]
    Desc,
    Asc,
}

/// Row restriction for `list`. The default selects everything.
#[derive(Debug, Clone, Default)]
pub struct SignalFilter {
    pub status: Option<SignalStatus>,
    pub pair: Option<String>,
}

/// Append-only signal history.
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Stamps the record with the next id and the current time, then
    /// persists it. Existing rows are never touched.
    async fn append(&self, record: SignalInsert) -> Result<Signal, StoreError>;

    /// A point-in-time snapshot of matching rows.
    async fn list(
        &self,
        filter: &SignalFilter,
        order: ListOrder,
    ) -> Result<Vec<Signal>, StoreError>;
}

pub struct SqliteSignalStore {
    pool: SqlitePool,
    // Serializes appends; holds the last stamped time.
    append_guard: Mutex<f64>,
}

impl SqliteSignalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            append_guard: Mutex::new(0.0),
        }
    }

    fn now_epoch() -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

#[async_trait]
impl SignalStore for SqliteSignalStore {
    async fn append(&self, record: SignalInsert) -> Result<Signal, StoreError> {
        let mut last_stamp = self.append_guard.lock().await;
        let now = Self::now_epoch();
        // Strictly increasing even when two appends land in the same
        // microsecond or the clock steps backwards.
        let timestamp = if now > *last_stamp {
            now
        } else {
            *last_stamp + 1e-6
        };

        let stored = SignalRepository::insert(&self.pool, &record, timestamp).await?;
        *last_stamp = timestamp;
        Ok(stored)
    }

    async fn list(
        &self,
        filter: &SignalFilter,
        order: ListOrder,
    ) -> Result<Vec<Signal>, StoreError> {
        Ok(SignalRepository::list(&self.pool, filter, order).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::Direction;

    async fn memory_store() -> (SqliteSignalStore, SqlitePool) {
        let pool = db::memory_pool().await;
        (SqliteSignalStore::new(pool.clone()), pool)
    }

    fn structured(text: &str, pair: &str, direction: Direction, price: f64) -> SignalInsert {
        SignalInsert {
            pair: Some(pair.to_string()),
            direction: Some(direction),
            entry_price: Some(price),
            ..SignalInsert::unstructured(text)
        }
    }

    #[tokio::test]
    async fn append_assigns_increasing_ids_and_timestamps() {
        let (store, _pool) = memory_store().await;

        let first = store
            .append(structured("EURUSD BUY 1.0842", "EURUSD", Direction::Buy, 1.0842))
            .await
            .unwrap();
        let second = store
            .append(SignalInsert::unstructured("hello there"))
            .await
            .unwrap();
        let third = store
            .append(structured("GBPJPY SELL 190.35", "GBPJPY", Direction::Sell, 190.35))
            .await
            .unwrap();

        assert_eq!((first.id, second.id, third.id), (1, 2, 3));
        assert!(second.timestamp > first.timestamp);
        assert!(third.timestamp > second.timestamp);
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let (store, _pool) = memory_store().await;
        for text in ["first", "second", "third"] {
            store.append(SignalInsert::unstructured(text)).await.unwrap();
        }

        let signals = store
            .list(&SignalFilter::default(), ListOrder::default())
            .await
            .unwrap();

        let texts: Vec<&str> = signals.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn ascending_order_on_request() {
        let (store, _pool) = memory_store().await;
        for text in ["first", "second"] {
            store.append(SignalInsert::unstructured(text)).await.unwrap();
        }

        let signals = store
            .list(&SignalFilter::default(), ListOrder::Asc)
            .await
            .unwrap();
        assert_eq!(signals[0].text, "first");
        assert_eq!(signals[1].text, "second");
    }

    #[tokio::test]
    async fn round_trips_every_field() {
        let (store, _pool) = memory_store().await;

        let record = SignalInsert {
            pair: Some("XAUUSD".to_string()),
            direction: Some(Direction::Sell),
            entry_price: Some(2312.45),
            stop_loss: Some(2320.0),
            take_profit: Some(2290.5),
            status: SignalStatus::Pending,
            source: Some("alert_channel".to_string()),
            text: "XAUUSD SELL 2312.45 sl 2320 tp 2290.5".to_string(),
        };

        let stored = store.append(record).await.unwrap();
        let listed = store
            .list(&SignalFilter::default(), ListOrder::default())
            .await
            .unwrap();

        assert_eq!(listed, vec![stored]);
        assert_eq!(listed[0].status, SignalStatus::Pending);
        assert_eq!(listed[0].stop_loss, Some(2320.0));
        assert_eq!(listed[0].take_profit, Some(2290.5));
        assert_eq!(listed[0].source.as_deref(), Some("alert_channel"));
    }

    #[tokio::test]
    async fn duplicate_texts_are_kept_as_distinct_rows() {
        let (store, _pool) = memory_store().await;
        let text = "EURUSD BUY 1.0842";

        let first = store
            .append(structured(text, "EURUSD", Direction::Buy, 1.0842))
            .await
            .unwrap();
        let second = store
            .append(structured(text, "EURUSD", Direction::Buy, 1.0842))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        let signals = store
            .list(&SignalFilter::default(), ListOrder::default())
            .await
            .unwrap();
        assert_eq!(signals.len(), 2);
    }

    #[tokio::test]
    async fn consecutive_lists_are_identical_without_writes() {
        let (store, _pool) = memory_store().await;
        store
            .append(structured("EURUSD BUY 1.0842", "EURUSD", Direction::Buy, 1.0842))
            .await
            .unwrap();

        let first = store
            .list(&SignalFilter::default(), ListOrder::default())
            .await
            .unwrap();
        let second = store
            .list(&SignalFilter::default(), ListOrder::default())
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn filters_by_status_and_pair() {
        let (store, _pool) = memory_store().await;
        store
            .append(structured("EURUSD BUY 1.0842", "EURUSD", Direction::Buy, 1.0842))
            .await
            .unwrap();
        store
            .append(structured("GBPJPY SELL 190.35", "GBPJPY", Direction::Sell, 190.35))
            .await
            .unwrap();
        store
            .append(SignalInsert {
                status: SignalStatus::Executed,
                ..structured("EURUSD SELL 1.0790", "EURUSD", Direction::Sell, 1.0790)
            })
            .await
            .unwrap();

        let eurusd = store
            .list(
                &SignalFilter {
                    pair: Some("EURUSD".to_string()),
                    ..SignalFilter::default()
                },
                ListOrder::default(),
            )
            .await
            .unwrap();
        assert_eq!(eurusd.len(), 2);
        assert!(eurusd.iter().all(|s| s.pair.as_deref() == Some("EURUSD")));

        let executed = store
            .list(
                &SignalFilter {
                    status: Some(SignalStatus::Executed),
                    ..SignalFilter::default()
                },
                ListOrder::default(),
            )
            .await
            .unwrap();
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].text, "EURUSD SELL 1.0790");

        let both = store
            .list(
                &SignalFilter {
                    status: Some(SignalStatus::Executed),
                    pair: Some("GBPJPY".to_string()),
                },
                ListOrder::default(),
            )
            .await
            .unwrap();
        assert!(both.is_empty());
    }

    #[tokio::test]
    async fn closed_pool_reports_unavailable() {
        let (store, pool) = memory_store().await;
        pool.close().await;

        let err = store
            .append(SignalInsert::unstructured("EURUSD BUY 1.0842"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        let err = store
            .list(&SignalFilter::default(), ListOrder::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
