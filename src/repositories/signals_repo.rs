use sqlx::SqlitePool;

use crate::models::{Signal, SignalInsert};
use crate::store::{ListOrder, SignalFilter};

const SELECT_NEWEST_FIRST: &str = r#"
    SELECT id, pair, direction, entry_price, stop_loss, take_profit,
           status, source, text, timestamp
    FROM signals
    WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR pair = ?2)
    ORDER BY id DESC
"#;

const SELECT_OLDEST_FIRST: &str = r#"
    SELECT id, pair, direction, entry_price, stop_loss, take_profit,
           status, source, text, timestamp
    FROM signals
    WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR pair = ?2)
    ORDER BY id ASC
"#;

pub struct SignalRepository;

impl SignalRepository {
    /// Inserts one row and returns it with the generated id. `timestamp`
    /// comes from the store, the only place allowed to stamp it.
    pub async fn insert(
        pool: &SqlitePool,
        record: &SignalInsert,
        timestamp: f64,
    ) -> Result<Signal, sqlx::Error> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
                INSERT INTO signals (
                    pair, direction, entry_price, stop_loss, take_profit,
                    status, source, text, timestamp
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                RETURNING id
            "#,
        )
        .bind(&record.pair)
        .bind(record.direction)
        .bind(record.entry_price)
        .bind(record.stop_loss)
        .bind(record.take_profit)
        .bind(record.status)
        .bind(&record.source)
        .bind(&record.text)
        .bind(timestamp)
        .fetch_one(pool)
        .await?;

        Ok(Signal {
            id,
            pair: record.pair.clone(),
            direction: record.direction,
            entry_price: record.entry_price,
            stop_loss: record.stop_loss,
            take_profit: record.take_profit,
            status: record.status,
            source: record.source.clone(),
            text: record.text.clone(),
            timestamp,
        })
    }

    pub async fn list(
        pool: &SqlitePool,
        filter: &SignalFilter,
        order: ListOrder,
    ) -> Result<Vec<Signal>, sqlx::Error> {
        let sql = match order {
            ListOrder::Desc => SELECT_NEWEST_FIRST,
            ListOrder::Asc => SELECT_OLDEST_FIRST,
        };

        sqlx::query_as::<_, Signal>(sql)
            .bind(filter.status)
            .bind(&filter.pair)
            .fetch_all(pool)
            .await
    }
}
