use std::sync::Arc;

use tracing::{debug, info};

use crate::models::Signal;
use crate::remote::WebhookUpdate;
use crate::store::{SignalStore, StoreError};

/// Turns webhook deliveries into stored signal records.
#[derive(Clone)]
pub struct IngestService {
    store: Arc<dyn SignalStore>,
}

impl IngestService {
    pub fn new(store: Arc<dyn SignalStore>) -> Self {
        Self { store }
    }

    /// Runs one delivery through extract, parse and persist. Returns the
    /// stored record, or `None` when the update carries no message text
    /// and there is nothing to write.
    pub async fn ingest(&self, update: &WebhookUpdate) -> Result<Option<Signal>, StoreError> {
        let Some(record) = update.message.as_ref().and_then(|m| m.to_insertable()) else {
            debug!("update without message text, nothing to persist");
            return Ok(None);
        };

        let stored = self.store.append(record).await?;
        match (&stored.pair, stored.direction, stored.entry_price) {
            (Some(pair), Some(direction), Some(price)) => {
                info!("Stored signal #{}: {} {} @ {}", stored.id, pair, direction, price);
            }
            _ => {
                info!(
                    "Stored raw message #{} ({} chars)",
                    stored.id,
                    stored.text.chars().count()
                );
            }
        }
        Ok(Some(stored))
    }
}
