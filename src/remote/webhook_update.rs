use serde::Deserialize;

use crate::models::SignalInsert;
use crate::parser::parse_signal;

/// One webhook delivery from the Telegram Bot API. Only the fields this
/// service reads are modeled; the rest of the update passes by untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookUpdate {
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub text: Option<String>,
    pub from: Option<MessageSender>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageSender {
    pub username: Option<String>,
    pub first_name: Option<String>,
}

impl IncomingMessage {
    /// Builds the record to persist, or `None` when the message carries no
    /// text. The raw text is always kept verbatim; a parse miss still
    /// produces a record, just without the structured fields.
    pub fn to_insertable(&self) -> Option<SignalInsert> {
        let text = self.text.as_deref()?;
        if text.is_empty() {
            return None;
        }

        let mut record = SignalInsert::unstructured(text);
        record.source = self.sender_name();

        if let Some(parsed) = parse_signal(text) {
            record.pair = Some(parsed.pair);
            record.direction = Some(parsed.direction);
            record.entry_price = Some(parsed.price);
        }
        Some(record)
    }

    fn sender_name(&self) -> Option<String> {
        let from = self.from.as_ref()?;
        from.username.clone().or_else(|| from.first_name.clone())
    }
}
