use std::sync::Arc;

use tracing::{info, warn};

use crate::remote::{BotApi, BotProfile, TelegramApiError};

const MISSING_TOKEN: &str = "no bot token provided";
const REJECTED_FALLBACK: &str = "telegram rejected the token";
const UNREACHABLE: &str = "could not reach the telegram api";

/// Result of one connectivity probe, ready for the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Connected(BotProfile),
    Rejected { reason: String },
    Unreachable { reason: String },
}

/// Checks a bot credential against the chat platform without keeping it.
#[derive(Clone)]
pub struct ProbeService {
    api: Arc<dyn BotApi>,
}

impl ProbeService {
    pub fn new(api: Arc<dyn BotApi>) -> Self {
        Self { api }
    }

    /// One identity check. A blank credential fails fast without an
    /// upstream call; the credential itself is never stored or logged.
    pub async fn probe(&self, token: &str) -> ProbeOutcome {
        if token.trim().is_empty() {
            return ProbeOutcome::Rejected {
                reason: MISSING_TOKEN.to_string(),
            };
        }

        match self.api.get_me(token).await {
            Ok(envelope) if envelope.ok => match envelope.result {
                Some(profile) => {
                    info!(
                        "Bot connectivity confirmed for {}",
                        profile.username.as_deref().unwrap_or(&profile.first_name)
                    );
                    ProbeOutcome::Connected(profile)
                }
                None => ProbeOutcome::Rejected {
                    reason: REJECTED_FALLBACK.to_string(),
                },
            },
            Ok(envelope) => {
                let reason = envelope
                    .description
                    .unwrap_or_else(|| REJECTED_FALLBACK.to_string());
                info!("Bot token rejected upstream: {}", reason);
                ProbeOutcome::Rejected { reason }
            }
            Err(TelegramApiError::Timeout) => {
                warn!("Bot connectivity probe timed out");
                ProbeOutcome::Unreachable {
                    reason: UNREACHABLE.to_string(),
                }
            }
            Err(err) => {
                warn!("Bot connectivity probe failed: {}", err);
                ProbeOutcome::Unreachable {
                    reason: UNREACHABLE.to_string(),
                }
            }
        }
    }
}
