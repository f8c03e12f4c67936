use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upstream failures, with the request URL (which embeds the bot token)
/// already stripped out.
#[derive(Debug, Error)]
pub enum TelegramApiError {
    #[error("telegram api timed out")]
    Timeout,
    #[error("telegram api unreachable: {0}")]
    Transport(String),
}

/// The `getMe` envelope as Telegram shapes it.
#[derive(Debug, Clone, Deserialize)]
pub struct GetMeResponse {
    pub ok: bool,
    pub result: Option<BotProfile>,
    pub description: Option<String>,
}

/// Bot identity reported by `getMe`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotProfile {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait BotApi: Send + Sync {
    async fn get_me(&self, token: &str) -> Result<GetMeResponse, TelegramApiError>;
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    /// One identity call against the Bot API. The token lives only inside
    /// this request. A rejected token is not a transport error: Telegram
    /// answers 401 with an `ok: false` envelope, so the body is decoded
    /// regardless of status.
    async fn get_me(&self, token: &str) -> Result<GetMeResponse, TelegramApiError> {
        let url = format!("{}/bot{}/getMe", self.base_url, token);

        let response = self.client.get(&url).send().await.map_err(redact)?;
        response.json::<GetMeResponse>().await.map_err(redact)
    }
}

fn redact(err: reqwest::Error) -> TelegramApiError {
    if err.is_timeout() {
        TelegramApiError::Timeout
    } else {
        TelegramApiError::Transport(err.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_me_envelope_parses_both_shapes() {
        let ok: GetMeResponse = serde_json::from_str(
            r#"{
                "ok": true,
                "result": {
                    "id": 123456789,
                    "is_bot": true,
                    "first_name": "Relay",
                    "username": "relay_bot"
                }
            }"#,
        )
        .unwrap();
        assert!(ok.ok);
        let profile = ok.result.unwrap();
        assert_eq!(profile.id, 123456789);
        assert!(profile.is_bot);
        assert_eq!(profile.username.as_deref(), Some("relay_bot"));

        let rejected: GetMeResponse = serde_json::from_str(
            r#"{ "ok": false, "error_code": 401, "description": "Unauthorized" }"#,
        )
        .unwrap();
        assert!(!rejected.ok);
        assert!(rejected.result.is_none());
        assert_eq!(rejected.description.as_deref(), Some("Unauthorized"));
    }

    #[test]
    fn bot_profile_serializes_without_absent_username() {
        let profile = BotProfile {
            id: 1,
            is_bot: true,
            first_name: "Relay".to_string(),
            username: None,
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("username").is_none());
    }
}
