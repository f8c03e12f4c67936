use std::fmt;

use serde::{Deserialize, Serialize};

/// Trade direction as announced in the alert text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => f.write_str("BUY"),
            Direction::Sell => f.write_str("SELL"),
        }
    }
}

/// Signal lifecycle. Ingestion only ever writes `Received`; every later
/// transition belongs to the execution side, so the store hands the other
/// states back exactly as they were written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SignalStatus {
    Received,
    Pending,
    Executed,
    Cancelled,
    Completed,
}

/// A stored signal row. `id` and `timestamp` are assigned by the store,
/// never by callers.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Signal {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pair: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    pub status: SignalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub text: String,
    /// Epoch seconds. The dashboard renders `timestamp * 1000` as a Date.
    pub timestamp: f64,
}

/// The caller-supplied half of a signal, handed to the store for stamping.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalInsert {
    pub pair: Option<String>,
    pub direction: Option<Direction>,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub status: SignalStatus,
    pub source: Option<String>,
    pub text: String,
}

impl SignalInsert {
    /// A record that carries nothing but the raw text.
    pub fn unstructured(text: impl Into<String>) -> Self {
        Self {
            pair: None,
            direction: None,
            entry_price: None,
            stop_loss: None,
            take_profit: None,
            status: SignalStatus::Received,
            source: None,
            text: text.into(),
        }
    }
}
