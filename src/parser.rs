use std::sync::LazyLock;

use regex::Regex;

use crate::models::Direction;

/// Canonical alert shape: `<pair> <BUY|SELL> <price>`, anywhere in the text.
static SIGNAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\w+)\s+(BUY|SELL)\s+([\d.]+)").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSignal {
    pub pair: String,
    pub direction: Direction,
    pub price: f64,
}

/// Extracts a structured trade instruction from raw message text.
///
/// The pair is kept exactly as written, the direction is normalized, and
/// anything that does not carry the three-token shape yields `None`. A price
/// token that matches the pattern but fails to parse as a float (for example
/// `1.08.42`) also yields `None`.
pub fn parse_signal(text: &str) -> Option<ParsedSignal> {
    let caps = SIGNAL_RE.captures(text)?;

    let direction = match caps[2].to_ascii_uppercase().as_str() {
        "BUY" => Direction::Buy,
        "SELL" => Direction::Sell,
        _ => return None,
    };
    let price = caps[3].parse::<f64>().ok()?;

    Some(ParsedSignal {
        pair: caps[1].to_string(),
        direction,
        price,
    })
}
