//! Request and response types for the monitor API.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;


/// Field names used by backend trade rows.
pub mod fields {
    /// Time the trade was observed.
    pub const TIMESTAMP: &str = "Timestamp";
    /// Raw option symbol.
    pub const SYMBOL: &str = "Symbol";
    /// `CALL` or `PUT`.
    pub const OPTION_TYPE: &str = "Option_Type";
    /// Formatted strike price, e.g. `$25,650`.
    pub const STRIKE_PRICE: &str = "Strike_Price";
    /// Close price of the aggregate.
    pub const CLOSE_PRICE: &str = "Close_Price";
    /// Traded volume in the aggregate.
    pub const VOLUME: &str = "Volume";
    /// Running total of traded volume for the contract.
    pub const ACCUMULATED_VOLUME: &str = "Accumulated_Volume";
    /// High price.
    pub const HIGH: &str = "High";
    /// Low price.
    pub const LOW: &str = "Low";
    /// Open price.
    pub const OPEN: &str = "Open";
    /// Volume-weighted average price.
    pub const VWAP: &str = "VWAP";
}

/// Option contract type as reported in `Option_Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    /// Call option.
    Call,
    /// Put option.
    Put,
}

impl OptionType {
    /// Returns the wire representation (`CALL` / `PUT`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "CALL",
            Self::Put => "PUT",
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Trade records
// ============================================================================

/// A single trade row, kept verbatim as sent by the backend.
///
/// No schema is enforced. Accessors default missing or malformed fields
/// at the point of use instead of rejecting the row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeRecord(BTreeMap<String, Value>);

impl TradeRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter, mostly useful for fixtures.
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    /// Returns the raw value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    /// Returns a field rendered as text; missing fields read as `""`.
    #[must_use]
    pub fn text(&self, field: &str) -> String {
        match self.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Parses a field the way the dashboard parses integers: leading integer
    /// prefix, anything else is `0`.
    #[must_use]
    pub fn int_field(&self, field: &str) -> i64 {
        match self.get(field) {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .unwrap_or(0),
            Some(Value::String(s)) => parse_int_prefix(s),
            _ => 0,
        }
    }

    /// Parses a field as a float; missing or invalid values are `0.0`.
    #[must_use]
    pub fn float_field(&self, field: &str) -> f64 {
        match self.get(field) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => parse_float_prefix(s),
            _ => 0.0,
        }
    }

    /// Raw `Option_Type` text.
    #[must_use]
    pub fn option_type_str(&self) -> String {
        self.text(fields::OPTION_TYPE)
    }

    /// Parsed option type, `None` for anything other than `CALL`/`PUT`.
    #[must_use]
    pub fn option_type(&self) -> Option<OptionType> {
        match self.get(fields::OPTION_TYPE) {
            Some(Value::String(s)) if s == "CALL" => Some(OptionType::Call),
            Some(Value::String(s)) if s == "PUT" => Some(OptionType::Put),
            _ => None,
        }
    }

    /// Raw `Strike_Price` text.
    #[must_use]
    pub fn strike_price(&self) -> String {
        self.text(fields::STRIKE_PRICE)
    }

    /// Strike price with every non-digit character removed.
    #[must_use]
    pub fn strike_digits(&self) -> String {
        strip_non_digits(&self.strike_price())
    }

    /// Parsed `Volume`.
    #[must_use]
    pub fn volume(&self) -> i64 {
        self.int_field(fields::VOLUME)
    }

    /// Returns true when `Volume` is present but does not start with a number.
    #[must_use]
    pub fn has_malformed_volume(&self) -> bool {
        match self.get(fields::VOLUME) {
            Some(Value::String(s)) => !starts_with_number(s),
            Some(Value::Number(_)) | None => false,
            Some(_) => true,
        }
    }

    /// Iterates over the fields of the record.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for TradeRecord {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Removes every character that is not an ASCII digit.
#[must_use]
pub fn strip_non_digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

fn starts_with_number(s: &str) -> bool {
    let t = s.trim_start();
    let t = t.strip_prefix(['+', '-']).unwrap_or(t);
    t.starts_with(|c: char| c.is_ascii_digit())
        || (t.starts_with('.') && t[1..].starts_with(|c: char| c.is_ascii_digit()))
}

/// Parses the leading integer of a string (`"120.5"` → 120, `"12abc"` → 12).
/// Strings without a leading integer parse as `0`.
#[must_use]
pub fn parse_int_prefix(s: &str) -> i64 {
    let t = s.trim_start();
    let (negative, rest) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };
    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return 0;
    }
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    if negative { -value } else { value }
}

/// Parses the leading decimal number of a string (`"12.5x"` → 12.5).
/// Strings without a leading number parse as `0.0`.
#[must_use]
pub fn parse_float_prefix(s: &str) -> f64 {
    let t = s.trim_start();
    let bytes = t.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot && !seen_exp => seen_dot = true,
            b'e' | b'E' if seen_digit && !seen_exp => {
                // only consume the exponent if digits follow it
                let mut look = end + 1;
                if matches!(bytes.get(look), Some(b'+' | b'-')) {
                    look += 1;
                }
                if !matches!(bytes.get(look), Some(b'0'..=b'9')) {
                    break;
                }
                seen_exp = true;
                end = look;
            }
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return 0.0;
    }
    t[..end]
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .unwrap_or(0.0)
}

// ============================================================================
// Options endpoint
// ============================================================================

/// Response of `GET /options`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsPayload {
    /// Trade rows, oldest first.
    #[serde(default)]
    pub data: Vec<TradeRecord>,
    /// Number of rows as counted by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Backend timestamp of the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
}

// ============================================================================
// Health endpoint
// ============================================================================

/// Market session reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarketStatus {
    /// Regular session.
    Open,
    /// Outside market hours.
    Closed,
    /// Before the open.
    PreMarket,
    /// Any value this client does not know about.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::PreMarket => write!(f, "pre-market"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Response of `GET /health`. Every field is optional.
///
/// A field with an unexpected type reads as `None` instead of rejecting the
/// whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSnapshot {
    /// Backend service status, `ok` when healthy.
    #[serde(deserialize_with = "lenient")]
    pub status: Option<String>,
    /// Whether the backend market-data stream is connected.
    #[serde(deserialize_with = "lenient")]
    pub websocket_running: Option<bool>,
    /// Number of rows the backend currently holds.
    #[serde(deserialize_with = "lenient")]
    pub data_count: Option<usize>,
    /// Strike the backend is currently subscribed around.
    #[serde(deserialize_with = "lenient")]
    pub current_strike: Option<f64>,
    /// Live NDX index price.
    #[serde(deserialize_with = "lenient")]
    pub live_ndx_price: Option<f64>,
    /// Seconds until the backend re-centers its subscriptions.
    #[serde(deserialize_with = "lenient_seconds")]
    pub next_refresh_seconds: Option<u64>,
    /// Market session.
    #[serde(deserialize_with = "lenient")]
    pub market_status: Option<MarketStatus>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Any finite number, truncated and clamped at zero.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc().max(0.0) as u64)
            }),
        _ => None,
    }))
}
