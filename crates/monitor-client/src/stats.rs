//! Summary statistics over a filtered record set.

use crate::types::{HealthSnapshot, MarketStatus, OptionType, TradeRecord, fields};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Counts derived from the filtered trade records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TradeStats {
    /// Number of records.
    pub total_trades: usize,
    /// Distinct raw strike strings.
    pub unique_strikes: usize,
    /// Sum of parsed volumes.
    pub total_volume: i64,
    /// `floor(total_volume / total_trades)`, 0 when there are no trades.
    pub avg_volume: i64,
    /// Records typed `CALL`.
    pub call_count: usize,
    /// Records typed `PUT`.
    pub put_count: usize,
}

impl TradeStats {
    /// Aggregates the given records.
    #[must_use]
    pub fn from_records(records: &[&TradeRecord]) -> Self {
        let total_trades = records.len();
        // keyed on the raw JSON value: 25650 and "25650" are distinct strikes
        let unique_strikes = records
            .iter()
            .map(|r| r.get(fields::STRIKE_PRICE).map(Value::to_string))
            .collect::<HashSet<_>>()
            .len();
        let total_volume: i64 = records.iter().map(|r| r.volume()).fold(0, i64::saturating_add);
        let avg_volume = if total_trades > 0 {
            total_volume.div_euclid(total_trades as i64)
        } else {
            0
        };

        let mut call_count = 0;
        let mut put_count = 0;
        for record in records {
            match record.option_type() {
                Some(OptionType::Call) => call_count += 1,
                Some(OptionType::Put) => put_count += 1,
                None => {}
            }
        }

        Self {
            total_trades,
            unique_strikes,
            total_volume,
            avg_volume,
            call_count,
            put_count,
        }
    }
}

/// Trade statistics combined with the latest health snapshot for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Aggregates over the filtered records.
    pub trades: TradeStats,
    /// Strike the backend is centered on.
    pub current_strike: Option<f64>,
    /// Live NDX price.
    pub live_ndx_price: Option<f64>,
    /// Seconds until the backend re-centers.
    pub next_refresh_seconds: Option<u64>,
    /// Market session.
    pub market_status: Option<MarketStatus>,
    /// Time of the last successful trade fetch.
    pub last_update: Option<DateTime<Utc>>,
}

impl DashboardStats {
    /// Combines trade statistics with a health snapshot; health fields pass
    /// through unmodified.
    #[must_use]
    pub fn new(
        trades: TradeStats,
        health: Option<&HealthSnapshot>,
        last_update: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            trades,
            current_strike: health.and_then(|h| h.current_strike),
            live_ndx_price: health.and_then(|h| h.live_ndx_price),
            next_refresh_seconds: health.and_then(|h| h.next_refresh_seconds),
            market_status: health.and_then(|h| h.market_status),
            last_update,
        }
    }
}
