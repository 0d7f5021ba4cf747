//! Volume-by-strike aggregation for the bar chart.

use crate::types::{OptionType, TradeRecord, strip_non_digits};
use serde::Serialize;
use std::collections::HashMap;

/// Maximum number of strike groups charted.
pub const MAX_CHART_STRIKES: usize = 20;

/// Summed volume for one strike, split by option type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrikeVolume {
    /// Raw strike label, e.g. `$25,650`.
    pub strike: String,
    /// Strike with non-digits removed, used for ordering.
    pub strike_num: u64,
    /// Summed CALL volume.
    pub call_volume: i64,
    /// Summed PUT volume.
    pub put_volume: i64,
}

impl StrikeVolume {
    /// CALL plus PUT volume.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.call_volume.saturating_add(self.put_volume)
    }
}

/// Numeric value of a strike label; labels without digits are `0`.
#[must_use]
pub fn strike_number(strike: &str) -> u64 {
    let digits = strip_non_digits(strike);
    if digits.is_empty() {
        0
    } else {
        digits.parse().unwrap_or(u64::MAX)
    }
}

/// Groups records by raw strike, sums CALL/PUT volume, orders groups by
/// numeric strike ascending and keeps the first [`MAX_CHART_STRIKES`].
///
/// Rows without a strike are skipped. Rows of other types still create their
/// group but add no volume.
#[must_use]
pub fn volume_by_strike(records: &[&TradeRecord]) -> Vec<StrikeVolume> {
    let mut groups: Vec<StrikeVolume> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let strike = record.strike_price();
        if strike.is_empty() {
            continue;
        }

        let slot = *index.entry(strike.clone()).or_insert_with(|| {
            groups.push(StrikeVolume {
                strike_num: strike_number(&strike),
                strike: strike.clone(),
                call_volume: 0,
                put_volume: 0,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        match record.option_type() {
            Some(OptionType::Call) => {
                group.call_volume = group.call_volume.saturating_add(record.volume());
            }
            Some(OptionType::Put) => {
                group.put_volume = group.put_volume.saturating_add(record.volume());
            }
            None => {}
        }
    }

    // stable: equal strike numbers keep first-seen order
    groups.sort_by_key(|g| g.strike_num);
    groups.truncate(MAX_CHART_STRIKES);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fields;

    fn record(option_type: &str, strike: &str, volume: i64) -> TradeRecord {
        TradeRecord::new()
            .with(fields::OPTION_TYPE, option_type)
            .with(fields::STRIKE_PRICE, strike)
            .with(fields::VOLUME, volume)
    }

    #[test]
    fn test_strike_number() {
        assert_eq!(strike_number("$25,650"), 25650);
        assert_eq!(strike_number("24000"), 24000);
        assert_eq!(strike_number("n/a"), 0);
    }

    #[test]
    fn test_groups_split_by_type() {
        let records = vec![
            record("CALL", "$25,650", 120),
            record("PUT", "$25,650", 80),
            record("CALL", "$25,650", 30),
        ];
        let refs: Vec<&TradeRecord> = records.iter().collect();

        let chart = volume_by_strike(&refs);
        assert_eq!(chart.len(), 1);
        assert_eq!(chart[0].strike, "$25,650");
        assert_eq!(chart[0].strike_num, 25650);
        assert_eq!(chart[0].call_volume, 150);
        assert_eq!(chart[0].put_volume, 80);
        assert_eq!(chart[0].total(), 230);
    }

    #[test]
    fn test_sorted_numerically_not_lexicographically() {
        let records = vec![
            record("CALL", "$9,000", 1),
            record("CALL", "$25,650", 1),
            record("PUT", "$10,500", 1),
        ];
        let refs: Vec<&TradeRecord> = records.iter().collect();

        let strikes: Vec<u64> = volume_by_strike(&refs)
            .iter()
            .map(|g| g.strike_num)
            .collect();
        assert_eq!(strikes, vec![9000, 10500, 25650]);
    }

    #[test]
    fn test_truncates_to_twenty_lowest_strikes() {
        let records: Vec<TradeRecord> = (0..30u64)
            .rev()
            .map(|i| record("CALL", &format!("${}", 25000 + i * 10), 5))
            .collect();
        let refs: Vec<&TradeRecord> = records.iter().collect();

        let chart = volume_by_strike(&refs);
        assert_eq!(chart.len(), MAX_CHART_STRIKES);
        assert_eq!(chart[0].strike_num, 25000);
        assert_eq!(chart[19].strike_num, 25190);
    }

    #[test]
    fn test_skips_rows_without_strike() {
        let records = vec![record("CALL", "", 100), TradeRecord::new()];
        let refs: Vec<&TradeRecord> = records.iter().collect();

        assert!(volume_by_strike(&refs).is_empty());
    }

    #[test]
    fn test_unknown_type_creates_empty_group() {
        let records = vec![record("UNK", "$25,700", 45)];
        let refs: Vec<&TradeRecord> = records.iter().collect();

        let chart = volume_by_strike(&refs);
        assert_eq!(chart.len(), 1);
        assert_eq!(chart[0].total(), 0);
    }

    #[test]
    fn test_volume_conserved_for_charted_strikes() {
        let records: Vec<TradeRecord> = (0..60u64)
            .map(|i| {
                let kind = if i % 2 == 0 { "CALL" } else { "PUT" };
                record(kind, &format!("${}", 24000 + (i % 25) * 50), (i as i64) + 1)
            })
            .collect();
        let refs: Vec<&TradeRecord> = records.iter().collect();

        let chart = volume_by_strike(&refs);
        let charted: std::collections::HashSet<&str> =
            chart.iter().map(|g| g.strike.as_str()).collect();

        let chart_total: i64 = chart.iter().map(StrikeVolume::total).sum();
        let input_total: i64 = refs
            .iter()
            .filter(|r| charted.contains(r.strike_price().as_str()))
            .map(|r| r.volume())
            .sum();
        assert_eq!(chart_total, input_total);
    }

    #[test]
    fn test_extreme_volumes_saturate() {
        let huge = "99999999999999999999";
        let records = vec![
            TradeRecord::new()
                .with(fields::OPTION_TYPE, "CALL")
                .with(fields::STRIKE_PRICE, "$25,650")
                .with(fields::VOLUME, huge),
            TradeRecord::new()
                .with(fields::OPTION_TYPE, "CALL")
                .with(fields::STRIKE_PRICE, "$25,650")
                .with(fields::VOLUME, "5"),
            TradeRecord::new()
                .with(fields::OPTION_TYPE, "PUT")
                .with(fields::STRIKE_PRICE, "$25,650")
                .with(fields::VOLUME, huge),
            TradeRecord::new()
                .with(fields::OPTION_TYPE, "PUT")
                .with(fields::STRIKE_PRICE, "$24,000")
                .with(fields::VOLUME, "-99999999999999999999"),
            TradeRecord::new()
                .with(fields::OPTION_TYPE, "PUT")
                .with(fields::STRIKE_PRICE, "$24,000")
                .with(fields::VOLUME, "-7"),
        ];
        let refs: Vec<&TradeRecord> = records.iter().collect();

        let chart = volume_by_strike(&refs);
        assert_eq!(chart.len(), 2);
        assert_eq!(chart[0].put_volume, i64::MIN);
        assert_eq!(chart[1].call_volume, i64::MAX);
        assert_eq!(chart[1].total(), i64::MAX);
    }
}
