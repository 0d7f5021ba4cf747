//! Filter engine over the trade record set.
//!
//! Filtering is a pure derivation: it borrows from the source records and
//! never mutates them, so the same [`FilterState`] can be re-applied to its
//! own output without changing it.

use crate::types::{OptionType, TradeRecord, strip_non_digits};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Option-type selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TypeFilter {
    /// No filtering on option type.
    #[default]
    All,
    /// Only call rows.
    Call,
    /// Only put rows.
    Put,
}

impl TypeFilter {
    /// Returns true when the record's raw type passes this selector.
    #[must_use]
    pub fn matches(&self, record: &TradeRecord) -> bool {
        match self {
            Self::All => true,
            Self::Call => record.option_type() == Some(OptionType::Call),
            Self::Put => record.option_type() == Some(OptionType::Put),
        }
    }
}

impl std::fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "ALL"),
            Self::Call => write!(f, "CALL"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ALL" | "" => Ok(Self::All),
            "CALL" | "C" => Ok(Self::Call),
            "PUT" | "P" => Ok(Self::Put),
            other => Err(format!("invalid option type filter: {other}")),
        }
    }
}

/// User-selected filter criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Option type selector.
    pub option_type: TypeFilter,
    /// Rows with a parsed volume below this are dropped.
    pub min_volume: i64,
    /// Strike search text; only its digits are significant.
    pub search_strike: String,
}

impl FilterState {
    /// Resets every criterion to its default.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Returns true when no criterion restricts the record set.
    #[must_use]
    pub fn is_pass_through(&self) -> bool {
        self.option_type == TypeFilter::All
            && self.min_volume <= 0
            && strip_non_digits(&self.search_strike).is_empty()
    }

    /// Returns true when the record passes every active criterion.
    #[must_use]
    pub fn matches(&self, record: &TradeRecord) -> bool {
        if !self.option_type.matches(record) {
            return false;
        }

        if record.volume() < self.min_volume {
            return false;
        }

        if !self.search_strike.is_empty() {
            let needle = strip_non_digits(&self.search_strike);
            if !record.strike_digits().contains(&needle) {
                return false;
            }
        }

        true
    }
}

/// Returns the records that pass `filter`, in their original order.
pub fn filter_records<'a, I>(records: I, filter: &FilterState) -> Vec<&'a TradeRecord>
where
    I: IntoIterator<Item = &'a TradeRecord>,
{
    records.into_iter().filter(|r| filter.matches(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fields;

    fn record(option_type: &str, strike: &str, volume: &str) -> TradeRecord {
        TradeRecord::new()
            .with(fields::OPTION_TYPE, option_type)
            .with(fields::STRIKE_PRICE, strike)
            .with(fields::VOLUME, volume)
    }

    fn sample() -> Vec<TradeRecord> {
        vec![
            record("CALL", "$25,650", "120"),
            record("PUT", "$25,650", "80"),
            record("CALL", "$24,000", "300"),
            record("PUT", "$25,600", "abc"),
            record("UNK", "$25,700", "45"),
        ]
    }

    #[test]
    fn test_default_filter_is_identity() {
        let records = sample();
        let filtered = filter_records(&records, &FilterState::default());

        assert_eq!(filtered.len(), records.len());
        for (a, b) in filtered.iter().zip(records.iter()) {
            assert_eq!(*a, b);
        }
    }

    #[test]
    fn test_type_filter_call() {
        let records = sample();
        let filter = FilterState {
            option_type: TypeFilter::Call,
            ..Default::default()
        };

        let filtered = filter_records(&records, &filter);
        assert_eq!(filtered.len(), 2);
        assert!(
            filtered
                .iter()
                .all(|r| r.option_type() == Some(OptionType::Call))
        );
    }

    #[test]
    fn test_type_filter_put() {
        let records = sample();
        let filter = FilterState {
            option_type: TypeFilter::Put,
            ..Default::default()
        };

        assert_eq!(filter_records(&records, &filter).len(), 2);
    }

    #[test]
    fn test_min_volume_drops_low_and_non_numeric() {
        let records = sample();
        let filter = FilterState {
            min_volume: 100,
            ..Default::default()
        };

        let filtered = filter_records(&records, &filter);
        let volumes: Vec<i64> = filtered.iter().map(|r| r.volume()).collect();
        assert_eq!(volumes, vec![120, 300]);
    }

    #[test]
    fn test_min_volume_zero_keeps_non_numeric() {
        let records = vec![record("PUT", "$25,600", "abc")];
        let filter = FilterState::default();

        assert_eq!(filter_records(&records, &filter).len(), 1);
    }

    #[test]
    fn test_strike_search_substring() {
        let records = vec![
            record("CALL", "$25,650", "10"),
            record("CALL", "$24,000", "10"),
        ];
        let filter = FilterState {
            search_strike: "650".to_string(),
            ..Default::default()
        };

        let filtered = filter_records(&records, &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].strike_price(), "$25,650");
    }

    #[test]
    fn test_strike_search_ignores_formatting() {
        let records = sample();
        let filter = FilterState {
            search_strike: "$25,6".to_string(),
            ..Default::default()
        };

        assert_eq!(filter_records(&records, &filter).len(), 3);
    }

    #[test]
    fn test_strike_search_without_digits_matches_all() {
        let records = sample();
        let filter = FilterState {
            search_strike: "$,".to_string(),
            ..Default::default()
        };

        assert_eq!(filter_records(&records, &filter).len(), records.len());
    }

    #[test]
    fn test_criteria_are_combined() {
        let records = sample();
        let filter = FilterState {
            option_type: TypeFilter::Call,
            min_volume: 100,
            search_strike: "256".to_string(),
        };

        let filtered = filter_records(&records, &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].volume(), 120);
    }

    #[test]
    fn test_filter_is_subset_and_idempotent() {
        let records = sample();
        let filters = [
            FilterState::default(),
            FilterState {
                option_type: TypeFilter::Put,
                ..Default::default()
            },
            FilterState {
                min_volume: 50,
                search_strike: "25".to_string(),
                ..Default::default()
            },
        ];

        for filter in &filters {
            let once = filter_records(&records, filter);
            assert!(once.iter().all(|r| records.iter().any(|s| std::ptr::eq(*r, s))));

            let twice = filter_records(once.iter().copied(), filter);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_clear_resets_state() {
        let mut filter = FilterState {
            option_type: TypeFilter::Put,
            min_volume: 200,
            search_strike: "25".to_string(),
        };
        assert!(!filter.is_pass_through());

        filter.clear();
        assert_eq!(filter, FilterState::default());
        assert!(filter.is_pass_through());
    }

    #[test]
    fn test_type_filter_from_str() {
        assert_eq!("call".parse::<TypeFilter>().unwrap(), TypeFilter::Call);
        assert_eq!("PUT".parse::<TypeFilter>().unwrap(), TypeFilter::Put);
        assert_eq!("".parse::<TypeFilter>().unwrap(), TypeFilter::All);
        assert!("straddle".parse::<TypeFilter>().is_err());
    }

    #[test]
    fn test_extreme_volumes_and_thresholds() {
        let records = vec![
            record("CALL", "$25,650", "99999999999999999999"),
            record("PUT", "$25,650", "-99999999999999999999"),
            record("CALL", "$25,650", "-5"),
        ];

        let filter = FilterState {
            min_volume: i64::MAX,
            ..Default::default()
        };
        assert_eq!(filter_records(&records, &filter).len(), 1);

        let filter = FilterState {
            min_volume: i64::MIN,
            ..Default::default()
        };
        assert_eq!(filter_records(&records, &filter).len(), 3);

        let filter = FilterState {
            min_volume: -5,
            ..Default::default()
        };
        let kept = filter_records(&records, &filter);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.volume() >= -5));
    }
}
