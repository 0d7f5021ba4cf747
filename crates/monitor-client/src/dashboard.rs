//! One-shot derivation of everything the dashboard shows.

use crate::chart::{StrikeVolume, volume_by_strike};
use crate::filter::{FilterState, filter_records};
use crate::loader::MonitorState;
use crate::stats::{DashboardStats, TradeStats};
use crate::table::{PageInfo, TableView};
use crate::types::TradeRecord;

/// Derived dashboard contents, borrowing rows from a [`MonitorState`].
#[derive(Debug, Clone)]
pub struct DashboardView<'a> {
    /// Stat card values.
    pub stats: DashboardStats,
    /// Rows of the current table page.
    pub rows: Vec<&'a TradeRecord>,
    /// Table position.
    pub page_info: PageInfo,
    /// Chart groups.
    pub chart: Vec<StrikeVolume>,
    /// Blocking error replacing the table.
    pub error: Option<&'a str>,
    /// Whether a refresh is running.
    pub loading: bool,
}

impl<'a> DashboardView<'a> {
    /// Filters once and derives stats, table page and chart from the result.
    #[must_use]
    pub fn derive(state: &'a MonitorState, filter: &FilterState, table: &TableView) -> Self {
        let filtered = filter_records(state.records.iter(), filter);
        let trades = TradeStats::from_records(&filtered);
        let stats = DashboardStats::new(trades, state.health.as_ref(), state.last_update);
        let (rows, page_info) = table.render(&filtered);
        let chart = volume_by_strike(&filtered);

        Self {
            stats,
            rows,
            page_info,
            chart,
            error: state.error.as_deref(),
            loading: state.loading,
        }
    }

    /// True when there is nothing to show yet and a load is running.
    #[must_use]
    pub fn is_initial_load(&self) -> bool {
        self.loading && self.page_info.total_rows == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TypeFilter;
    use crate::types::{HealthSnapshot, fields};
    use std::sync::Arc;

    fn state() -> MonitorState {
        MonitorState {
            records: Arc::new(vec![
                TradeRecord::new()
                    .with(fields::OPTION_TYPE, "CALL")
                    .with(fields::STRIKE_PRICE, "$25,650")
                    .with(fields::VOLUME, "120"),
                TradeRecord::new()
                    .with(fields::OPTION_TYPE, "PUT")
                    .with(fields::STRIKE_PRICE, "$25,650")
                    .with(fields::VOLUME, "80"),
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn test_derive_default_filters() {
        let state = state();
        let view = DashboardView::derive(&state, &FilterState::default(), &TableView::new());

        assert_eq!(view.stats.trades.total_trades, 2);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.chart.len(), 1);
        assert_eq!(view.chart[0].call_volume, 120);
        assert_eq!(view.chart[0].put_volume, 80);
        assert!(view.error.is_none());
    }

    #[test]
    fn test_derive_applies_filter_everywhere() {
        let state = state();
        let filter = FilterState {
            option_type: TypeFilter::Put,
            ..Default::default()
        };
        let view = DashboardView::derive(&state, &filter, &TableView::new());

        assert_eq!(view.stats.trades.total_trades, 1);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.chart[0].call_volume, 0);
        assert_eq!(state.records.len(), 2);
    }

    #[test]
    fn test_derive_with_health_and_error() {
        let mut state = state();
        state.health = Some(HealthSnapshot {
            current_strike: Some(25650.0),
            ..Default::default()
        });
        state.error = Some("HTTP request failed".to_string());

        let view = DashboardView::derive(&state, &FilterState::default(), &TableView::new());
        assert_eq!(view.stats.current_strike, Some(25650.0));
        assert_eq!(view.error, Some("HTTP request failed"));
        // stale rows are still derived underneath the error view
        assert_eq!(view.rows.len(), 2);
    }

    #[test]
    fn test_initial_load() {
        let state = MonitorState {
            loading: true,
            ..Default::default()
        };
        let view = DashboardView::derive(&state, &FilterState::default(), &TableView::new());

        assert!(view.is_initial_load());
    }
}
