//! Text formatting for stat cards, table rows and the terminal dashboard.

use crate::dashboard::DashboardView;
use crate::stats::DashboardStats;
use crate::types::{TradeRecord, fields};
use chrono::{DateTime, Utc};

/// Placeholder shown for health values that have not arrived.
pub const LOADING: &str = "Loading...";

/// Formats an integer with thousands separators (`25650` → `25,650`).
#[must_use]
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a countdown as `m:ss`.
#[must_use]
pub fn format_countdown(seconds: Option<u64>) -> String {
    match seconds {
        Some(s) => format!("{}:{:02}", s / 60, s % 60),
        None => LOADING.to_string(),
    }
}

/// Formats a dollar level rounded to whole units; zero or missing is still loading.
#[must_use]
pub fn format_level(value: Option<f64>) -> String {
    match value {
        Some(v) if v != 0.0 && v.is_finite() => format!("${}", format_number(v.round() as i64)),
        _ => LOADING.to_string(),
    }
}

/// Human "time ago" string.
#[must_use]
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    if seconds < 60 {
        format!("{}s ago", seconds)
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{}h ago", seconds / 3600)
    } else {
        format!("{}d ago", seconds / 86400)
    }
}

/// A titled value on the stats strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    /// Card title.
    pub title: &'static str,
    /// Rendered value.
    pub value: String,
}

/// Builds the five dashboard cards.
#[must_use]
pub fn stat_cards(stats: &DashboardStats) -> Vec<StatCard> {
    vec![
        StatCard {
            title: "Current Strike",
            value: format_level(stats.current_strike),
        },
        StatCard {
            title: "Live NDX Price",
            value: format_level(stats.live_ndx_price),
        },
        StatCard {
            title: "Next Refresh",
            value: format_countdown(stats.next_refresh_seconds),
        },
        StatCard {
            title: "CALL Options",
            value: format_number(stats.trades.call_count as i64),
        },
        StatCard {
            title: "PUT Options",
            value: format_number(stats.trades.put_count as i64),
        },
    ]
}

/// Cells of one table row: time, type, strike, price, volume, total volume, high, low.
#[must_use]
pub fn table_cells(record: &TradeRecord) -> [String; 8] {
    let time = record.text(fields::TIMESTAMP);
    [
        if time.is_empty() { "-".to_string() } else { time },
        record.option_type_str(),
        record.strike_price(),
        format!("${:.2}", record.float_field(fields::CLOSE_PRICE)),
        format_number(record.volume()),
        format_number(record.int_field(fields::ACCUMULATED_VOLUME)),
        format!("${:.2}", record.float_field(fields::HIGH)),
        format!("${:.2}", record.float_field(fields::LOW)),
    ]
}

/// Renders the whole dashboard as plain text.
#[must_use]
pub fn render_dashboard(view: &DashboardView<'_>, now: DateTime<Utc>) -> String {
    let status = if view.loading { "Updating..." } else { "LIVE" };
    let updated = view
        .stats
        .last_update
        .map(|t| format!("Updated {}", time_ago(t, now)))
        .unwrap_or_default();

    let mut out = format!("NDX Options Monitor  [{}]  {}\n", status, updated);
    let cards: Vec<String> = stat_cards(&view.stats)
        .iter()
        .map(|card| format!("{}: {}", card.title, card.value))
        .collect();
    out.push_str(&cards.join("   "));
    out.push('\n');

    if let Some(error) = view.error {
        out.push_str(&format!("\nError Loading Data: {}\n", error));
        out.push_str("Retrying on the next refresh.\n");
        return out;
    }

    if view.is_initial_load() {
        out.push_str("\nLoading data...\n");
        return out;
    }
    if view.page_info.total_rows == 0 {
        out.push_str("\nNo Data Available. Waiting for options data from the backend...\n");
        return out;
    }

    if !view.chart.is_empty() {
        out.push_str("\nVolume by Strike Price\n");
        for group in &view.chart {
            out.push_str(&format!(
                "  {:>10}  CALL {:>8}  PUT {:>8}\n",
                group.strike,
                format_number(group.call_volume),
                format_number(group.put_volume)
            ));
        }
    }

    out.push_str(&format!("\n{}\n", view.page_info));
    out.push_str(&table_row(&[
        "Time", "Type", "Strike", "Price", "Volume", "Total Vol", "High", "Low",
    ]));
    for row in &view.rows {
        out.push_str(&table_row(&table_cells(row)));
    }
    if view.page_info.total_pages > 1 {
        out.push_str(&format!(
            "Page {} of {}\n",
            view.page_info.page, view.page_info.total_pages
        ));
    }

    out
}

fn table_row<S: AsRef<str>>(c: &[S; 8]) -> String {
    format!(
        "{:<20} {:<5} {:>9} {:>9} {:>8} {:>10} {:>9} {:>9}\n",
        c[0].as_ref(),
        c[1].as_ref(),
        c[2].as_ref(),
        c[3].as_ref(),
        c[4].as_ref(),
        c[5].as_ref(),
        c[6].as_ref(),
        c[7].as_ref()
    )
}
