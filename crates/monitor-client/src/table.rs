//! Sorted, paginated table over the filtered records.

use crate::types::{TradeRecord, fields};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Rows per table page.
pub const PAGE_SIZE: usize = 50;

/// Sortable table column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortField {
    /// Observation time.
    #[default]
    Timestamp,
    /// Raw option symbol.
    Symbol,
    /// CALL/PUT.
    OptionType,
    /// Formatted strike.
    StrikePrice,
    /// Close price.
    ClosePrice,
    /// Aggregate volume.
    Volume,
    /// Running volume.
    AccumulatedVolume,
    /// High price.
    High,
    /// Low price.
    Low,
    /// Open price.
    Open,
    /// Volume-weighted average price.
    Vwap,
}

impl SortField {
    /// Record field backing this column.
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::Timestamp => fields::TIMESTAMP,
            Self::Symbol => fields::SYMBOL,
            Self::OptionType => fields::OPTION_TYPE,
            Self::StrikePrice => fields::STRIKE_PRICE,
            Self::ClosePrice => fields::CLOSE_PRICE,
            Self::Volume => fields::VOLUME,
            Self::AccumulatedVolume => fields::ACCUMULATED_VOLUME,
            Self::High => fields::HIGH,
            Self::Low => fields::LOW,
            Self::Open => fields::OPEN,
            Self::Vwap => fields::VWAP,
        }
    }

    /// Numeric columns compare by parsed float value.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::ClosePrice
                | Self::Volume
                | Self::AccumulatedVolume
                | Self::High
                | Self::Low
                | Self::Open
                | Self::Vwap
        )
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    #[default]
    Desc,
}

impl SortDirection {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    /// Column being sorted.
    pub field: SortField,
    /// Direction.
    pub direction: SortDirection,
}

impl SortState {
    /// Selecting the active field flips direction; a new field sorts descending.
    pub fn select(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Desc;
        }
    }

    /// Compares two records under this sort.
    #[must_use]
    pub fn compare(&self, a: &TradeRecord, b: &TradeRecord) -> Ordering {
        let ord = if self.field.is_numeric() {
            let name = self.field.field_name();
            compare_numbers(a.float_field(name), b.float_field(name))
        } else {
            raw_key(a, self.field.field_name()).cmp(&raw_key(b, self.field.field_name()))
        };

        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Parsed values are finite, so `-0.0` and `0.0` tie.
fn compare_numbers(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Ordering key for non-numeric columns. Numbers sort before text.
#[derive(Debug, PartialEq)]
enum RawKey {
    Number(f64),
    Text(String),
}

impl Eq for RawKey {}

impl PartialOrd for RawKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RawKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => compare_numbers(*a, *b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

fn raw_key(record: &TradeRecord, field: &str) -> RawKey {
    match record.get(field) {
        Some(Value::Number(n)) => RawKey::Number(n.as_f64().unwrap_or(0.0)),
        _ => RawKey::Text(record.text(field)),
    }
}

/// Returns the records sorted by `sort`; the input is left untouched.
#[must_use]
pub fn sort_records<'a>(records: &[&'a TradeRecord], sort: &SortState) -> Vec<&'a TradeRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| sort.compare(a, b));
    sorted
}

/// Number of pages for `count` rows; zero rows means zero pages.
#[must_use]
pub const fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE)
}

/// Clamps a 1-based page index into `[1, max(1, total_pages)]`.
#[must_use]
pub fn clamp_page(page: usize, count: usize) -> usize {
    page.clamp(1, total_pages(count).max(1))
}

/// Rows of a 1-based page. Out-of-range pages are clamped first.
#[must_use]
pub fn page_slice<'s, 'a>(sorted: &'s [&'a TradeRecord], page: usize) -> &'s [&'a TradeRecord] {
    let page = clamp_page(page, sorted.len());
    let start = ((page - 1) * PAGE_SIZE).min(sorted.len());
    let end = (start + PAGE_SIZE).min(sorted.len());
    &sorted[start..end]
}

/// Position summary shown above the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// Current 1-based page.
    pub page: usize,
    /// Total pages.
    pub total_pages: usize,
    /// 1-based index of the first row shown (0 when empty).
    pub first_row: usize,
    /// 1-based index of the last row shown.
    pub last_row: usize,
    /// Total rows.
    pub total_rows: usize,
}

impl std::fmt::Display for PageInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Showing {}-{} of {} trades",
            self.first_row, self.last_row, self.total_rows
        )
    }
}

/// Per-view sort and page state. Each table instance owns its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableView {
    sort: SortState,
    page: usize,
}

impl Default for TableView {
    fn default() -> Self {
        Self {
            sort: SortState::default(),
            page: 1,
        }
    }
}

impl TableView {
    /// Creates a view with the default sort (timestamp, descending) on page 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Active sort.
    #[must_use]
    pub fn sort(&self) -> SortState {
        self.sort
    }

    /// Current page for `count` rows, clamped.
    #[must_use]
    pub fn page(&self, count: usize) -> usize {
        clamp_page(self.page, count)
    }

    /// Header click on `field`.
    pub fn select_sort(&mut self, field: SortField) {
        self.sort.select(field);
    }

    /// Whether a previous page exists.
    #[must_use]
    pub fn has_prev(&self, count: usize) -> bool {
        self.page(count) > 1
    }

    /// Whether a next page exists.
    #[must_use]
    pub fn has_next(&self, count: usize) -> bool {
        self.page(count) < total_pages(count)
    }

    /// Moves to the previous page; no-op on the first page.
    pub fn prev_page(&mut self, count: usize) {
        if self.has_prev(count) {
            self.page = self.page(count) - 1;
        }
    }

    /// Moves to the next page; no-op on the last page.
    pub fn next_page(&mut self, count: usize) {
        if self.has_next(count) {
            self.page = self.page(count) + 1;
        }
    }

    /// Sorts `records` and returns the current page with its position info.
    #[must_use]
    pub fn render<'a>(&self, records: &[&'a TradeRecord]) -> (Vec<&'a TradeRecord>, PageInfo) {
        let sorted = sort_records(records, &self.sort);
        let page = self.page(sorted.len());
        let rows = page_slice(&sorted, page).to_vec();
        let first_row = if rows.is_empty() {
            0
        } else {
            (page - 1) * PAGE_SIZE + 1
        };
        let info = PageInfo {
            page,
            total_pages: total_pages(sorted.len()),
            first_row,
            last_row: (page - 1) * PAGE_SIZE + rows.len(),
            total_rows: sorted.len(),
        };
        (rows, info)
    }
}
