//! HTTP client library and dashboard logic for the NDX options monitor.
//!
//! This crate provides a typed HTTP client for the monitor backend API plus the
//! pure derivations the dashboard renders: filtering, summary statistics, the
//! sorted/paginated table and the volume-by-strike chart.
//!
//! Data flows one way: [`DataLoader`] → [`filter_records`] → {[`TradeStats`],
//! [`TableView`], [`volume_by_strike`]}.
//!
//! # Example
//!
//! ```no_run
//! use monitor_client::{
//!     ClientConfig, DataLoader, DashboardView, FilterState, MonitorClient, Poller, TableView,
//!     DEFAULT_POLL_INTERVAL,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), monitor_client::Error> {
//!     let client = MonitorClient::new(ClientConfig::from_env())?;
//!     let loader = DataLoader::new(client);
//!     let poller = Poller::spawn(loader.clone(), DEFAULT_POLL_INTERVAL);
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//!     let state = loader.snapshot();
//!     let view = DashboardView::derive(&state, &FilterState::default(), &TableView::new());
//!     println!("{} trades", view.stats.trades.total_trades);
//!
//!     poller.stop().await;
//!     Ok(())
//! }
//! ```

mod chart;
mod client;
mod dashboard;
mod error;
mod filter;
mod loader;
mod stats;
mod table;
mod types;
pub mod view;

pub use chart::{MAX_CHART_STRIKES, StrikeVolume, strike_number, volume_by_strike};
pub use client::{API_BASE_ENV, ClientConfig, DEFAULT_API_BASE, MonitorClient};
pub use dashboard::DashboardView;
pub use error::Error;
pub use filter::{FilterState, TypeFilter, filter_records};
pub use loader::{
    DEFAULT_POLL_INTERVAL, DataLoader, MonitorState, Poller, PollerHandle, RefreshOutcome,
};
pub use stats::{DashboardStats, TradeStats};
pub use table::{
    PAGE_SIZE, PageInfo, SortDirection, SortField, SortState, TableView, clamp_page, page_slice,
    sort_records, total_pages,
};
pub use types::*;
