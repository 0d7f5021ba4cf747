//! Terminal dashboard for the NDX options monitor.
//!
//! Polls the API every five seconds and prints the stat cards, the volume by
//! strike chart and the first table page. Filters come from the environment:
//!
//! - `MONITOR_OPTION_TYPE`: `ALL`, `CALL` or `PUT`
//! - `MONITOR_MIN_VOLUME`: minimum per-trade volume
//! - `MONITOR_STRIKE`: strike search text

use anyhow::{Context, anyhow};
use chrono::Utc;
use monitor_client::view::render_dashboard;
use monitor_client::{
    ClientConfig, DEFAULT_POLL_INTERVAL, DashboardView, DataLoader, FilterState, MonitorClient,
    Poller, TableView, TypeFilter,
};
use ndx_options_monitor::shutdown::shutdown_signal;
use std::time::Duration;
use tokio::time::{Instant, interval_at};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Reads the filter selection from the environment.
fn filter_from_env() -> anyhow::Result<FilterState> {
    let mut filter = FilterState::default();

    if let Ok(value) = std::env::var("MONITOR_OPTION_TYPE") {
        filter.option_type = value
            .parse::<TypeFilter>()
            .map_err(|e| anyhow!(e))
            .context("MONITOR_OPTION_TYPE must be ALL, CALL or PUT")?;
    }
    if let Ok(value) = std::env::var("MONITOR_MIN_VOLUME") {
        filter.min_volume = value
            .trim()
            .parse()
            .with_context(|| format!("MONITOR_MIN_VOLUME must be a number: {value}"))?;
    }
    if let Ok(value) = std::env::var("MONITOR_STRIKE") {
        filter.search_strike = value;
    }

    Ok(filter)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let filter = filter_from_env()?;
    let table = TableView::new();
    let config = ClientConfig::from_env();
    info!("Monitoring {} with filter {:?}", config.base_url, filter);

    let client = MonitorClient::new(config).context("invalid API_BASE")?;
    let loader = DataLoader::new(client);
    let poller = Poller::spawn(loader.clone(), DEFAULT_POLL_INTERVAL);

    // Render shortly after each poll tick so fresh data is on screen
    let mut render = interval_at(Instant::now() + Duration::from_secs(1), DEFAULT_POLL_INTERVAL);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                info!("{} received, stopping", signal);
                break;
            }
            _ = render.tick() => {
                let state = loader.snapshot();
                let view = DashboardView::derive(&state, &filter, &table);
                print!("\x1b[2J\x1b[H{}", render_dashboard(&view, Utc::now()));
            }
        }
    }

    poller.stop().await;
    Ok(())
}
