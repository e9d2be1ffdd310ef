//! Periodic link diagnostics

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::channels::PanelLink;

#[embassy_executor::task]
pub async fn stats_task(link: &'static PanelLink, interval: Duration) {
    let mut ticker = Ticker::every(interval);

    loop {
        ticker.next().await;

        let stats = link.stats();
        info!(
            "Link: {} frames, {} retries, {} acks, {} status, {} key reports, {} dropped, {} rx errors",
            stats.frames_sent,
            stats.retries,
            stats.acks,
            stats.ignored_status,
            stats.key_reports,
            stats.dropped_events,
            stats.rx_errors
        );

        if link.is_shut_down() {
            info!("Link shut down, stats task exiting");
            return;
        }
    }
}
