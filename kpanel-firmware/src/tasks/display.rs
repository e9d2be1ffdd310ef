//! LCD refresh task
//!
//! Sends [`FRAME`] whenever [`FRAME_CHANGED`] fires, and on a fixed
//! cadence otherwise.

use defmt::*;
use embassy_time::Duration;

use kpanel_core::producers::run_display_refresh;

use crate::channels::{PanelLink, FRAME, FRAME_CHANGED};

#[embassy_executor::task]
pub async fn display_task(link: &'static PanelLink, interval: Duration) {
    info!("Display task started");
    let err = run_display_refresh(link, &FRAME, &FRAME_CHANGED, interval).await;
    warn!("Display task stopped: {}", err);
}
