//! "In Use" LED blinker

use defmt::*;
use embassy_time::Duration;

use kpanel_core::producers::run_blinker;
use kpanel_protocol::LedFlag;

use crate::channels::PanelLink;

#[embassy_executor::task]
pub async fn blinker_task(link: &'static PanelLink, interval: Duration) {
    info!("Blinker task started");
    let err = run_blinker(link, LedFlag::InUse, interval).await;
    warn!("Blinker task stopped: {}", err);
}
