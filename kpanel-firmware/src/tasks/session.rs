//! Session task
//!
//! Resets the panel controller, runs the init table, then supervises the
//! link: the first fatal error from any producer powers the panel down.

use defmt::*;

use kpanel_core::Session;
use kpanel_hal_rp2040::EnablePin;

use crate::channels::PanelLink;

#[embassy_executor::task]
pub async fn session_task(link: &'static PanelLink, enable: EnablePin) {
    let mut session = Session::new(link, enable);

    info!("Bringing up panel");
    if let Err(e) = session.bring_up().await {
        error!("Panel bring-up failed: {}", e);
        if e.is_transport_defect() {
            error!("UART driver fault, check TX wiring and buffer size");
        }
        return;
    }
    info!("Panel ready");

    let err = session.supervise().await;
    if err.is_link_lost() {
        error!("Panel stopped acknowledging ({}), controller powered down", err);
    } else {
        error!("Panel link failed ({}), controller powered down", err);
    }
}
