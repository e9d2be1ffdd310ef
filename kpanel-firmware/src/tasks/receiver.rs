//! Panel UART receive task

use defmt::*;

use crate::channels::PanelReceiver;

/// Reads every byte the panel sends until the session shuts down
#[embassy_executor::task]
pub async fn receiver_task(mut receiver: PanelReceiver) {
    receiver.run().await;
    warn!("Receiver task exited");
}
