//! Periodic producers
//!
//! Everything that writes to the panel once the session is `Ready`. Each
//! producer waits for the init-complete latch, then shares the wire with
//! the others through the link's transmit lock, one frame (or one stripe)
//! at a time.
//!
//! A producer only returns when its link fails; the error it returns is
//! the one that stopped it.

use embassy_futures::select::select;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker, Timer};

use kpanel_hal::uart::UartTx;
use kpanel_protocol::{LedFlag, StripeSource, STRIPE_COUNT, STRIPE_LEN};

use crate::error::LinkError;
use crate::link::Link;

/// Toggle one LED every `interval`
pub async fn run_blinker<M: RawMutex, T: UartTx, const Q: usize>(
    link: &Link<M, T, Q>,
    flag: LedFlag,
    interval: Duration,
) -> LinkError {
    link.wait_initialized().await;
    debug!("Blinker started");

    let mut ticker = Ticker::every(interval);
    let mut lit = false;

    loop {
        lit = !lit;
        if let Err(e) = link.set_led(flag, lit).await {
            warn!("Blinker stopped: {}", e);
            return e;
        }
        ticker.next().await;
    }
}

/// Send the frame buffer whenever `changed` fires, and at least every
/// `interval` otherwise
///
/// The buffer lock is held only while the stripes are encoded, so the
/// application can keep drawing while they are on the wire.
pub async fn run_display_refresh<M, T, S, const Q: usize>(
    link: &Link<M, T, Q>,
    frame: &Mutex<M, S>,
    changed: &Signal<M, ()>,
    interval: Duration,
) -> LinkError
where
    M: RawMutex,
    T: UartTx,
    S: StripeSource,
{
    link.wait_initialized().await;
    debug!("Display refresher started");

    loop {
        if let Err(e) = refresh_once(link, frame).await {
            warn!("Display refresher stopped: {}", e);
            return e;
        }
        select(changed.wait(), Timer::after(interval)).await;
    }
}

async fn refresh_once<M, T, S, const Q: usize>(
    link: &Link<M, T, Q>,
    frame: &Mutex<M, S>,
) -> Result<(), LinkError>
where
    M: RawMutex,
    T: UartTx,
    S: StripeSource,
{
    let mut stripes = [[0u8; STRIPE_LEN]; STRIPE_COUNT];
    {
        let source = frame.lock().await;
        for (index, stripe) in stripes.iter_mut().enumerate() {
            *stripe = source.stripe(index)?;
        }
    }

    for (index, stripe) in stripes.iter().enumerate() {
        link.send_stripe(index, stripe).await?;
    }
    trace!("Display refreshed");
    Ok(())
}
