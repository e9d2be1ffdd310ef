//! kpanel - standalone keypad/LCD panel firmware
//!
//! Drives a printer's front-panel controller from an RP2040: resets the
//! chip, replays its init table, blinks the "In Use" LED, mirrors key
//! presses onto the LCD and logs link health.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use kpanel_core::{Link, Receiver};
use kpanel_hal_rp2040::uart::MIN_TX_BUFFER;
use kpanel_hal_rp2040::{enable_pin, split_panel_uart, uart_config};

use crate::channels::PanelLink;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; MIN_TX_BUFFER]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

static LINK: StaticCell<PanelLink> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("kpanel firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();
    info!(
        "Link: {} baud, ack timeout {} ms, {} retries, idle code {=u8:02x}",
        config.uart.baudrate,
        config.link.ack_timeout.as_millis(),
        config.link.retry_limit,
        config.link.idle_code
    );

    // Hold the controller off before the UART starts listening
    let enable = enable_pin(p.PIN_2);

    let tx_buf = TX_BUF.init([0u8; MIN_TX_BUFFER]);
    let rx_buf = RX_BUF.init([0u8; 64]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config(&config.uart));
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = split_panel_uart(uart);

    info!("UART initialized for panel link");

    let link: &'static PanelLink = LINK.init(Link::new(tx, config.link));
    let receiver = Receiver::new(link, rx);

    // Spawn tasks
    spawner.spawn(tasks::receiver_task(receiver)).unwrap();
    spawner.spawn(tasks::session_task(link, enable)).unwrap();
    spawner
        .spawn(tasks::blinker_task(link, config.blink_interval))
        .unwrap();
    spawner
        .spawn(tasks::display_task(link, config.refresh_interval))
        .unwrap();
    spawner.spawn(tasks::keys_task(link)).unwrap();
    spawner
        .spawn(tasks::stats_task(link, config.stats_interval))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // Everything else happens in the spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
