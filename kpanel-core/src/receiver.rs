//! Receiver loop
//!
//! The only reader of the UART. Polls without blocking, yields to the
//! executor whenever the line is quiet, and hands every byte to
//! [`Link::process_byte`]. Runs until the link is shut down.

use embassy_futures::select::select;
use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::RawMutex;

use kpanel_hal::uart::{UartRx, UartTx};

use crate::link::Link;

/// Owns the read half of the UART for one link
pub struct Receiver<'a, M: RawMutex, T: UartTx, R: UartRx, const Q: usize> {
    link: &'a Link<M, T, Q>,
    rx: R,
}

impl<'a, M: RawMutex, T: UartTx, R: UartRx, const Q: usize> Receiver<'a, M, T, R, Q> {
    /// Pair a link with the read half of its UART
    pub fn new(link: &'a Link<M, T, Q>, rx: R) -> Self {
        Self { link, rx }
    }

    /// Consume bytes until [`Link::shutdown`] is called
    pub async fn run(&mut self) {
        info!("Receiver started");
        let link = self.link;
        select(link.wait_shutdown(), self.pump()).await;
        info!("Receiver stopped");
    }

    async fn pump(&mut self) {
        // Only the first error of a failing streak is logged
        let mut failing = false;
        loop {
            match self.rx.bytes_available() {
                Ok(0) => {}
                Ok(available) => {
                    for _ in 0..available {
                        match self.rx.read_byte() {
                            Ok(byte) => {
                                if failing {
                                    info!("UART reads recovered");
                                    failing = false;
                                }
                                self.link.process_byte(byte);
                            }
                            Err(_) => {
                                let total = self.link.record_rx_error();
                                if !failing {
                                    warn!("UART read failed ({} so far)", total);
                                    failing = true;
                                }
                                break;
                            }
                        }
                    }
                }
                Err(_) => {
                    let total = self.link.record_rx_error();
                    if !failing {
                        warn!("UART status read failed ({} so far)", total);
                        failing = true;
                    }
                }
            }
            yield_now().await;
        }
    }
}
