//! RP2040 bindings for the panel link
//!
//! Wires `embassy-rp` peripherals into the `kpanel-hal` traits:
//!
//! - buffered UART halves as [`kpanel_hal::UartTx`] / [`kpanel_hal::UartRx`]
//! - a push-pull GPIO as the controller's enable line
//!
//! Default wiring (KB2040 and other RP2040 boards):
//!
//! | Signal | GPIO |
//! |--------|------|
//! | TX     | 0    |
//! | RX     | 1    |
//! | Enable | 2    |

#![no_std]

pub mod gpio;
pub mod uart;

pub use gpio::{enable_pin, EnablePin, PANEL_ENABLE_GPIO};
pub use uart::{split_panel_uart, uart_config, PanelRx, PanelTx, PANEL_RX_GPIO, PANEL_TX_GPIO};
