//! Panel UART on the RP2040
//!
//! The link runs on UART0 in buffered (interrupt driven) mode. Both halves
//! are non-blocking from the driver's point of view: reads are only issued
//! once the RX ring reports data, and a frame always fits the TX ring.

use embassy_rp::uart::{self, BufferedUart, BufferedUartRx, BufferedUartTx};
use kpanel_hal::uart::{DataBits, IoRx, IoTx, Parity, StopBits, UartConfig};

/// GPIO carrying host → panel data
pub const PANEL_TX_GPIO: u8 = 0;

/// GPIO carrying panel → host data
pub const PANEL_RX_GPIO: u8 = 1;

/// Smallest TX ring that holds a whole stripe frame
pub const MIN_TX_BUFFER: usize = 256;

/// Read half of the panel UART
pub type PanelRx = IoRx<BufferedUartRx>;

/// Write half of the panel UART
pub type PanelTx = IoTx<BufferedUartTx>;

/// Translate the panel framing into an `embassy-rp` UART config
pub fn uart_config(config: &UartConfig) -> uart::Config {
    let mut rp = uart::Config::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    rp.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    rp.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    rp
}

/// Split a buffered UART into the halves the link driver consumes
pub fn split_panel_uart(uart: BufferedUart) -> (PanelTx, PanelRx) {
    let (tx, rx) = uart.split();
    (IoTx::new(tx), IoRx::new(rx))
}
