//! Controller enable line

use embassy_rp::gpio::{Level, Output, Pin};
use embassy_rp::Peri;
use kpanel_hal::gpio::HalOutput;

/// GPIO driving the controller's enable input
pub const PANEL_ENABLE_GPIO: u8 = 2;

/// Enable line as seen by the session controller
pub type EnablePin = HalOutput<Output<'static>>;

/// Claim a pin as the enable line, starting low (controller held off)
pub fn enable_pin(pin: Peri<'static, impl Pin>) -> EnablePin {
    HalOutput::new(Output::new(pin, Level::Low), false)
}
