//! Key events
//!
//! The controller reports only "which key is down right now". Events are
//! derived by the receiver from changes in that report.

use embassy_time::Instant;

/// Depth of the key-event queue
pub const KEY_QUEUE_DEPTH: usize = 64;

/// A key going down or up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    /// Raw scan code as reported by the controller
    pub scan_code: u8,
    /// `true` for press, `false` for release
    pub pressed: bool,
    /// When the receiver saw the report change
    pub timestamp: Instant,
}

impl KeyEvent {
    /// Key went down
    pub fn press(scan_code: u8, timestamp: Instant) -> Self {
        Self {
            scan_code,
            pressed: true,
            timestamp,
        }
    }

    /// Key came up
    pub fn release(scan_code: u8, timestamp: Instant) -> Self {
        Self {
            scan_code,
            pressed: false,
            timestamp,
        }
    }

    /// Returns true for a release event
    pub fn is_release(&self) -> bool {
        !self.pressed
    }
}
