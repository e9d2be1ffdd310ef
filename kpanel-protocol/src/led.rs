//! LED state frame
//!
//! The panel's indicator LEDs are driven by a single 2-byte command whose
//! second byte carries one bit per LED. `InUse` is active low (a cleared
//! bit lights it). `WiFi` sits on a bit that is already clear in the
//! all-dark frame, so it is driven active high.

use crate::commands::LED_FRAME_DEFAULT;
use crate::frame::COMMAND_LEN;

/// Known LED positions within the LED-state frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedFlag {
    /// "In Use/Memory" LED (`0E F9` lit, `0E FD` dark)
    InUse,
    /// "Wi-Fi" LED; bit position and polarity not yet confirmed on hardware
    WiFi,
}

impl LedFlag {
    /// Byte index within the frame
    pub const fn byte(self) -> usize {
        1
    }

    /// Bit mask within that byte
    pub const fn mask(self) -> u8 {
        match self {
            LedFlag::InUse => 0x04,
            LedFlag::WiFi => 0x02,
        }
    }

    /// Whether a cleared bit lights this LED
    pub const fn active_low(self) -> bool {
        match self {
            LedFlag::InUse => true,
            LedFlag::WiFi => false,
        }
    }
}

/// Set (`true`) or clear (`false`) the bits of `flag_mask` in byte `index`,
/// leaving every other bit untouched
pub fn toggle_led_flag(
    flags: [u8; COMMAND_LEN],
    index: usize,
    flag_mask: u8,
    new_state: bool,
) -> [u8; COMMAND_LEN] {
    let mut out = flags;
    if let Some(byte) = out.get_mut(index) {
        if new_state {
            *byte |= flag_mask;
        } else {
            *byte &= !flag_mask;
        }
    }
    out
}

/// Current LED-state frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedFrame {
    bytes: [u8; COMMAND_LEN],
}

impl Default for LedFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl LedFrame {
    /// All LEDs dark
    pub const fn new() -> Self {
        Self {
            bytes: LED_FRAME_DEFAULT,
        }
    }

    /// Light or darken one LED
    pub fn set(&mut self, flag: LedFlag, lit: bool) {
        let bit_set = lit != flag.active_low();
        self.bytes = toggle_led_flag(self.bytes, flag.byte(), flag.mask(), bit_set);
    }

    /// Whether an LED is currently lit
    pub fn is_lit(&self, flag: LedFlag) -> bool {
        let bit_set = self.bytes[flag.byte()] & flag.mask() != 0;
        bit_set != flag.active_low()
    }

    /// The frame to transmit
    pub fn bytes(&self) -> [u8; COMMAND_LEN] {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_is_dark() {
        let frame = LedFrame::new();
        assert_eq!(frame.bytes(), [0x0E, 0xFD]);
        assert!(!frame.is_lit(LedFlag::InUse));
        assert!(!frame.is_lit(LedFlag::WiFi));
    }

    #[test]
    fn test_darkening_any_flag_keeps_default_frame() {
        for flag in [LedFlag::InUse, LedFlag::WiFi] {
            let mut frame = LedFrame::new();
            frame.set(flag, false);
            assert_eq!(frame.bytes(), [0x0E, 0xFD], "{:?}", flag);
        }
    }

    #[test]
    fn test_wifi_lights_by_setting_its_bit() {
        let mut frame = LedFrame::new();
        frame.set(LedFlag::WiFi, true);
        assert_eq!(frame.bytes(), [0x0E, 0xFF]);
        assert!(frame.is_lit(LedFlag::WiFi));
        assert!(!frame.is_lit(LedFlag::InUse));
    }

    #[test]
    fn test_in_use_matches_captured_frames() {
        let mut frame = LedFrame::new();
        frame.set(LedFlag::InUse, true);
        assert_eq!(frame.bytes(), [0x0E, 0xF9]);
        assert!(frame.is_lit(LedFlag::InUse));

        frame.set(LedFlag::InUse, false);
        assert_eq!(frame.bytes(), [0x0E, 0xFD]);
    }

    #[test]
    fn test_flags_are_independent() {
        let mut frame = LedFrame::new();
        frame.set(LedFlag::WiFi, true);
        frame.set(LedFlag::InUse, true);
        frame.set(LedFlag::WiFi, false);
        assert!(frame.is_lit(LedFlag::InUse));
        assert!(!frame.is_lit(LedFlag::WiFi));
        assert_eq!(frame.bytes()[0], 0x0E);
    }

    #[test]
    fn test_toggle_out_of_range_index_is_noop() {
        assert_eq!(toggle_led_flag([1, 2], 5, 0xFF, true), [1, 2]);
    }

    proptest! {
        #[test]
        fn prop_toggle_is_idempotent(a: u8, b: u8, index in 0usize..2, mask: u8, state: bool) {
            let once = toggle_led_flag([a, b], index, mask, state);
            let twice = toggle_led_flag(once, index, mask, state);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_toggle_touches_only_masked_bits(a: u8, b: u8, index in 0usize..2, mask: u8, state: bool) {
            let before = [a, b];
            let after = toggle_led_flag(before, index, mask, state);
            prop_assert_eq!(before[1 - index], after[1 - index]);
            prop_assert_eq!(before[index] & !mask, after[index] & !mask);
        }
    }
}
