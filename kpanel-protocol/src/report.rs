//! Classification of bytes received from the panel controller
//!
//! The controller never frames what it sends. Every byte is one of:
//! - `0x20` ACK for the last frame written
//! - `0x40` a status byte nobody has decoded, dropped on the floor
//! - a key scan code, repeated continuously whether or not it changed

use crate::commands::{ACK, STATUS_IGNORED};

/// What a received byte means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxClass {
    /// Frame acknowledged
    Ack,
    /// Status byte with no known meaning
    IgnoredStatus,
    /// Scan code identical to the previous report
    Unchanged,
    /// Scan code differing from the previous report
    KeyReport(u8),
}

/// Classify one received byte against the previous key report
pub fn classify_received_byte(byte: u8, previous_report: u8) -> RxClass {
    match byte {
        ACK => RxClass::Ack,
        STATUS_IGNORED => RxClass::IgnoredStatus,
        b if b == previous_report => RxClass::Unchanged,
        b => RxClass::KeyReport(b),
    }
}

/// Key events implied by a change of scan code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyTransition {
    /// Code released first, if the previous report was a key
    pub release: Option<u8>,
    /// Code pressed second, if the new report is a key
    pub press: Option<u8>,
}

/// Translate a scan code change into release-then-press, omitting idle legs
pub fn key_transition(previous: u8, current: u8, idle_code: u8) -> KeyTransition {
    if previous == current {
        return KeyTransition {
            release: None,
            press: None,
        };
    }

    KeyTransition {
        release: (previous != idle_code).then_some(previous),
        press: (current != idle_code).then_some(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const IDLE: u8 = 0x80;

    #[test]
    fn test_ack_and_status() {
        assert_eq!(classify_received_byte(0x20, IDLE), RxClass::Ack);
        assert_eq!(classify_received_byte(0x40, IDLE), RxClass::IgnoredStatus);
    }

    #[test]
    fn test_ack_wins_even_if_equal_to_previous() {
        assert_eq!(classify_received_byte(0x20, 0x20), RxClass::Ack);
        assert_eq!(classify_received_byte(0x40, 0x40), RxClass::IgnoredStatus);
    }

    #[test]
    fn test_repeated_report_is_unchanged() {
        assert_eq!(classify_received_byte(IDLE, IDLE), RxClass::Unchanged);
        assert_eq!(classify_received_byte(0x13, 0x13), RxClass::Unchanged);
    }

    #[test]
    fn test_new_report() {
        assert_eq!(classify_received_byte(0x13, IDLE), RxClass::KeyReport(0x13));
        assert_eq!(classify_received_byte(IDLE, 0x13), RxClass::KeyReport(IDLE));
    }

    #[test]
    fn test_transition_idle_to_key() {
        let t = key_transition(IDLE, 0x13, IDLE);
        assert_eq!(t.release, None);
        assert_eq!(t.press, Some(0x13));
    }

    #[test]
    fn test_transition_key_to_idle() {
        let t = key_transition(0x13, IDLE, IDLE);
        assert_eq!(t.release, Some(0x13));
        assert_eq!(t.press, None);
    }

    #[test]
    fn test_transition_key_to_key() {
        let t = key_transition(0x13, 0x21, IDLE);
        assert_eq!(t.release, Some(0x13));
        assert_eq!(t.press, Some(0x21));
    }

    #[test]
    fn test_transition_with_zero_idle_code() {
        let t = key_transition(0x00, 0x80, 0x00);
        assert_eq!(t.release, None);
        assert_eq!(t.press, Some(0x80));
    }

    proptest! {
        #[test]
        fn prop_transition_never_mentions_idle(prev: u8, curr: u8, idle: u8) {
            let t = key_transition(prev, curr, idle);
            prop_assert_ne!(t.release, Some(idle));
            prop_assert_ne!(t.press, Some(idle));
        }

        #[test]
        fn prop_changed_report_always_carries_byte(byte: u8, prev: u8) {
            prop_assume!(byte != ACK && byte != STATUS_IGNORED && byte != prev);
            prop_assert_eq!(classify_received_byte(byte, prev), RxClass::KeyReport(byte));
        }
    }
}
