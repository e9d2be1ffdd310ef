//! Protocol constant tables
//!
//! Every value here was captured with a logic analyzer on a running
//! printer. The meaning of most bytes is unknown and the order is
//! load-bearing: do not sort, merge or "tidy" these tables.
//!
//! Reading the `0x04 xx` commands bit-reversed (see [`crate::bitrev`])
//! gives values that look like a common monochrome LCD controller command
//! set, which is a hint, not a contract.

use crate::frame::COMMAND_LEN;

/// Byte the controller sends after accepting a frame
pub const ACK: u8 = 0x20;

/// Status byte of unknown meaning; discarded
pub const STATUS_IGNORED: u8 = 0x40;

/// Scan code reported while no key is held (revision dependent, see config)
pub const DEFAULT_IDLE_CODE: u8 = 0x80;

/// Initial LED-state frame: every LED dark
pub const LED_FRAME_DEFAULT: [u8; COMMAND_LEN] = [0x0E, 0xFD];

/// One step of the power-up sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitStep {
    /// Send a 2-byte command and wait for its ACK
    Send([u8; COMMAND_LEN]),
    /// Idle the line for the given number of milliseconds
    Pause(u16),
}

/// Power-up command sequence, with the pauses the printer leaves between them
pub const INIT_SEQUENCE: &[InitStep] = &[
    InitStep::Pause(24),
    InitStep::Send([0xFE, 0xDC]),
    InitStep::Send([0x0E, 0xFD]),
    InitStep::Send([0x0D, 0x3F]),
    InitStep::Send([0x0C, 0xE1]),
    InitStep::Send([0x07, 0xA1]),
    InitStep::Send([0x03, 0x00]),
    InitStep::Send([0x01, 0x00]),
    InitStep::Send([0x0E, 0xFC]),
    InitStep::Send([0x04, 0xD5]),
    InitStep::Send([0x04, 0x85]),
    InitStep::Send([0x04, 0x03]),
    InitStep::Send([0x04, 0xC5]),
    InitStep::Send([0x04, 0x34]),
    // Key report shrinks from "80 40" to "80" around here
    InitStep::Pause(17),
    InitStep::Send([0x04, 0x74]),
    InitStep::Pause(20),
    InitStep::Send([0x04, 0xF4]),
    InitStep::Send([0x04, 0x44]),
    InitStep::Send([0x04, 0x81]),
    InitStep::Send([0x04, 0x04]),
    InitStep::Pause(100),
];

/// Number of stripes the display is split into
pub const STRIPE_COUNT: usize = 5;

/// Header frame sent before each stripe's pixel payload, indexed by stripe
pub const STRIPE_HEADERS: [[u8; COMMAND_LEN]; STRIPE_COUNT] = [
    [0x04, 0x4D],
    [0x04, 0xCD],
    [0x04, 0x2D],
    [0x04, 0xAD],
    [0x04, 0x6D],
];

/// Iterate over the command frames of the init sequence, skipping pauses
pub fn init_commands() -> impl Iterator<Item = [u8; COMMAND_LEN]> {
    INIT_SEQUENCE.iter().filter_map(|step| match step {
        InitStep::Send(bytes) => Some(*bytes),
        InitStep::Pause(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitrev::bit_reverse;

    #[test]
    fn test_init_sequence_size() {
        let count = init_commands().count();
        assert_eq!(count, 18);
        assert!((14..=22).contains(&count));
    }

    #[test]
    fn test_init_sequence_order_is_preserved() {
        let commands: Vec<_> = init_commands().collect();
        assert_eq!(commands[0], [0xFE, 0xDC]);
        assert_eq!(commands[1], LED_FRAME_DEFAULT);
        assert_eq!(commands[12], [0x04, 0x34]);
        assert_eq!(commands[13], [0x04, 0x74]);
        assert_eq!(commands[17], [0x04, 0x04]);
    }

    #[test]
    fn test_init_sequence_starts_and_ends_with_pause() {
        assert_eq!(INIT_SEQUENCE.first(), Some(&InitStep::Pause(24)));
        assert_eq!(INIT_SEQUENCE.last(), Some(&InitStep::Pause(100)));
    }

    #[test]
    fn test_stripe_headers_address_consecutive_pages() {
        for (i, header) in STRIPE_HEADERS.iter().enumerate() {
            assert_eq!(header[0], 0x04);
            assert_eq!(bit_reverse(header[1]), 0xB2 + i as u8);
        }
    }

    #[test]
    fn test_reserved_bytes_are_distinct() {
        assert_ne!(ACK, STATUS_IGNORED);
        assert_ne!(ACK, DEFAULT_IDLE_CODE);
        assert_ne!(STATUS_IGNORED, DEFAULT_IDLE_CODE);
    }
}
