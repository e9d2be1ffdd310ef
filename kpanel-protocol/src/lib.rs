//! Panel controller link protocol
//!
//! This crate holds everything about the panel controller's wire format
//! that can be expressed without I/O: the fixed command tables, the frame
//! shapes, the display's stripe encoding and the classification of bytes
//! the controller sends back.
//!
//! # Protocol Overview
//!
//! The host sends fixed-shape frames; the controller acknowledges each one
//! with a single byte and otherwise streams its key matrix state:
//! ```text
//! host → panel   ┌────────┐            ┌──────────────────────┐
//!                │ 2 byte │  command   │ 196 byte stripe      │  display
//!                └────────┘            └──────────────────────┘
//! panel → host   0x20 = ACK, 0x40 = status (ignored), else key scan code
//! ```
//!
//! None of the command bytes are documented. They were captured from a
//! running printer and are replayed verbatim; see [`commands`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bitrev;
pub mod commands;
pub mod frame;
pub mod led;
pub mod report;
pub mod stripe;

pub use bitrev::bit_reverse;
pub use commands::{InitStep, INIT_SEQUENCE, STRIPE_HEADERS};
pub use frame::{Frame, FrameError, COMMAND_LEN, STRIPE_LEN};
pub use led::{toggle_led_flag, LedFlag, LedFrame};
pub use report::{classify_received_byte, key_transition, KeyTransition, RxClass};
pub use stripe::{encode_stripe, FrameBuffer, LsbFrameBuffer, StripeSource, STRIPE_COUNT};
