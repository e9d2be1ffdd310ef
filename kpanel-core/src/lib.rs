//! Board-agnostic link driver for the panel controller
//!
//! This crate contains everything that talks to the controller but does
//! not depend on a specific MCU:
//!
//! - [`link::Link`]: transmitter, ACK accounting, key-event queue
//! - [`receiver::Receiver`]: the single reader of the UART
//! - [`session::Session`]: reset, first-byte wait, init table, shutdown
//! - [`producers`]: LED blinker and display refresher
//! - [`config`]: link timing and panel configuration
//!
//! All shared state is generic over an `embassy-sync` raw mutex, so the
//! same code runs under `CriticalSectionRawMutex` on target and
//! `NoopRawMutex` in host tests.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod event;
pub mod latch;
pub mod link;
pub mod producers;
pub mod receiver;
pub mod session;

#[cfg(test)]
mod testing;

pub use config::{LinkConfig, PanelConfig};
pub use error::LinkError;
pub use event::KeyEvent;
pub use link::{Link, LinkStats};
pub use receiver::Receiver;
pub use session::{Session, SessionState};
