//! kpanel Hardware Abstraction Layer
//!
//! This crate defines the two hardware seams the panel driver consumes:
//! a duplex byte stream to the panel controller and the controller's
//! enable line. Chip-specific crates (RP2040, ...) wire real peripherals
//! into these traits; host tests wire in scripted mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  kpanel-core (transmitter / receiver)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  kpanel-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  kpanel-hal-  │       │  host mocks   │
//! │    rp2040     │       │  (tests)      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - the two directions of the panel link
//! - [`gpio::OutputPin`] - the controller enable line
//!
//! Adapters in [`uart::IoTx`], [`uart::IoRx`] and [`gpio::HalOutput`] lift any
//! `embedded-io` / `embedded-hal` implementation into these traits.

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use uart::{UartConfig, UartRx, UartTx};
