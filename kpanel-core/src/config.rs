//! Link and panel configuration
//!
//! Two layers:
//! - [`LinkConfig`] holds the protocol timing the driver itself needs.
//! - [`PanelConfig`] adds UART framing and the application cadences.
//!
//! Firmware embeds a small TOML file and parses it at boot with
//! [`parse_config`]. Only the subset below is understood:
//!
//! ```toml
//! [uart]
//! baudrate = 250_000
//! stop_bits = 1
//! parity = "even"
//!
//! [link]
//! ack_timeout_ms = 20
//! retry_limit = 16
//! idle_code = 0x80
//! reset_hold_ms = 500
//!
//! [app]
//! blink_interval_ms = 1000
//! refresh_interval_ms = 500
//! stats_interval_ms = 10_000
//! ```
//!
//! NOT supported: arrays, inline tables, multi-line strings, dotted keys.

use embassy_time::Duration;
use kpanel_hal::uart::{Parity, StopBits, UartConfig};
use kpanel_protocol::commands::{ACK, DEFAULT_IDLE_CODE, STATUS_IGNORED};

/// Shortest enable-line hold that reliably resets the controller
pub const MIN_RESET_HOLD_MS: u64 = 250;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Section header is malformed or unknown
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Value could not be parsed as the expected type
    InvalidValue,
    /// Value parsed but lies outside the accepted range
    OutOfRange,
}

/// Protocol timing for one link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// How long one attempt waits for its ACK
    pub ack_timeout: Duration,
    /// Retries after the first attempt before giving up
    pub retry_limit: u16,
    /// Scan code reported while no key is held
    pub idle_code: u8,
    /// How long the enable line is held low during reset
    pub reset_hold: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            ack_timeout: Duration::from_millis(20),
            retry_limit: 16,
            idle_code: DEFAULT_IDLE_CODE,
            reset_hold: Duration::from_millis(500),
        }
    }
}

impl LinkConfig {
    /// Check the invariants the driver relies on
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.ack_timeout.as_millis() == 0 {
            return Err(ParseError::OutOfRange);
        }
        if self.reset_hold.as_millis() < MIN_RESET_HOLD_MS {
            return Err(ParseError::OutOfRange);
        }
        if self.idle_code == ACK || self.idle_code == STATUS_IGNORED {
            return Err(ParseError::OutOfRange);
        }
        Ok(())
    }

    /// Writes attempted per frame before `NoResponse`
    pub fn max_attempts(&self) -> u16 {
        self.retry_limit.saturating_add(1)
    }
}

/// Complete panel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelConfig {
    /// UART framing
    pub uart: UartConfig,
    /// Link timing
    pub link: LinkConfig,
    /// LED blinker period (one toggle per interval)
    pub blink_interval: Duration,
    /// Display refresh cadence when nothing changed
    pub refresh_interval: Duration,
    /// Diagnostics logging period
    pub stats_interval: Duration,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            uart: UartConfig::default(),
            link: LinkConfig::default(),
            blink_interval: Duration::from_millis(1000),
            refresh_interval: Duration::from_millis(500),
            stats_interval: Duration::from_secs(10),
        }
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Uart,
    Link,
    App,
}

/// Parse a TOML document into a [`PanelConfig`]
///
/// Keys that are absent keep their default. The result is validated
/// before it is returned.
pub fn parse_config(input: &str) -> Result<PanelConfig, ParseError> {
    let mut config = PanelConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section_header(line)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        apply_value(&mut config, section, key, value)?;
    }

    config.link.validate()?;
    if config.uart.baudrate == 0 {
        return Err(ParseError::OutOfRange);
    }
    Ok(config)
}

fn parse_section_header(line: &str) -> Result<Section, ParseError> {
    let name = line
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or(ParseError::InvalidSection)?;

    match name.trim() {
        "uart" => Ok(Section::Uart),
        "link" => Ok(Section::Link),
        "app" => Ok(Section::App),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_value(
    config: &mut PanelConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Uart, "baudrate") => config.uart.baudrate = parse_int(value)?,
        (Section::Uart, "stop_bits") => {
            let count: u8 = parse_int(value)?;
            config.uart.stop_bits = StopBits::from_count(count).ok_or(ParseError::OutOfRange)?;
        }
        (Section::Uart, "parity") => config.uart.parity = parse_parity(value)?,

        (Section::Link, "ack_timeout_ms") => {
            config.link.ack_timeout = Duration::from_millis(parse_int(value)?)
        }
        (Section::Link, "retry_limit") => config.link.retry_limit = parse_int(value)?,
        (Section::Link, "idle_code") => config.link.idle_code = parse_int(value)?,
        (Section::Link, "reset_hold_ms") => {
            config.link.reset_hold = Duration::from_millis(parse_int(value)?)
        }

        (Section::App, "blink_interval_ms") => {
            config.blink_interval = Duration::from_millis(parse_nonzero_ms(value)?)
        }
        (Section::App, "refresh_interval_ms") => {
            config.refresh_interval = Duration::from_millis(parse_nonzero_ms(value)?)
        }
        (Section::App, "stats_interval_ms") => {
            config.stats_interval = Duration::from_millis(parse_nonzero_ms(value)?)
        }

        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Drop a trailing `# comment`, ignoring `#` inside a quoted string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Parse a decimal or `0x` hex integer, allowing `_` separators
fn parse_int<T: TryFrom<u64>>(value: &str) -> Result<T, ParseError> {
    let (digits, radix) = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (value, 10),
    };

    let mut result: u64 = 0;
    let mut seen_digit = false;
    for c in digits.chars() {
        if c == '_' {
            continue;
        }
        let digit = c.to_digit(radix).ok_or(ParseError::InvalidValue)?;
        result = result
            .checked_mul(u64::from(radix))
            .and_then(|r| r.checked_add(u64::from(digit)))
            .ok_or(ParseError::OutOfRange)?;
        seen_digit = true;
    }

    if !seen_digit {
        return Err(ParseError::InvalidValue);
    }
    T::try_from(result).map_err(|_| ParseError::OutOfRange)
}

fn parse_nonzero_ms(value: &str) -> Result<u64, ParseError> {
    match parse_int(value)? {
        0 => Err(ParseError::OutOfRange),
        ms => Ok(ms),
    }
}

fn parse_string(value: &str) -> Result<&str, ParseError> {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or(ParseError::InvalidValue)
}

fn parse_parity(value: &str) -> Result<Parity, ParseError> {
    match parse_string(value)? {
        "none" => Ok(Parity::None),
        "even" => Ok(Parity::Even),
        "odd" => Ok(Parity::Odd),
        _ => Err(ParseError::InvalidValue),
    }
}
