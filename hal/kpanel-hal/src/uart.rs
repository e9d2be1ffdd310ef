//! UART serial communication abstractions
//!
//! The panel link is full-duplex capable but used half-duplex in practice.
//! The two directions are split into separate traits so the receive path and
//! the transmit path can be owned by different tasks without a shared lock.

/// UART transmitter
///
/// Writes never block the scheduler for longer than it takes to copy the
/// buffer into the peripheral's FIFO/ring buffer.
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Returns the number of bytes actually accepted. The panel driver
    /// treats anything other than `data.len()` as a transport defect.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;
}

/// UART receiver
///
/// Both methods must return without waiting on the line; callers poll
/// `bytes_available` and yield to the executor while it reports zero.
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Number of bytes that can be read without blocking
    ///
    /// Implementations that can only tell "some" from "none" report 1.
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Read a single byte
    ///
    /// Only called after `bytes_available` reported at least one byte.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    /// Framing observed on the panel link: 250000 baud, 8E1
    fn default() -> Self {
        Self {
            baudrate: 250_000,
            data_bits: DataBits::Eight,
            parity: Parity::Even,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

impl StopBits {
    /// Parse a stop bit count (1 or 2)
    pub fn from_count(count: u8) -> Option<Self> {
        match count {
            1 => Some(StopBits::One),
            2 => Some(StopBits::Two),
            _ => None,
        }
    }
}

/// Error from the `embedded-io` adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError<E> {
    /// Underlying driver error
    Io(E),
    /// Reader reported end of stream
    Eof,
}

/// Adapts an `embedded-io` reader with readiness reporting into [`UartRx`]
pub struct IoRx<R> {
    inner: R,
}

impl<R> IoRx<R> {
    /// Wrap a reader
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R> UartRx for IoRx<R>
where
    R: embedded_io::Read + embedded_io::ReadReady,
{
    type Error = IoError<R::Error>;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        let ready = self.inner.read_ready().map_err(IoError::Io)?;
        Ok(usize::from(ready))
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        match self.inner.read(&mut buf).map_err(IoError::Io)? {
            0 => Err(IoError::Eof),
            _ => Ok(buf[0]),
        }
    }
}

/// Adapts an `embedded-io` writer into [`UartTx`]
pub struct IoTx<W> {
    inner: W,
}

impl<W> IoTx<W> {
    /// Wrap a writer
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W> UartTx for IoTx<W>
where
    W: embedded_io::Write,
{
    type Error = W::Error;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        // A single write call so a partial transfer is reported, not hidden
        self.inner.write(data)
    }
}
