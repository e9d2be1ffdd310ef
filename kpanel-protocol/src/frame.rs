//! Command frames
//!
//! The controller accepts exactly two frame shapes:
//! - 2 bytes: a control command (init table, LED state, stripe header)
//! - 196 bytes: one stripe of display pixels
//!
//! There is no start byte, length or checksum; the length alone tells the
//! controller what it is looking at.

/// Length of a control command frame
pub const COMMAND_LEN: usize = 2;

/// Length of a display stripe frame (one byte per pixel column)
pub const STRIPE_LEN: usize = 196;

/// Errors building a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload is neither 2 nor 196 bytes long
    InvalidLength,
    /// Stripe index outside 0..5
    StripeOutOfRange,
}

/// An outbound frame, borrowed or inline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    /// 2-byte control command
    Command([u8; COMMAND_LEN]),
    /// 196-byte pixel stripe
    Stripe(&'a [u8; STRIPE_LEN]),
}

impl<'a> Frame<'a> {
    /// Build a frame from raw bytes, rejecting any other length
    pub fn from_slice(bytes: &'a [u8]) -> Result<Self, FrameError> {
        match bytes.len() {
            COMMAND_LEN => Ok(Frame::Command([bytes[0], bytes[1]])),
            STRIPE_LEN => bytes
                .try_into()
                .map(Frame::Stripe)
                .map_err(|_| FrameError::InvalidLength),
            _ => Err(FrameError::InvalidLength),
        }
    }

    /// Bytes to put on the wire
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Frame::Command(bytes) => bytes,
            Frame::Stripe(bytes) => &bytes[..],
        }
    }

    /// Wire length (2 or 196)
    pub fn len(&self) -> usize {
        match self {
            Frame::Command(_) => COMMAND_LEN,
            Frame::Stripe(_) => STRIPE_LEN,
        }
    }

    /// Frames are never empty; provided for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        false
    }

    /// True for 2-byte control commands
    pub fn is_command(&self) -> bool {
        matches!(self, Frame::Command(_))
    }
}

impl From<[u8; COMMAND_LEN]> for Frame<'_> {
    fn from(bytes: [u8; COMMAND_LEN]) -> Self {
        Frame::Command(bytes)
    }
}

impl<'a> From<&'a [u8; STRIPE_LEN]> for Frame<'a> {
    fn from(bytes: &'a [u8; STRIPE_LEN]) -> Self {
        Frame::Stripe(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_frame() {
        let frame = Frame::from_slice(&[0x0E, 0xFD]).unwrap();
        assert!(frame.is_command());
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.as_bytes(), &[0x0E, 0xFD]);
    }

    #[test]
    fn test_stripe_frame() {
        let pixels = [0xA5u8; STRIPE_LEN];
        let frame = Frame::from_slice(&pixels).unwrap();
        assert!(!frame.is_command());
        assert_eq!(frame.len(), STRIPE_LEN);
        assert_eq!(frame.as_bytes(), &pixels[..]);
    }

    #[test]
    fn test_other_lengths_rejected() {
        for len in [0usize, 1, 3, 195, 197, 255] {
            let bytes = [0u8; 256];
            assert_eq!(
                Frame::from_slice(&bytes[..len]),
                Err(FrameError::InvalidLength),
                "length {}",
                len
            );
        }
    }
}
