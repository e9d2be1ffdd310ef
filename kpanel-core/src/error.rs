//! Link error taxonomy
//!
//! A single missed ACK is transient and never leaves the transmitter.
//! Everything that does leave it is fatal for the producer that hit it.

use kpanel_protocol::FrameError;

/// Errors surfaced by the link driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Retry budget exhausted without an ACK; the panel is unreachable
    NoResponse {
        /// Writes attempted for the failing frame
        attempts: u16,
    },
    /// Transport accepted fewer bytes than the frame holds
    ShortWrite { expected: usize, written: usize },
    /// The UART driver itself reported an error on write
    Transport,
    /// Frame could not be built (bad length or stripe index)
    Frame(FrameError),
    /// The session was shut down while the frame was pending
    Shutdown,
}

impl LinkError {
    /// Whether this error means the physical link is gone
    pub fn is_link_lost(&self) -> bool {
        matches!(self, LinkError::NoResponse { .. })
    }

    /// Whether this error indicates a transport/driver defect
    pub fn is_transport_defect(&self) -> bool {
        matches!(self, LinkError::ShortWrite { .. } | LinkError::Transport)
    }
}

impl From<FrameError> for LinkError {
    fn from(e: FrameError) -> Self {
        LinkError::Frame(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(LinkError::NoResponse { attempts: 17 }.is_link_lost());
        assert!(!LinkError::Transport.is_link_lost());

        assert!(LinkError::Transport.is_transport_defect());
        assert!(LinkError::ShortWrite {
            expected: 2,
            written: 1
        }
        .is_transport_defect());
        assert!(!LinkError::Shutdown.is_transport_defect());
    }

    #[test]
    fn test_frame_error_converts() {
        let e: LinkError = FrameError::InvalidLength.into();
        assert_eq!(e, LinkError::Frame(FrameError::InvalidLength));
    }
}
