//! GPIO pin abstractions
//!
//! The only pin the driver touches is the panel controller's enable line:
//! low holds the chip in reset, high lets it run.

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Adapts an `embedded-hal` output pin into [`OutputPin`]
///
/// `embedded-hal` pins are fallible; the enable line is a plain push-pull
/// GPIO on every supported board, so errors are dropped and the last
/// requested level is remembered locally.
pub struct HalOutput<P> {
    pin: P,
    high: bool,
}

impl<P> HalOutput<P>
where
    P: embedded_hal::digital::OutputPin,
{
    /// Wrap a pin, driving it to the given initial level
    pub fn new(mut pin: P, high: bool) -> Self {
        let _ = pin.set_state(high.into());
        Self { pin, high }
    }
}

impl<P> OutputPin for HalOutput<P>
where
    P: embedded_hal::digital::OutputPin,
{
    fn set_high(&mut self) {
        let _ = self.pin.set_high();
        self.high = true;
    }

    fn set_low(&mut self) {
        let _ = self.pin.set_low();
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakePin {
        level: bool,
        writes: u8,
    }

    impl embedded_hal::digital::ErrorType for FakePin {
        type Error = core::convert::Infallible;
    }

    impl embedded_hal::digital::OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.level = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.level = true;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_hal_output_tracks_level() {
        let mut pin = HalOutput::new(FakePin::default(), false);
        assert!(pin.is_set_low());

        pin.set_high();
        assert!(pin.is_set_high());
        assert!(pin.pin.level);

        pin.set_state(false);
        assert!(pin.is_set_low());
        assert!(!pin.pin.level);
        assert_eq!(pin.pin.writes, 3);
    }
}
