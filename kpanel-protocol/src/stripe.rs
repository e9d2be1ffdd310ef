//! Display frame buffers and stripe encoding
//!
//! The LCD is 196 pixels wide and 34 pixels tall. The controller takes it
//! as five horizontal stripes of 196 byte-columns, each byte covering 8
//! vertically stacked pixels (so the buffer spans 40 rows; the last 6 are
//! off-glass but still transmitted).
//!
//! Within a byte the *top* pixel is the most significant bit. Most
//! graphics code packs vertical bytes the other way round, so two buffer
//! layouts are provided:
//!
//! - [`FrameBuffer`] stores the controller's order directly; a stripe is a
//!   plain copy.
//! - [`LsbFrameBuffer`] stores the conventional order; a stripe is copied
//!   through [`bit_reverse`](crate::bitrev::bit_reverse).
//!
//! Both produce byte-identical stripes for the same drawing.

use crate::bitrev::bit_reverse_in_place;
use crate::frame::{FrameError, STRIPE_LEN};

pub use crate::commands::STRIPE_COUNT;

/// Visible width in pixels
pub const WIDTH: usize = STRIPE_LEN;

/// Visible height in pixels
pub const HEIGHT: usize = 34;

/// Rows covered by the stripes (5 x 8)
pub const BUFFER_ROWS: usize = STRIPE_COUNT * 8;

/// Size of a packed frame buffer in bytes
pub const BUFFER_LEN: usize = STRIPE_COUNT * STRIPE_LEN;

/// Bit significance of the packed buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Top pixel in bit 7 (controller native)
    MsbFirst,
    /// Top pixel in bit 0 (conventional)
    LsbFirst,
}

/// Extract stripe `stripe_index` from a packed buffer in controller order
pub fn encode_stripe(
    pixels: &[u8],
    order: BitOrder,
    stripe_index: usize,
) -> Result<[u8; STRIPE_LEN], FrameError> {
    if pixels.len() != BUFFER_LEN {
        return Err(FrameError::InvalidLength);
    }
    if stripe_index >= STRIPE_COUNT {
        return Err(FrameError::StripeOutOfRange);
    }

    let start = stripe_index * STRIPE_LEN;
    let mut stripe = [0u8; STRIPE_LEN];
    stripe.copy_from_slice(&pixels[start..start + STRIPE_LEN]);

    if order == BitOrder::LsbFirst {
        bit_reverse_in_place(&mut stripe);
    }

    Ok(stripe)
}

/// Anything that can hand the transmitter display stripes
pub trait StripeSource {
    /// Stripe `index` (0..5) in controller bit order
    fn stripe(&self, index: usize) -> Result<[u8; STRIPE_LEN], FrameError>;
}

/// Locate the byte and bit for a pixel, or `None` if off-glass
fn locate(x: usize, y: usize) -> Option<(usize, u8)> {
    if x >= WIDTH || y >= HEIGHT {
        return None;
    }
    Some(((y / 8) * STRIPE_LEN + x, (y % 8) as u8))
}

/// Frame buffer in the controller's native MSB-first order
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: [u8; BUFFER_LEN],
}

/// Frame buffer in conventional LSB-first vertical-byte order
#[derive(Clone, PartialEq, Eq)]
pub struct LsbFrameBuffer {
    pixels: [u8; BUFFER_LEN],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Blank buffer
    pub const fn new() -> Self {
        Self {
            pixels: [0; BUFFER_LEN],
        }
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Set one pixel; coordinates off-glass are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        if let Some((index, row)) = locate(x, y) {
            let mask = 0x80 >> row;
            if on {
                self.pixels[index] |= mask;
            } else {
                self.pixels[index] &= !mask;
            }
        }
    }

    /// Read one pixel; off-glass reads as off
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        locate(x, y).is_some_and(|(index, row)| self.pixels[index] & (0x80 >> row) != 0)
    }

    /// Packed bytes, MSB-first
    pub fn as_bytes(&self) -> &[u8; BUFFER_LEN] {
        &self.pixels
    }
}

impl StripeSource for FrameBuffer {
    fn stripe(&self, index: usize) -> Result<[u8; STRIPE_LEN], FrameError> {
        encode_stripe(&self.pixels, BitOrder::MsbFirst, index)
    }
}

impl Default for LsbFrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LsbFrameBuffer {
    /// Blank buffer
    pub const fn new() -> Self {
        Self {
            pixels: [0; BUFFER_LEN],
        }
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Set one pixel; coordinates off-glass are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        if let Some((index, row)) = locate(x, y) {
            let mask = 1 << row;
            if on {
                self.pixels[index] |= mask;
            } else {
                self.pixels[index] &= !mask;
            }
        }
    }

    /// Read one pixel; off-glass reads as off
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        locate(x, y).is_some_and(|(index, row)| self.pixels[index] & (1 << row) != 0)
    }

    /// Packed bytes, LSB-first
    pub fn as_bytes(&self) -> &[u8; BUFFER_LEN] {
        &self.pixels
    }

    /// Mutable packed bytes, for blitting pre-rendered images
    pub fn as_bytes_mut(&mut self) -> &mut [u8; BUFFER_LEN] {
        &mut self.pixels
    }
}

impl StripeSource for LsbFrameBuffer {
    fn stripe(&self, index: usize) -> Result<[u8; STRIPE_LEN], FrameError> {
        encode_stripe(&self.pixels, BitOrder::LsbFirst, index)
    }
}

#[cfg(any(test, feature = "embedded-graphics"))]
mod graphics {
    use super::{FrameBuffer, LsbFrameBuffer, HEIGHT, WIDTH};
    use embedded_graphics::draw_target::DrawTarget;
    use embedded_graphics::geometry::{OriginDimensions, Size};
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_graphics::Pixel;

    macro_rules! impl_draw_target {
        ($buffer:ty) => {
            impl OriginDimensions for $buffer {
                fn size(&self) -> Size {
                    Size::new(WIDTH as u32, HEIGHT as u32)
                }
            }

            impl DrawTarget for $buffer {
                type Color = BinaryColor;
                type Error = core::convert::Infallible;

                fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
                where
                    I: IntoIterator<Item = Pixel<Self::Color>>,
                {
                    for Pixel(point, color) in pixels {
                        if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y))
                        {
                            self.set_pixel(x, y, color.is_on());
                        }
                    }
                    Ok(())
                }

                fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
                    let fill = if color.is_on() { 0xFF } else { 0x00 };
                    self.pixels.fill(fill);
                    Ok(())
                }
            }
        };
    }

    impl_draw_target!(FrameBuffer);
    impl_draw_target!(LsbFrameBuffer);
}
