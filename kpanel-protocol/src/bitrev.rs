//! Bit reversal
//!
//! The display consumes each byte-column most-significant-bit first, the
//! opposite of the usual packed vertical-byte layout. Reversal is a table
//! lookup so encoding a stripe costs one load per byte.

/// Reverse the bit order of every byte value, computed at compile time
const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut value = i as u8;
        let mut reversed = 0u8;
        let mut bit = 0;
        while bit < 8 {
            reversed = (reversed << 1) | (value & 1);
            value >>= 1;
            bit += 1;
        }
        table[i] = reversed;
        i += 1;
    }
    table
}

/// Lookup table: `BIT_REVERSE[b]` is `b` with bit 0 and bit 7 swapped, etc.
pub static BIT_REVERSE: [u8; 256] = build_table();

/// Reverse the bit order of a byte
#[inline]
pub fn bit_reverse(byte: u8) -> u8 {
    BIT_REVERSE[byte as usize]
}

/// Reverse the bit order of every byte in place
pub fn bit_reverse_in_place(bytes: &mut [u8]) {
    for byte in bytes {
        *byte = bit_reverse(*byte);
    }
}
