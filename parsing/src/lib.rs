//! Core parsing building blocks shared by `win-security-descriptor` and its
//! procedural macro.
//!
//! - [`ByteStreamView`] and [`ByteCursor`]: bounds-checked little-endian reads
//!   over a borrowed buffer.
//! - [`SidComponents`]: the pieces of a SID parsed from its textual
//!   `S-R-I-S...` form.
//!
//! Nothing in here allocates.

#![cfg_attr(not(feature = "std"), no_std)]

mod byte_stream;
mod sid_components;

pub use byte_stream::{ByteCursor, ByteStreamView, OutOfBounds};
pub use sid_components::{InvalidSidFormat, SidComponents};

/// The only SID revision defined by Windows.
pub const SID_REVISION: u8 = 1;

/// Largest number of sub-authorities a SID may carry (`SID_MAX_SUB_AUTHORITIES`).
pub const MAX_SUB_AUTHORITY_COUNT: u8 = 15;

/// Size of the fixed SID header: revision, count and the 6-byte authority.
pub const SID_HEADER_LEN: usize = 8;

/// Largest value representable by the 48-bit identifier authority.
pub const MAX_IDENTIFIER_AUTHORITY: u64 = 0xFFFF_FFFF_FFFF;

/// Interprets the 6 authority bytes as a big-endian unsigned 48-bit integer.
#[inline]
#[must_use]
pub const fn authority_to_u64(bytes: [u8; 6]) -> u64 {
    let [a, b, c, d, e, f] = bytes;
    u64::from_be_bytes([0, 0, a, b, c, d, e, f])
}

/// Splits a 48-bit value into the 6 big-endian authority bytes.
///
/// Returns `None` when `value` does not fit in 48 bits.
#[inline]
#[must_use]
pub const fn authority_from_u64(value: u64) -> Option<[u8; 6]> {
    if value > MAX_IDENTIFIER_AUTHORITY {
        return None;
    }
    let [_, _, a, b, c, d, e, f] = value.to_be_bytes();
    Some([a, b, c, d, e, f])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_round_trip() {
        assert_eq!(authority_to_u64([0, 0, 0, 0, 0, 5]), 5);
        assert_eq!(authority_to_u64([0xFF; 6]), MAX_IDENTIFIER_AUTHORITY);
        assert_eq!(authority_from_u64(16), Some([0, 0, 0, 0, 0, 16]));
        assert_eq!(authority_from_u64(MAX_IDENTIFIER_AUTHORITY + 1), None);
    }
}
