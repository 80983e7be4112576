//! Canonical `S-<revision>-<authority>-<sub1>-...` rendering of a SID.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{self, Display};

use crate::SecurityIdentifier;

impl Display for SecurityIdentifier {
    /// Every component is written in unsigned decimal without padding,
    /// including identifier authorities above `u32::MAX`.
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}-{}", self.revision(), self.identifier_authority())?;
        for sub_authority in self.sub_authorities() {
            write!(f, "-{sub_authority}")?;
        }
        Ok(())
    }
}

/// Formats `sid` as its canonical string.
///
/// Equivalent to `sid.to_string()`.
///
/// # Examples
/// ```rust
/// # use win_security_descriptor::{decode_security_identifier, format_sid};
/// let bytes = [
///     0x01, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x15, 0x00, 0x00, 0x00, 0xc7, 0x99,
///     0x2e, 0x25, 0x7c, 0x57, 0x85, 0xc0, 0x94, 0x5a, 0xce, 0x01, 0xf5, 0x03, 0x00, 0x00,
/// ];
/// let sid = decode_security_identifier(&bytes).unwrap();
/// assert_eq!(format_sid(&sid), "S-1-5-21-623811015-3229964156-30300820-1013");
/// ```
#[inline]
#[must_use]
pub fn format_sid(sid: &SecurityIdentifier) -> String {
    sid.to_string()
}

impl SecurityIdentifier {
    /// The canonical string as UTF-16 code units, without a terminator.
    #[inline]
    #[must_use]
    pub fn to_utf16_string(&self) -> Vec<u16> {
        self.to_string().encode_utf16().collect()
    }
}
