use core::fmt::{self, Display};

use parsing::authority_to_u64;

/// The 6-byte identifier authority of a SID.
///
/// Stored big-endian exactly as on the wire; [`SidIdentifierAuthority::as_u64`]
/// gives the 48-bit numeric value used in the string form.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SidIdentifierAuthority {
    /// Raw big-endian bytes.
    pub value: [u8; 6],
}

impl SidIdentifierAuthority {
    /// `SECURITY_NULL_SID_AUTHORITY` (0).
    pub const NULL_AUTHORITY: Self = Self::new([0, 0, 0, 0, 0, 0]);
    /// `SECURITY_WORLD_SID_AUTHORITY` (1).
    pub const SECURITY_WORLD_AUTHORITY: Self = Self::new([0, 0, 0, 0, 0, 1]);
    /// `SECURITY_LOCAL_SID_AUTHORITY` (2).
    pub const SECURITY_LOCAL_AUTHORITY: Self = Self::new([0, 0, 0, 0, 0, 2]);
    /// `SECURITY_CREATOR_SID_AUTHORITY` (3).
    pub const SECURITY_CREATOR_AUTHORITY: Self = Self::new([0, 0, 0, 0, 0, 3]);
    /// `SECURITY_NON_UNIQUE_AUTHORITY` (4).
    pub const SECURITY_NON_UNIQUE_AUTHORITY: Self = Self::new([0, 0, 0, 0, 0, 4]);
    /// `SECURITY_NT_AUTHORITY` (5).
    pub const NT_AUTHORITY: Self = Self::new([0, 0, 0, 0, 0, 5]);
    /// `SECURITY_RESOURCE_MANAGER_AUTHORITY` (9).
    pub const SECURITY_RESOURCE_MANAGER_AUTHORITY: Self = Self::new([0, 0, 0, 0, 0, 9]);
    /// `SECURITY_APP_PACKAGE_AUTHORITY` (15).
    pub const SECURITY_APP_PACKAGE_AUTHORITY: Self = Self::new([0, 0, 0, 0, 0, 15]);
    /// `SECURITY_MANDATORY_LABEL_AUTHORITY` (16).
    pub const SECURITY_MANDATORY_LABEL_AUTHORITY: Self = Self::new([0, 0, 0, 0, 0, 16]);

    /// Wraps the big-endian authority bytes.
    #[inline]
    #[must_use]
    pub const fn new(value: [u8; 6]) -> Self {
        Self { value }
    }

    /// The authority as an unsigned 48-bit integer.
    ///
    /// ```rust
    /// # use win_security_descriptor::SidIdentifierAuthority;
    /// assert_eq!(SidIdentifierAuthority::NT_AUTHORITY.as_u64(), 5);
    /// ```
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        authority_to_u64(self.value)
    }
}

impl Display for SidIdentifierAuthority {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.as_u64(), f)
    }
}

impl From<[u8; 6]> for SidIdentifierAuthority {
    #[inline]
    fn from(value: [u8; 6]) -> Self {
        Self { value }
    }
}

impl From<SidIdentifierAuthority> for [u8; 6] {
    #[inline]
    fn from(value: SidIdentifierAuthority) -> Self {
        value.value
    }
}
