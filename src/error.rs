//! Failures reported by the decoders.

use core::fmt;

use parsing::OutOfBounds;
use thiserror::Error;

/// The structure a revision check was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Structure {
    /// A `SID` record.
    SecurityIdentifier,
    /// A `SECURITY_DESCRIPTOR` header.
    SecurityDescriptor,
}

impl fmt::Display for Structure {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SecurityIdentifier => "security identifier",
            Self::SecurityDescriptor => "security descriptor",
        })
    }
}

/// Internal consistency checks that can fail on corrupt input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[non_exhaustive]
pub enum MalformedReason {
    /// The SID declares more sub-authorities than Windows allows.
    #[error("SID declares {count} sub-authorities, at most 15 are allowed")]
    TooManySubAuthorities {
        /// Declared count.
        count: u8,
    },
    /// An ACE size field disagrees with the bytes its body occupies.
    #[error("ACE at offset {offset} declares {declared} bytes but its body spans {actual}")]
    AceSizeMismatch {
        /// Offset of the ACE.
        offset: usize,
        /// Value of the ACE size field.
        declared: u16,
        /// Bytes consumed by the header, body and SID.
        actual: usize,
    },
    /// An ACE size field is smaller than the ACE header.
    #[error("ACE at offset {offset} declares {declared} bytes, less than its header")]
    AceTooShort {
        /// Offset of the ACE.
        offset: usize,
        /// Value of the ACE size field.
        declared: u16,
    },
    /// An ACL size field disagrees with the sum of its entries.
    #[error("ACL at offset {offset} declares {declared} bytes but its entries span {actual}")]
    AclSizeMismatch {
        /// Offset of the ACL.
        offset: usize,
        /// Value of the ACL size field.
        declared: u16,
        /// Header plus the sizes of all decoded entries.
        actual: usize,
    },
    /// A descriptor offset points inside the fixed header.
    #[error("{field} offset {offset} points inside the descriptor header")]
    OffsetInHeader {
        /// Which of the four offsets.
        field: DescriptorField,
        /// Value of the offset field.
        offset: u32,
    },
    /// A presence control bit is set while the matching offset is zero.
    #[error("{field} presence flag is set but its offset is zero")]
    PresenceFlagWithoutOffset {
        /// Which of the two ACLs.
        field: DescriptorField,
    },
}

/// Wire variants that are recognised but not decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[non_exhaustive]
pub enum UnsupportedReason {
    /// The descriptor does not carry `SE_SELF_RELATIVE`.
    #[error("absolute (pointer based) security descriptor layout")]
    AbsoluteDescriptor,
    /// An ACE type this crate does not know how to decode.
    #[error("ACE type 0x{ace_type:02x}")]
    AceType {
        /// Raw type byte.
        ace_type: u8,
    },
}

/// The four sub-structures a descriptor references by offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorField {
    /// Owner SID.
    Owner,
    /// Primary group SID.
    Group,
    /// System ACL.
    SystemAcl,
    /// Discretionary ACL.
    DiscretionaryAcl,
}

impl fmt::Display for DescriptorField {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Owner => "owner SID",
            Self::Group => "group SID",
            Self::SystemAcl => "system ACL",
            Self::DiscretionaryAcl => "discretionary ACL",
        })
    }
}

/// Error returned by every decode operation.
///
/// Decoding is all-or-nothing: as soon as any nested record fails the whole
/// decode stops with the error of that record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// A read would go past the end of the input.
    #[error("buffer too small: need {needed} bytes at offset {offset}, buffer holds {available}")]
    BufferTooSmall {
        /// Offset the read started at.
        offset: usize,
        /// Number of bytes the read required.
        needed: usize,
        /// Length of the input.
        available: usize,
    },
    /// A revision field holds a value other than the supported one.
    #[error("unsupported {structure} revision {revision}")]
    UnsupportedRevision {
        /// Which record carried the revision.
        structure: Structure,
        /// The revision found.
        revision: u8,
    },
    /// An internal consistency check failed.
    #[error("malformed input: {0}")]
    MalformedInput(MalformedReason),
    /// A recognised wire variant that is not implemented.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(UnsupportedReason),
}

/// Field-less discriminant of [`DecodeError`].
///
/// Meant for binding layers that translate failures into their own error
/// categories without caring about the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// See [`DecodeError::BufferTooSmall`].
    BufferTooSmall,
    /// See [`DecodeError::UnsupportedRevision`].
    UnsupportedRevision,
    /// See [`DecodeError::MalformedInput`].
    MalformedInput,
    /// See [`DecodeError::UnsupportedFormat`].
    UnsupportedFormat,
}

impl ErrorKind {
    /// A short, stable name for logs and bindings.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BufferTooSmall => "buffer_too_small",
            Self::UnsupportedRevision => "unsupported_revision",
            Self::MalformedInput => "malformed_input",
            Self::UnsupportedFormat => "unsupported_format",
        }
    }
}

impl fmt::Display for ErrorKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DecodeError {
    /// The category of this error.
    ///
    /// # Examples
    /// ```rust
    /// # use win_security_descriptor::{decode_security_identifier, ErrorKind};
    /// let err = decode_security_identifier(&[2, 0, 0, 0, 0, 0, 0, 5]).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::UnsupportedRevision);
    /// ```
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BufferTooSmall { .. } => ErrorKind::BufferTooSmall,
            Self::UnsupportedRevision { .. } => ErrorKind::UnsupportedRevision,
            Self::MalformedInput(_) => ErrorKind::MalformedInput,
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
        }
    }
}

impl From<OutOfBounds> for DecodeError {
    #[inline]
    fn from(value: OutOfBounds) -> Self {
        Self::BufferTooSmall {
            offset: value.offset,
            needed: value.needed,
            available: value.available,
        }
    }
}

impl From<MalformedReason> for DecodeError {
    #[inline]
    fn from(value: MalformedReason) -> Self {
        Self::MalformedInput(value)
    }
}

impl From<UnsupportedReason> for DecodeError {
    #[inline]
    fn from(value: UnsupportedReason) -> Self {
        Self::UnsupportedFormat(value)
    }
}
