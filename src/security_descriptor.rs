use bitflags::bitflags;
use parsing::ByteStreamView;
use tracing::debug;

use crate::{
    AccessControlList, DecodeError, DescriptorField, MalformedReason, SecurityIdentifier,
    Structure, UnsupportedReason,
};

/// Size of the fixed self-relative descriptor header.
pub const SECURITY_DESCRIPTOR_HEADER_LEN: usize = 20;

bitflags! {
    /// `SECURITY_DESCRIPTOR_CONTROL` bits.
    ///
    /// Unknown bits are preserved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct ControlFlags: u16 {
        /// `SE_OWNER_DEFAULTED`
        const OWNER_DEFAULTED = 0x0001;
        /// `SE_GROUP_DEFAULTED`
        const GROUP_DEFAULTED = 0x0002;
        /// `SE_DACL_PRESENT`
        const DACL_PRESENT = 0x0004;
        /// `SE_DACL_DEFAULTED`
        const DACL_DEFAULTED = 0x0008;
        /// `SE_SACL_PRESENT`
        const SACL_PRESENT = 0x0010;
        /// `SE_SACL_DEFAULTED`
        const SACL_DEFAULTED = 0x0020;
        /// `SE_DACL_UNTRUSTED`
        const DACL_UNTRUSTED = 0x0040;
        /// `SE_SERVER_SECURITY`
        const SERVER_SECURITY = 0x0080;
        /// `SE_DACL_AUTO_INHERIT_REQ`
        const DACL_AUTO_INHERIT_REQ = 0x0100;
        /// `SE_SACL_AUTO_INHERIT_REQ`
        const SACL_AUTO_INHERIT_REQ = 0x0200;
        /// `SE_DACL_AUTO_INHERITED`
        const DACL_AUTO_INHERITED = 0x0400;
        /// `SE_SACL_AUTO_INHERITED`
        const SACL_AUTO_INHERITED = 0x0800;
        /// `SE_DACL_PROTECTED`
        const DACL_PROTECTED = 0x1000;
        /// `SE_SACL_PROTECTED`
        const SACL_PROTECTED = 0x2000;
        /// `SE_RM_CONTROL_VALID`
        const RM_CONTROL_VALID = 0x4000;
        /// `SE_SELF_RELATIVE`
        const SELF_RELATIVE = 0x8000;
    }
}

/// What to do when `SE_DACL_PRESENT` or `SE_SACL_PRESENT` is set but the
/// matching offset is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PresenceFlagPolicy {
    /// Reject the descriptor with [`MalformedReason::PresenceFlagWithoutOffset`].
    #[default]
    Strict,
    /// Accept the descriptor and report the ACL as absent.
    ///
    /// In memory Windows reads a present DACL with a null pointer as a
    /// "NULL DACL" granting everyone full access, so callers using this mode
    /// should check [`ControlFlags::DACL_PRESENT`] themselves.
    Lenient,
}

/// Runtime knobs for [`SecurityDescriptor::decode_with`].
///
/// ```rust
/// # use win_security_descriptor::{DecoderOptions, PresenceFlagPolicy};
/// let options = DecoderOptions::default().with_presence_flag_policy(PresenceFlagPolicy::Lenient);
/// assert_eq!(options.presence_flag_policy, PresenceFlagPolicy::Lenient);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct DecoderOptions {
    /// See [`PresenceFlagPolicy`].
    pub presence_flag_policy: PresenceFlagPolicy,
}

impl DecoderOptions {
    /// Strict defaults.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            presence_flag_policy: PresenceFlagPolicy::Strict,
        }
    }

    /// Replaces the presence flag policy.
    #[inline]
    #[must_use]
    pub const fn with_presence_flag_policy(mut self, policy: PresenceFlagPolicy) -> Self {
        self.presence_flag_policy = policy;
        self
    }
}

/// A decoded self-relative `SECURITY_DESCRIPTOR`.
///
/// # Wire layout
/// | Offset | Field | Width |
/// |---|---|---|
/// | 0 | revision | 1 |
/// | 1 | reserved (`Sbz1`) | 1 |
/// | 2 | control | 2 |
/// | 4 | owner offset | 4 |
/// | 8 | group offset | 4 |
/// | 12 | SACL offset | 4 |
/// | 16 | DACL offset | 4 |
///
/// Offsets are relative to the start of the descriptor; zero means absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SecurityDescriptor {
    revision: u8,
    control_flags: ControlFlags,
    owner: Option<SecurityIdentifier>,
    group: Option<SecurityIdentifier>,
    system_acl: Option<AccessControlList>,
    discretionary_acl: Option<AccessControlList>,
}

impl SecurityDescriptor {
    /// The only descriptor revision Windows defines.
    pub const REVISION: u8 = 1;

    /// Decodes a self-relative descriptor with default [`DecoderOptions`].
    ///
    /// # Errors
    /// See [`SecurityDescriptor::decode_with`].
    #[inline]
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_with(bytes, &DecoderOptions::default())
    }

    /// Decodes a self-relative descriptor.
    ///
    /// Each nonzero offset is followed whether or not its presence bit is
    /// set. The first failure aborts the whole decode.
    ///
    /// # Errors
    /// - [`DecodeError::BufferTooSmall`] if `bytes` is shorter than the
    ///   header, an offset lies at or past its end, or a referenced structure
    ///   is truncated.
    /// - [`DecodeError::UnsupportedRevision`] if the revision is not 1.
    /// - [`DecodeError::UnsupportedFormat`] if `SE_SELF_RELATIVE` is clear.
    /// - [`DecodeError::MalformedInput`] if an offset points inside the
    ///   header, if a presence bit has no offset under
    ///   [`PresenceFlagPolicy::Strict`], or if a nested structure is
    ///   inconsistent.
    #[inline]
    pub fn decode_with(bytes: &[u8], options: &DecoderOptions) -> Result<Self, DecodeError> {
        let result = Self::decode_view(ByteStreamView::new(bytes), options);
        if let Err(err) = &result {
            debug!(kind = %err.kind(), error = %err, len = bytes.len(), "security descriptor decode failed");
        }
        result
    }

    fn decode_view(view: ByteStreamView<'_>, options: &DecoderOptions) -> Result<Self, DecodeError> {
        view.check(0, SECURITY_DESCRIPTOR_HEADER_LEN)?;
        let mut cursor = view.cursor_at(0);
        let revision = cursor.read_u8()?;
        cursor.skip(1)?;
        let control_flags = ControlFlags::from_bits_retain(cursor.read_u16_le()?);
        let owner_offset = cursor.read_u32_le()?;
        let group_offset = cursor.read_u32_le()?;
        let sacl_offset = cursor.read_u32_le()?;
        let dacl_offset = cursor.read_u32_le()?;

        if revision != Self::REVISION {
            return Err(DecodeError::UnsupportedRevision {
                structure: Structure::SecurityDescriptor,
                revision,
            });
        }
        if !control_flags.contains(ControlFlags::SELF_RELATIVE) {
            return Err(UnsupportedReason::AbsoluteDescriptor.into());
        }

        let owner = resolve_offset(view, DescriptorField::Owner, owner_offset, false, options)?
            .map(|offset| SecurityIdentifier::decode(view, offset))
            .transpose()?;
        let group = resolve_offset(view, DescriptorField::Group, group_offset, false, options)?
            .map(|offset| SecurityIdentifier::decode(view, offset))
            .transpose()?;
        let system_acl = resolve_offset(
            view,
            DescriptorField::SystemAcl,
            sacl_offset,
            control_flags.contains(ControlFlags::SACL_PRESENT),
            options,
        )?
        .map(|offset| AccessControlList::decode(view, offset))
        .transpose()?;
        let discretionary_acl = resolve_offset(
            view,
            DescriptorField::DiscretionaryAcl,
            dacl_offset,
            control_flags.contains(ControlFlags::DACL_PRESENT),
            options,
        )?
        .map(|offset| AccessControlList::decode(view, offset))
        .transpose()?;

        debug!(
            len = view.len(),
            control = control_flags.bits(),
            owner_offset,
            group_offset,
            sacl_offset,
            dacl_offset,
            sacl_entries = system_acl.as_ref().map_or(0, AccessControlList::len),
            dacl_entries = discretionary_acl.as_ref().map_or(0, AccessControlList::len),
            "decoded security descriptor"
        );
        Ok(Self {
            revision,
            control_flags,
            owner,
            group,
            system_acl,
            discretionary_acl,
        })
    }

    /// The descriptor revision, always 1 once decoded.
    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u8 {
        self.revision
    }

    /// The raw control bits.
    #[inline]
    #[must_use]
    pub const fn control_flags(&self) -> ControlFlags {
        self.control_flags
    }

    /// The owner SID, if the owner offset is nonzero.
    #[inline]
    #[must_use]
    pub const fn owner(&self) -> Option<&SecurityIdentifier> {
        self.owner.as_ref()
    }

    /// The primary group SID, if the group offset is nonzero.
    #[inline]
    #[must_use]
    pub const fn group(&self) -> Option<&SecurityIdentifier> {
        self.group.as_ref()
    }

    /// The system (audit) ACL, if the SACL offset is nonzero.
    #[inline]
    #[must_use]
    pub const fn system_acl(&self) -> Option<&AccessControlList> {
        self.system_acl.as_ref()
    }

    /// The discretionary ACL, if the DACL offset is nonzero.
    #[inline]
    #[must_use]
    pub const fn discretionary_acl(&self) -> Option<&AccessControlList> {
        self.discretionary_acl.as_ref()
    }
}

impl TryFrom<&[u8]> for SecurityDescriptor {
    type Error = DecodeError;

    #[inline]
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::decode(value)
    }
}

/// Validates a header offset and turns it into a buffer position.
fn resolve_offset(
    view: ByteStreamView<'_>,
    field: DescriptorField,
    offset: u32,
    present: bool,
    options: &DecoderOptions,
) -> Result<Option<usize>, DecodeError> {
    if offset == 0 {
        return match options.presence_flag_policy {
            PresenceFlagPolicy::Strict if present => {
                Err(MalformedReason::PresenceFlagWithoutOffset { field }.into())
            }
            _ => Ok(None),
        };
    }
    let position = usize::try_from(offset).unwrap_or(usize::MAX);
    if position < SECURITY_DESCRIPTOR_HEADER_LEN {
        return Err(MalformedReason::OffsetInHeader { field, offset }.into());
    }
    view.check(position, 1)?;
    Ok(Some(position))
}
