//! Access control entries (`ACE`).
//!
//! Every ACE starts with the same 8 bytes:
//!
//! | Offset | Field | Width |
//! |---|---|---|
//! | 0 | type | 1 |
//! | 1 | flags | 1 |
//! | 2 | size | 2 |
//! | 4 | access mask | 4 |
//!
//! What follows depends on the type. Most types carry just a SID; object
//! types insert object flags and up to two GUIDs before it; callback types
//! append opaque application data after it.

use alloc::vec::Vec;
use core::fmt::{self, Display};

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use parsing::ByteStreamView;
use tracing::trace;
use uuid::Uuid;

use crate::{DecodeError, MalformedReason, SecurityIdentifier, UnsupportedReason};

/// Size of the fixed ACE header including the access mask.
pub const ACE_HEADER_LEN: usize = 8;

/// The `AceType` byte of an ACE header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
#[non_exhaustive]
pub enum AceType {
    /// `ACCESS_ALLOWED_ACE_TYPE`
    AccessAllowed = 0x00,
    /// `ACCESS_DENIED_ACE_TYPE`
    AccessDenied = 0x01,
    /// `SYSTEM_AUDIT_ACE_TYPE`
    SystemAudit = 0x02,
    /// `SYSTEM_ALARM_ACE_TYPE`
    SystemAlarm = 0x03,
    /// `ACCESS_ALLOWED_COMPOUND_ACE_TYPE`, reserved and never decoded.
    AccessAllowedCompound = 0x04,
    /// `ACCESS_ALLOWED_OBJECT_ACE_TYPE`
    AccessAllowedObject = 0x05,
    /// `ACCESS_DENIED_OBJECT_ACE_TYPE`
    AccessDeniedObject = 0x06,
    /// `SYSTEM_AUDIT_OBJECT_ACE_TYPE`
    SystemAuditObject = 0x07,
    /// `SYSTEM_ALARM_OBJECT_ACE_TYPE`
    SystemAlarmObject = 0x08,
    /// `ACCESS_ALLOWED_CALLBACK_ACE_TYPE`
    AccessAllowedCallback = 0x09,
    /// `ACCESS_DENIED_CALLBACK_ACE_TYPE`
    AccessDeniedCallback = 0x0a,
    /// `ACCESS_ALLOWED_CALLBACK_OBJECT_ACE_TYPE`
    AccessAllowedCallbackObject = 0x0b,
    /// `ACCESS_DENIED_CALLBACK_OBJECT_ACE_TYPE`
    AccessDeniedCallbackObject = 0x0c,
    /// `SYSTEM_AUDIT_CALLBACK_ACE_TYPE`
    SystemAuditCallback = 0x0d,
    /// `SYSTEM_ALARM_CALLBACK_ACE_TYPE`
    SystemAlarmCallback = 0x0e,
    /// `SYSTEM_AUDIT_CALLBACK_OBJECT_ACE_TYPE`
    SystemAuditCallbackObject = 0x0f,
    /// `SYSTEM_ALARM_CALLBACK_OBJECT_ACE_TYPE`
    SystemAlarmCallbackObject = 0x10,
    /// `SYSTEM_MANDATORY_LABEL_ACE_TYPE`
    SystemMandatoryLabel = 0x11,
    /// `SYSTEM_RESOURCE_ATTRIBUTE_ACE_TYPE`
    SystemResourceAttribute = 0x12,
    /// `SYSTEM_SCOPED_POLICY_ID_ACE_TYPE`
    SystemScopedPolicyId = 0x13,
    /// `SYSTEM_PROCESS_TRUST_LABEL_ACE_TYPE`
    SystemProcessTrustLabel = 0x14,
    /// `SYSTEM_ACCESS_FILTER_ACE_TYPE`
    SystemAccessFilter = 0x15,
}

impl AceType {
    /// Whether the body carries object flags and optional GUIDs before the SID.
    #[inline]
    #[must_use]
    pub const fn is_object(self) -> bool {
        matches!(
            self,
            Self::AccessAllowedObject
                | Self::AccessDeniedObject
                | Self::SystemAuditObject
                | Self::SystemAlarmObject
                | Self::AccessAllowedCallbackObject
                | Self::AccessDeniedCallbackObject
                | Self::SystemAuditCallbackObject
                | Self::SystemAlarmCallbackObject
        )
    }

    /// Whether opaque data may follow the SID up to the declared ACE size.
    #[inline]
    #[must_use]
    pub const fn has_application_data(self) -> bool {
        matches!(
            self,
            Self::AccessAllowedCallback
                | Self::AccessDeniedCallback
                | Self::AccessAllowedCallbackObject
                | Self::AccessDeniedCallbackObject
                | Self::SystemAuditCallback
                | Self::SystemAlarmCallback
                | Self::SystemAuditCallbackObject
                | Self::SystemAlarmCallbackObject
                | Self::SystemResourceAttribute
                | Self::SystemAccessFilter
        )
    }

    /// The Windows SDK constant name.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AccessAllowed => "ACCESS_ALLOWED_ACE_TYPE",
            Self::AccessDenied => "ACCESS_DENIED_ACE_TYPE",
            Self::SystemAudit => "SYSTEM_AUDIT_ACE_TYPE",
            Self::SystemAlarm => "SYSTEM_ALARM_ACE_TYPE",
            Self::AccessAllowedCompound => "ACCESS_ALLOWED_COMPOUND_ACE_TYPE",
            Self::AccessAllowedObject => "ACCESS_ALLOWED_OBJECT_ACE_TYPE",
            Self::AccessDeniedObject => "ACCESS_DENIED_OBJECT_ACE_TYPE",
            Self::SystemAuditObject => "SYSTEM_AUDIT_OBJECT_ACE_TYPE",
            Self::SystemAlarmObject => "SYSTEM_ALARM_OBJECT_ACE_TYPE",
            Self::AccessAllowedCallback => "ACCESS_ALLOWED_CALLBACK_ACE_TYPE",
            Self::AccessDeniedCallback => "ACCESS_DENIED_CALLBACK_ACE_TYPE",
            Self::AccessAllowedCallbackObject => "ACCESS_ALLOWED_CALLBACK_OBJECT_ACE_TYPE",
            Self::AccessDeniedCallbackObject => "ACCESS_DENIED_CALLBACK_OBJECT_ACE_TYPE",
            Self::SystemAuditCallback => "SYSTEM_AUDIT_CALLBACK_ACE_TYPE",
            Self::SystemAlarmCallback => "SYSTEM_ALARM_CALLBACK_ACE_TYPE",
            Self::SystemAuditCallbackObject => "SYSTEM_AUDIT_CALLBACK_OBJECT_ACE_TYPE",
            Self::SystemAlarmCallbackObject => "SYSTEM_ALARM_CALLBACK_OBJECT_ACE_TYPE",
            Self::SystemMandatoryLabel => "SYSTEM_MANDATORY_LABEL_ACE_TYPE",
            Self::SystemResourceAttribute => "SYSTEM_RESOURCE_ATTRIBUTE_ACE_TYPE",
            Self::SystemScopedPolicyId => "SYSTEM_SCOPED_POLICY_ID_ACE_TYPE",
            Self::SystemProcessTrustLabel => "SYSTEM_PROCESS_TRUST_LABEL_ACE_TYPE",
            Self::SystemAccessFilter => "SYSTEM_ACCESS_FILTER_ACE_TYPE",
        }
    }
}

impl Display for AceType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Inheritance and audit flags of an ACE header.
    ///
    /// Unknown bits are preserved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct AceFlags: u8 {
        /// `OBJECT_INHERIT_ACE`
        const OBJECT_INHERIT = 0x01;
        /// `CONTAINER_INHERIT_ACE`
        const CONTAINER_INHERIT = 0x02;
        /// `NO_PROPAGATE_INHERIT_ACE`
        const NO_PROPAGATE_INHERIT = 0x04;
        /// `INHERIT_ONLY_ACE`
        const INHERIT_ONLY = 0x08;
        /// `INHERITED_ACE`
        const INHERITED = 0x10;
        /// `CRITICAL_ACE_FLAG`
        const CRITICAL = 0x20;
        /// `SUCCESSFUL_ACCESS_ACE_FLAG`
        const SUCCESSFUL_ACCESS = 0x40;
        /// `FAILED_ACCESS_ACE_FLAG`
        const FAILED_ACCESS = 0x80;
    }
}

bitflags! {
    /// The 32-bit access mask of an ACE.
    ///
    /// Only the generic and standard rights are named; object specific bits
    /// (the low 16) are kept as-is and never interpreted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct AccessMask: u32 {
        /// `DELETE`
        const DELETE = 0x0001_0000;
        /// `READ_CONTROL`
        const READ_CONTROL = 0x0002_0000;
        /// `WRITE_DAC`
        const WRITE_DAC = 0x0004_0000;
        /// `WRITE_OWNER`
        const WRITE_OWNER = 0x0008_0000;
        /// `SYNCHRONIZE`
        const SYNCHRONIZE = 0x0010_0000;
        /// `ACCESS_SYSTEM_SECURITY`
        const ACCESS_SYSTEM_SECURITY = 0x0100_0000;
        /// `MAXIMUM_ALLOWED`
        const MAXIMUM_ALLOWED = 0x0200_0000;
        /// `GENERIC_ALL`
        const GENERIC_ALL = 0x1000_0000;
        /// `GENERIC_EXECUTE`
        const GENERIC_EXECUTE = 0x2000_0000;
        /// `GENERIC_WRITE`
        const GENERIC_WRITE = 0x4000_0000;
        /// `GENERIC_READ`
        const GENERIC_READ = 0x8000_0000;

        const _ = !0;
    }
}

bitflags! {
    /// Flags of an object ACE telling which GUIDs are present.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct ObjectAceFlags: u32 {
        /// `ACE_OBJECT_TYPE_PRESENT`
        const OBJECT_TYPE_PRESENT = 0x1;
        /// `ACE_INHERITED_OBJECT_TYPE_PRESENT`
        const INHERITED_OBJECT_TYPE_PRESENT = 0x2;
    }
}

/// The part of an object ACE between the access mask and the SID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ObjectAceData {
    flags: ObjectAceFlags,
    object_type: Option<Uuid>,
    inherited_object_type: Option<Uuid>,
}

impl ObjectAceData {
    /// The raw object flags.
    #[inline]
    #[must_use]
    pub const fn flags(&self) -> ObjectAceFlags {
        self.flags
    }

    /// The object, property set or property the ACE applies to.
    #[inline]
    #[must_use]
    pub const fn object_type(&self) -> Option<Uuid> {
        self.object_type
    }

    /// The child object class that may inherit the ACE.
    #[inline]
    #[must_use]
    pub const fn inherited_object_type(&self) -> Option<Uuid> {
        self.inherited_object_type
    }
}

/// One decoded access control entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AccessControlEntry {
    ace_type: AceType,
    flags: AceFlags,
    size: u16,
    access_mask: AccessMask,
    object: Option<ObjectAceData>,
    sid: SecurityIdentifier,
    application_data: Vec<u8>,
}

impl AccessControlEntry {
    /// Decodes the ACE starting at `offset` in `view`.
    ///
    /// The declared size must account exactly for the header, the
    /// type-specific body and the SID. Only callback-style types may have
    /// bytes left after the SID; those are returned by
    /// [`AccessControlEntry::application_data`].
    ///
    /// # Errors
    /// - [`DecodeError::BufferTooSmall`] if the record runs past `view`.
    /// - [`DecodeError::MalformedInput`] if the declared size disagrees with
    ///   the decoded body.
    /// - [`DecodeError::UnsupportedFormat`] for the reserved compound type and
    ///   unknown type codes.
    /// - Any error of [`SecurityIdentifier::decode`] for the embedded SID.
    #[inline]
    pub fn decode(view: ByteStreamView<'_>, offset: usize) -> Result<Self, DecodeError> {
        let mut cursor = view.cursor_at(offset);
        let raw_type = cursor.read_u8()?;
        let flags = AceFlags::from_bits_retain(cursor.read_u8()?);
        let size = cursor.read_u16_le()?;
        let access_mask = AccessMask::from_bits_retain(cursor.read_u32_le()?);

        let ace_type = match AceType::try_from(raw_type) {
            Ok(AceType::AccessAllowedCompound) | Err(_) => {
                return Err(UnsupportedReason::AceType { ace_type: raw_type }.into());
            }
            Ok(ace_type) => ace_type,
        };
        let declared = usize::from(size);
        if declared < ACE_HEADER_LEN {
            return Err(MalformedReason::AceTooShort {
                offset,
                declared: size,
            }
            .into());
        }

        let object = if ace_type.is_object() {
            let flags = ObjectAceFlags::from_bits_retain(cursor.read_u32_le()?);
            let object_type = if flags.contains(ObjectAceFlags::OBJECT_TYPE_PRESENT) {
                Some(Uuid::from_bytes_le(cursor.read_array::<16>()?))
            } else {
                None
            };
            let inherited_object_type =
                if flags.contains(ObjectAceFlags::INHERITED_OBJECT_TYPE_PRESENT) {
                    Some(Uuid::from_bytes_le(cursor.read_array::<16>()?))
                } else {
                    None
                };
            Some(ObjectAceData {
                flags,
                object_type,
                inherited_object_type,
            })
        } else {
            None
        };

        let sid = SecurityIdentifier::decode(view, cursor.position())?;
        cursor.skip(sid.wire_len())?;

        let consumed = cursor.position() - offset;
        let mismatch = MalformedReason::AceSizeMismatch {
            offset,
            declared: size,
            actual: consumed,
        };
        let application_data = if ace_type.has_application_data() {
            let trailing = declared.checked_sub(consumed).ok_or(mismatch)?;
            cursor.read_fixed(trailing)?.to_vec()
        } else if declared == consumed {
            Vec::new()
        } else {
            return Err(mismatch.into());
        };

        trace!(
            offset,
            size,
            ace_type = %ace_type,
            flags = flags.bits(),
            access_mask = access_mask.bits(),
            sid = %sid,
            "decoded access control entry"
        );
        Ok(Self {
            ace_type,
            flags,
            size,
            access_mask,
            object,
            sid,
            application_data,
        })
    }

    /// The ACE type.
    #[inline]
    #[must_use]
    pub const fn ace_type(&self) -> AceType {
        self.ace_type
    }

    /// Inheritance and audit flags.
    #[inline]
    #[must_use]
    pub const fn flags(&self) -> AceFlags {
        self.flags
    }

    /// Total record length in bytes, also the distance to the next ACE.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> u16 {
        self.size
    }

    /// The access mask, uninterpreted.
    #[inline]
    #[must_use]
    pub const fn access_mask(&self) -> AccessMask {
        self.access_mask
    }

    /// The trustee the entry applies to.
    #[inline]
    #[must_use]
    pub const fn sid(&self) -> &SecurityIdentifier {
        &self.sid
    }

    /// Object flags and GUIDs, present for object ACE types only.
    #[inline]
    #[must_use]
    pub const fn object(&self) -> Option<&ObjectAceData> {
        self.object.as_ref()
    }

    /// Bytes following the SID in callback-style ACEs; empty otherwise.
    #[inline]
    #[must_use]
    pub fn application_data(&self) -> &[u8] {
        &self.application_data
    }

    /// Whether the entry was inherited from a parent object.
    #[inline]
    #[must_use]
    pub const fn is_inherited(&self) -> bool {
        self.flags.contains(AceFlags::INHERITED)
    }
}
