use alloc::vec::Vec;
use core::slice;

use delegate::delegate;
use parsing::ByteStreamView;
use tracing::debug;

use crate::{AccessControlEntry, DecodeError, MalformedReason};

/// Size of the fixed ACL header.
pub const ACL_HEADER_LEN: usize = 8;

/// A decoded access control list (`ACL`).
///
/// # Wire layout
/// | Offset | Field | Width |
/// |---|---|---|
/// | 0 | revision | 1 |
/// | 1 | padding | 1 |
/// | 2 | size | 2 |
/// | 4 | entry count | 2 |
/// | 6 | padding | 2 |
/// | 8 | entries, back to back | `size - 8` |
///
/// The revision (2 for plain ACLs, 4 when object ACEs are present) is kept
/// but not checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AccessControlList {
    revision: u8,
    size: u16,
    ace_count: u16,
    entries: Vec<AccessControlEntry>,
}

impl AccessControlList {
    /// Decodes the ACL starting at `offset` in `view`.
    ///
    /// Exactly `entry count` entries are decoded, each starting where the
    /// previous one's declared size ends. The header plus all entry sizes must
    /// add up to the declared ACL size.
    ///
    /// # Errors
    /// - [`DecodeError::BufferTooSmall`] if the header or an entry lies past
    ///   the end of `view`.
    /// - [`DecodeError::MalformedInput`] on an ACL size mismatch.
    /// - Any error of [`AccessControlEntry::decode`].
    #[inline]
    pub fn decode(view: ByteStreamView<'_>, offset: usize) -> Result<Self, DecodeError> {
        let mut cursor = view.cursor_at(offset);
        let revision = cursor.read_u8()?;
        cursor.skip(1)?;
        let size = cursor.read_u16_le()?;
        let ace_count = cursor.read_u16_le()?;
        cursor.skip(2)?;

        let mut entries = Vec::new();
        let mut consumed = ACL_HEADER_LEN;
        for _ in 0..ace_count {
            let entry = AccessControlEntry::decode(view, cursor.position())?;
            cursor.skip(usize::from(entry.size()))?;
            consumed += usize::from(entry.size());
            entries.push(entry);
        }

        if consumed != usize::from(size) {
            return Err(MalformedReason::AclSizeMismatch {
                offset,
                declared: size,
                actual: consumed,
            }
            .into());
        }

        debug!(offset, revision, size, ace_count, "decoded access control list");
        Ok(Self {
            revision,
            size,
            ace_count,
            entries,
        })
    }

    /// Decodes an ACL from the start of `bytes`.
    ///
    /// # Errors
    /// See [`AccessControlList::decode`].
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::decode(ByteStreamView::new(bytes), 0)
    }

    /// The ACL revision as stored.
    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u8 {
        self.revision
    }

    /// Declared size in bytes, header included.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> u16 {
        self.size
    }

    /// Declared entry count, always equal to [`AccessControlList::len`].
    #[inline]
    #[must_use]
    pub const fn ace_count(&self) -> u16 {
        self.ace_count
    }

    /// The entries in wire order.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[AccessControlEntry] {
        &self.entries
    }

    /// The entry at `index`, if any.
    #[inline]
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&AccessControlEntry> {
        self.entries.get(index)
    }

    delegate! {
        to self.entries {
            /// Number of entries.
            #[inline]
            #[must_use]
            pub fn len(&self) -> usize;
            /// Whether the list has no entries.
            ///
            /// An empty DACL denies all access, unlike a missing one.
            #[inline]
            #[must_use]
            pub fn is_empty(&self) -> bool;
            /// Iterates over the entries in wire order.
            #[inline]
            pub fn iter(&self) -> slice::Iter<'_, AccessControlEntry>;
        }
    }
}

impl<'a> IntoIterator for &'a AccessControlList {
    type Item = &'a AccessControlEntry;
    type IntoIter = slice::Iter<'a, AccessControlEntry>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
pub(crate) mod test {
    use super::*;
    use crate::access_control_entry::test::{LOCAL_SYSTEM_ACE, ace_bytes};
    use crate::{AceFlags, AceType, ErrorKind, well_known};

    /// Two ACCESS_ALLOWED entries: S-1-5-18 and S-1-5-32-544.
    pub(crate) const TWO_ENTRY_ACL: [u8; 52] = [
        0x02, 0x00, 0x34, 0x00, 0x02, 0x00, 0x00, 0x00, // header
        0x00, 0x00, 0x14, 0x00, 0x9f, 0x01, 0x12, 0x00, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x05, 0x12, 0x00, 0x00, 0x00, // S-1-5-18
        0x00, 0x00, 0x18, 0x00, 0x9f, 0x01, 0x12, 0x00, 0x01, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x05, 0x20, 0x00, 0x00, 0x00, 0x20, 0x02, 0x00, 0x00, // S-1-5-32-544
    ];

    fn acl_bytes(revision: u8, entries: &[Vec<u8>]) -> Vec<u8> {
        let size = ACL_HEADER_LEN + entries.iter().map(Vec::len).sum::<usize>();
        let mut bytes = vec![revision, 0];
        bytes.extend_from_slice(&u16::try_from(size).unwrap().to_le_bytes());
        bytes.extend_from_slice(&u16::try_from(entries.len()).unwrap().to_le_bytes());
        bytes.extend_from_slice(&[0, 0]);
        for entry in entries {
            bytes.extend_from_slice(entry);
        }
        bytes
    }

    #[test]
    fn decodes_two_entry_acl() {
        let acl = AccessControlList::from_bytes(&TWO_ENTRY_ACL).unwrap();
        assert_eq!(acl.revision(), 2);
        assert_eq!(acl.size(), 52);
        assert_eq!(acl.ace_count(), 2);
        assert_eq!(acl.len(), 2);

        let sids: Vec<_> = acl.iter().map(|ace| *ace.sid()).collect();
        assert_eq!(sids, [well_known::LOCAL_SYSTEM, well_known::BUILTIN_ADMINISTRATORS]);
        for ace in &acl {
            assert_eq!(ace.ace_type(), AceType::AccessAllowed);
            assert_eq!(ace.access_mask().bits(), 0x0012_019f);
        }
        assert_eq!(acl.entry(1).unwrap().size(), 24);
        assert!(acl.entry(2).is_none());
    }

    #[test]
    fn empty_acl() {
        let acl = AccessControlList::from_bytes(&acl_bytes(2, &[])).unwrap();
        assert!(acl.is_empty());
        assert_eq!(acl.size(), 8);
    }

    #[test]
    fn size_mismatch_is_malformed() {
        let mut bytes = TWO_ENTRY_ACL.to_vec();
        bytes[2] = 0x38;
        bytes.extend_from_slice(&[0; 4]);
        assert_eq!(
            AccessControlList::from_bytes(&bytes),
            Err(MalformedReason::AclSizeMismatch {
                offset: 0,
                declared: 56,
                actual: 52
            }
            .into())
        );
    }

    #[test]
    fn size_below_header_is_malformed() {
        let mut bytes = acl_bytes(2, &[]);
        bytes[2] = 0x04;
        assert_eq!(
            AccessControlList::from_bytes(&bytes).unwrap_err().kind(),
            ErrorKind::MalformedInput
        );
    }

    #[test]
    fn count_past_buffer_is_buffer_too_small() {
        let mut bytes = TWO_ENTRY_ACL;
        bytes[4] = 3;
        assert_eq!(
            AccessControlList::from_bytes(&bytes).unwrap_err().kind(),
            ErrorKind::BufferTooSmall
        );
    }

    #[test]
    fn truncated_header_is_buffer_too_small() {
        for len in 0..ACL_HEADER_LEN {
            assert_eq!(
                AccessControlList::from_bytes(&TWO_ENTRY_ACL[..len]).unwrap_err().kind(),
                ErrorKind::BufferTooSmall
            );
        }
    }

    #[test]
    fn entry_error_propagates() {
        let mut bytes = TWO_ENTRY_ACL;
        bytes[8 + 20] = 0x04;
        assert_eq!(
            AccessControlList::from_bytes(&bytes).unwrap_err().kind(),
            ErrorKind::UnsupportedFormat
        );
    }

    #[test]
    fn revision_is_not_checked() {
        let callback = ace_bytes(0x09, 0x03, 0x1, &[], &well_known::WORLD, &[1, 2, 3, 4]);
        let acl = AccessControlList::from_bytes(&acl_bytes(7, &[LOCAL_SYSTEM_ACE.to_vec(), callback]))
            .unwrap();
        assert_eq!(acl.revision(), 7);
        assert_eq!(
            acl.entry(1).unwrap().flags(),
            AceFlags::OBJECT_INHERIT | AceFlags::CONTAINER_INHERIT
        );
    }

    #[test]
    fn decodes_at_offset() {
        let mut buffer = vec![0xEE; 20];
        buffer.extend_from_slice(&TWO_ENTRY_ACL);
        let acl = AccessControlList::decode(ByteStreamView::new(&buffer), 20).unwrap();
        assert_eq!(acl, AccessControlList::from_bytes(&TWO_ENTRY_ACL).unwrap());
    }
}
