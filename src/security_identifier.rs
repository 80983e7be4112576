use core::fmt::{self, Debug};
use core::str::FromStr;

use parsing::{
    ByteStreamView, InvalidSidFormat, MAX_SUB_AUTHORITY_COUNT, SID_HEADER_LEN, SID_REVISION,
    SidComponents,
};
use tracing::trace;

use crate::{DecodeError, MalformedReason, SidIdentifierAuthority, Structure};

const MAX_SUB_AUTHORITIES: usize = MAX_SUB_AUTHORITY_COUNT as usize;

/// A decoded Windows **Security Identifier** (SID).
///
/// The value is self-contained: sub-authorities are stored inline, so a SID
/// never refers back to the buffer it was decoded from and is `Copy`.
///
/// # Wire layout
/// | Offset | Field | Width |
/// |---|---|---|
/// | 0 | revision | 1 |
/// | 1 | sub-authority count | 1 |
/// | 2 | identifier authority (big-endian) | 6 |
/// | 8 | sub-authorities (little-endian) | 4 each |
///
/// # Examples
/// ```rust
/// # use win_security_descriptor::SecurityIdentifier;
/// // SID: S-1-5-32-544 (Administrators)
/// let bytes: [u8; 16] = [
///     1,    // Revision
///     2,    // SubAuthorityCount
///     0, 0, 0, 0, 0, 5, // IdentifierAuthority = NT AUTHORITY
///     32, 0, 0, 0,      // SubAuthority[0] = 32
///     32, 2, 0, 0       // SubAuthority[1] = 544 (0x220 little endian)
/// ];
/// let sid = SecurityIdentifier::from_bytes(&bytes).unwrap();
/// assert_eq!(sid.to_string(), "S-1-5-32-544");
/// assert_eq!(sid.wire_len(), 16);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SecurityIdentifier {
    revision: u8,
    sub_authority_count: u8,
    identifier_authority: SidIdentifierAuthority,
    // Slots past `sub_authority_count` are always zero so derived Eq/Hash hold.
    sub_authority: [u32; MAX_SUB_AUTHORITIES],
}

impl Debug for SecurityIdentifier {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({self})", stringify!(SecurityIdentifier))
    }
}

impl SecurityIdentifier {
    /// The only revision this crate decodes.
    pub const REVISION: u8 = SID_REVISION;

    /// Builds a SID from a fixed number of sub-authorities in a `const`
    /// context.
    ///
    /// `N` is checked at compile time against the 15 sub-authority limit.
    ///
    /// # Examples
    /// ```rust
    /// # use win_security_descriptor::{SecurityIdentifier, SidIdentifierAuthority};
    /// const ADMINS: SecurityIdentifier =
    ///     SecurityIdentifier::from_array(SidIdentifierAuthority::NT_AUTHORITY, [32, 544]);
    /// assert_eq!(ADMINS.to_string(), "S-1-5-32-544");
    /// ```
    #[inline]
    #[must_use]
    #[allow(
        clippy::indexing_slicing,
        clippy::cast_possible_truncation,
        reason = "N is bounded by the const assertion below"
    )]
    pub const fn from_array<const N: usize>(
        identifier_authority: SidIdentifierAuthority,
        sub_authority: [u32; N],
    ) -> Self {
        const {
            assert!(
                N <= MAX_SUB_AUTHORITIES,
                "a SID holds at most 15 sub-authorities"
            );
        }
        let mut slots = [0u32; MAX_SUB_AUTHORITIES];
        let mut i = 0;
        while i < N {
            slots[i] = sub_authority[i];
            i += 1;
        }
        Self {
            revision: SID_REVISION,
            sub_authority_count: N as u8,
            identifier_authority,
            sub_authority: slots,
        }
    }

    /// Creates a new `SecurityIdentifier` from parts, validating input.
    ///
    /// Returns `None` if more than 15 sub-authorities are given.
    ///
    /// # Examples
    /// ```rust
    /// # use win_security_descriptor::{SecurityIdentifier, SidIdentifierAuthority};
    /// let sid = SecurityIdentifier::try_new(
    ///     SidIdentifierAuthority::NT_AUTHORITY,
    ///     [32u32, 544u32]
    /// ).unwrap();
    /// assert_eq!(sid.revision(), 1);
    /// assert_eq!(sid.identifier_authority(), SidIdentifierAuthority::NT_AUTHORITY);
    /// assert_eq!(sid.sub_authorities(), [32u32, 544u32]);
    /// ```
    #[must_use]
    #[inline]
    pub fn try_new<I: Into<SidIdentifierAuthority>, S: AsRef<[u32]>>(
        identifier_authority: I,
        sub_authority: S,
    ) -> Option<Self> {
        let sub_authority = sub_authority.as_ref();
        let sub_authority_count = u8::try_from(sub_authority.len())
            .ok()
            .filter(|&count| count <= MAX_SUB_AUTHORITY_COUNT)?;
        let mut slots = [0u32; MAX_SUB_AUTHORITIES];
        slots
            .iter_mut()
            .zip(sub_authority)
            .for_each(|(slot, value)| *slot = *value);
        Some(Self {
            revision: SID_REVISION,
            sub_authority_count,
            identifier_authority: identifier_authority.into(),
            sub_authority: slots,
        })
    }

    /// Decodes the SID record starting at `offset` in `view`.
    ///
    /// Bytes after the record are ignored; the number of bytes the record
    /// occupies is [`SecurityIdentifier::wire_len`].
    ///
    /// # Errors
    /// - [`DecodeError::BufferTooSmall`] if the header or a sub-authority lies
    ///   past the end of `view`.
    /// - [`DecodeError::UnsupportedRevision`] if the revision is not 1.
    /// - [`DecodeError::MalformedInput`] if more than 15 sub-authorities are
    ///   declared.
    #[inline]
    pub fn decode(view: ByteStreamView<'_>, offset: usize) -> Result<Self, DecodeError> {
        let mut cursor = view.cursor_at(offset);
        let [revision, count, authority @ ..] = cursor.read_array::<SID_HEADER_LEN>()?;
        if revision != SID_REVISION {
            return Err(DecodeError::UnsupportedRevision {
                structure: Structure::SecurityIdentifier,
                revision,
            });
        }
        if count > MAX_SUB_AUTHORITY_COUNT {
            return Err(MalformedReason::TooManySubAuthorities { count }.into());
        }

        let mut sub_authority = [0u32; MAX_SUB_AUTHORITIES];
        for slot in sub_authority.iter_mut().take(usize::from(count)) {
            *slot = cursor.read_u32_le()?;
        }

        let sid = Self {
            revision,
            sub_authority_count: count,
            identifier_authority: SidIdentifierAuthority::new(authority),
            sub_authority,
        };
        trace!(offset, wire_len = sid.wire_len(), sid = %sid, "decoded security identifier");
        Ok(sid)
    }

    /// Decodes a SID from the start of `bytes`.
    ///
    /// # Errors
    /// See [`SecurityIdentifier::decode`].
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::decode(ByteStreamView::new(bytes), 0)
    }

    /// The SID revision, always 1 for a decoded SID.
    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u8 {
        self.revision
    }

    /// Number of sub-authorities.
    #[inline]
    #[must_use]
    pub const fn sub_authority_count(&self) -> u8 {
        self.sub_authority_count
    }

    /// The identifier authority.
    #[inline]
    #[must_use]
    pub const fn identifier_authority(&self) -> SidIdentifierAuthority {
        self.identifier_authority
    }

    /// The sub-authorities in wire order.
    #[inline]
    #[must_use]
    pub fn sub_authorities(&self) -> &[u32] {
        self.sub_authority
            .get(..usize::from(self.sub_authority_count))
            .unwrap_or_default()
    }

    /// The relative identifier: the last sub-authority, if any.
    ///
    /// ```rust
    /// # use win_security_descriptor::well_known;
    /// assert_eq!(well_known::BUILTIN_ADMINISTRATORS.rid(), Some(544));
    /// ```
    #[inline]
    #[must_use]
    pub fn rid(&self) -> Option<u32> {
        self.sub_authorities().last().copied()
    }

    /// Bytes the SID occupies on the wire: `8 + 4 * sub_authority_count`.
    #[inline]
    #[must_use]
    pub const fn wire_len(&self) -> usize {
        SID_HEADER_LEN + 4 * self.sub_authority_count as usize
    }
}

impl TryFrom<&[u8]> for SecurityIdentifier {
    type Error = DecodeError;

    #[inline]
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(value)
    }
}

impl FromStr for SecurityIdentifier {
    type Err = InvalidSidFormat;

    /// Parses the canonical `S-1-<authority>-<sub>...` form.
    ///
    /// Only revision 1 is accepted; the authority may also be written in the
    /// `0x`-prefixed hexadecimal form Windows uses for large values.
    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components = SidComponents::from_str(s)?;
        if components.revision != SID_REVISION {
            return Err(InvalidSidFormat);
        }
        Self::try_new(
            components.identifier_authority,
            components.sub_authority.as_slice(),
        )
        .ok_or(InvalidSidFormat)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
pub(crate) mod test {
    use super::*;
    use crate::ErrorKind;
    use crate::sid_identifier_authority::test::arb_identifier_authority;
    use crate::well_known;
    use proptest::prelude::*;

    /// S-1-5-21-623811015-3229964156-30300820-1013
    pub(crate) const DOMAIN_USER_SID: [u8; 28] = [
        0x01, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x15, 0x00, 0x00, 0x00, 0xc7, 0x99, 0x2e,
        0x25, 0x7c, 0x57, 0x85, 0xc0, 0x94, 0x5a, 0xce, 0x01, 0xf5, 0x03, 0x00, 0x00,
    ];

    pub fn arb_security_identifier() -> impl Strategy<Value = SecurityIdentifier> {
        (
            arb_identifier_authority(),
            proptest::collection::vec(any::<u32>(), 0..=15),
        )
            .prop_map(|(identifier_authority, sub_authorities)| {
                SecurityIdentifier::try_new(identifier_authority, sub_authorities).unwrap()
            })
    }

    /// Wire bytes of `sid`, for building test inputs.
    pub fn sid_bytes(sid: &SecurityIdentifier) -> Vec<u8> {
        let mut bytes = vec![sid.revision(), sid.sub_authority_count()];
        bytes.extend_from_slice(&sid.identifier_authority().value);
        for sub in sid.sub_authorities() {
            bytes.extend_from_slice(&sub.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn decodes_domain_user_sid() {
        let sid = SecurityIdentifier::from_bytes(&DOMAIN_USER_SID).unwrap();
        assert_eq!(sid.revision(), 1);
        assert_eq!(sid.sub_authority_count(), 5);
        assert_eq!(sid.identifier_authority().as_u64(), 5);
        assert_eq!(
            sid.sub_authorities(),
            [21, 623_811_015, 3_229_964_156, 30_300_820, 1013]
        );
        assert_eq!(sid.rid(), Some(1013));
        assert_eq!(sid.wire_len(), DOMAIN_USER_SID.len());
    }

    #[test]
    fn decodes_at_offset_and_ignores_trailing_bytes() {
        let mut buffer = vec![0xAA; 3];
        buffer.extend_from_slice(&DOMAIN_USER_SID);
        buffer.extend_from_slice(&[0xBB; 5]);
        let sid = SecurityIdentifier::decode(ByteStreamView::new(&buffer), 3).unwrap();
        assert_eq!(sid, SecurityIdentifier::from_bytes(&DOMAIN_USER_SID).unwrap());
    }

    #[test]
    fn truncated_header_is_buffer_too_small() {
        for len in 0..SID_HEADER_LEN {
            let err = SecurityIdentifier::from_bytes(&DOMAIN_USER_SID[..len]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BufferTooSmall, "length {len}");
        }
    }

    #[test]
    fn truncated_sub_authorities_is_buffer_too_small() {
        let err = SecurityIdentifier::from_bytes(&DOMAIN_USER_SID[..27]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::BufferTooSmall {
                offset: 24,
                needed: 4,
                available: 27
            }
        );
    }

    #[test]
    fn rejects_other_revisions() {
        let mut bytes = DOMAIN_USER_SID;
        for revision in [0u8, 2, 0xFF] {
            bytes[0] = revision;
            assert_eq!(
                SecurityIdentifier::from_bytes(&bytes),
                Err(DecodeError::UnsupportedRevision {
                    structure: Structure::SecurityIdentifier,
                    revision
                })
            );
        }
    }

    #[test]
    fn rejects_more_than_fifteen_sub_authorities() {
        let mut bytes = vec![1, 16, 0, 0, 0, 0, 0, 5];
        bytes.resize(8 + 16 * 4, 0);
        assert_eq!(
            SecurityIdentifier::from_bytes(&bytes),
            Err(MalformedReason::TooManySubAuthorities { count: 16 }.into())
        );
    }

    #[test]
    fn zero_sub_authorities_is_valid() {
        let sid = SecurityIdentifier::from_bytes(&[1, 0, 0, 0, 0, 0, 0, 5]).unwrap();
        assert!(sid.sub_authorities().is_empty());
        assert_eq!(sid.rid(), None);
        assert_eq!(sid.wire_len(), 8);
    }

    #[test]
    fn from_str_rejects_other_revisions() {
        assert_eq!("S-2-5-32".parse::<SecurityIdentifier>(), Err(InvalidSidFormat));
    }

    #[test]
    fn try_new_rejects_sixteen_sub_authorities() {
        assert!(SecurityIdentifier::try_new(SidIdentifierAuthority::NT_AUTHORITY, [0u32; 16]).is_none());
    }

    #[test]
    fn test_debug() {
        assert_eq!(
            format!("{:?}", well_known::NULL),
            format!("{:}(S-1-0-0)", stringify!(SecurityIdentifier)),
        );
    }

    proptest! {
        #[test]
        fn decode_matches_wire_bytes(sid in arb_security_identifier()) {
            let bytes = sid_bytes(&sid);
            let decoded = SecurityIdentifier::from_bytes(&bytes).unwrap();
            prop_assert_eq!(decoded, sid);
            prop_assert_eq!(decoded.wire_len(), bytes.len());
        }

        #[test]
        fn decode_is_deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..80)) {
            let first = SecurityIdentifier::from_bytes(&bytes);
            let second = SecurityIdentifier::from_bytes(&bytes);
            prop_assert_eq!(first, second);
            if let Ok(sid) = first {
                prop_assert_eq!(sid.to_string(), second.unwrap().to_string());
            }
        }

        #[test]
        fn sid_to_string_from_string(sid in arb_security_identifier()) {
            let parsed: SecurityIdentifier = sid.to_string().parse().unwrap();
            prop_assert_eq!(parsed, sid);
        }
    }
}
