//! # Windows NT security descriptor decoding for Rust
//!
//! Decodes self-relative `SECURITY_DESCRIPTOR` blobs, as found in NTFS `$Secure`
//! streams, registry hives and event logs, into an owned value tree, without
//! needing a Windows host.
//!
//! The crate provides:
//! - [`SecurityDescriptor`]: control flags, owner and group SIDs, system and
//!   discretionary ACLs.
//! - [`AccessControlList`] and [`AccessControlEntry`]: ACLs and their entries,
//!   including object and callback ACE bodies.
//! - [`SecurityIdentifier`]: a `Copy` SID with its canonical
//!   `S-1-<authority>-<sub>...` rendering ([`format_sid`]).
//! - [`well_known`]: constants for common SIDs.
//! - (feature `macro`) `sid!`: SID literals checked at compile time.
//!
//! ## Decoding
//! Every decoder validates sizes and offsets against the input and fails with
//! a [`DecodeError`] instead of panicking. Decoding is all-or-nothing: a
//! single bad nested structure fails the whole descriptor.
//!
//! ```rust
//! use win_security_descriptor::{decode_security_descriptor, well_known, AceType};
//!
//! let bytes: [u8; 60] = [
//!     0x01, 0x00, 0x04, 0x80, // revision, control: SELF_RELATIVE | DACL_PRESENT
//!     0x30, 0x00, 0x00, 0x00, // owner offset
//!     0x00, 0x00, 0x00, 0x00, // no group
//!     0x00, 0x00, 0x00, 0x00, // no SACL
//!     0x14, 0x00, 0x00, 0x00, // DACL offset
//!     0x02, 0x00, 0x1c, 0x00, 0x01, 0x00, 0x00, 0x00, // ACL header, one entry
//!     0x00, 0x00, 0x14, 0x00, 0xff, 0x01, 0x1f, 0x00, // ACCESS_ALLOWED, mask
//!     0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x12, 0x00, 0x00, 0x00, // S-1-5-18
//!     0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x12, 0x00, 0x00, 0x00, // owner
//! ];
//! let sd = decode_security_descriptor(&bytes).unwrap();
//! assert_eq!(sd.owner(), Some(&well_known::LOCAL_SYSTEM));
//! let dacl = sd.discretionary_acl().unwrap();
//! assert_eq!(dacl.entries()[0].ace_type(), AceType::AccessAllowed);
//! assert_eq!(dacl.entries()[0].sid().to_string(), "S-1-5-18");
//! ```
//!
//! ## Logging
//! Decoders emit [`tracing`](https://docs.rs/tracing) events (`trace` per SID
//! and ACE, `debug` per ACL, descriptor and failure). No subscriber is
//! installed.
//!
//! ## No-std
//! Disable the default `std` feature to build with `core` and `alloc` only.

#![warn(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]

extern crate alloc;
// Lets `sid!` expand to `::win_security_descriptor::...` inside this crate too.
extern crate self as win_security_descriptor;

mod access_control_entry;
mod access_control_list;
mod error;
mod security_descriptor;
mod security_identifier;
mod sid_identifier_authority;
mod sid_string;
pub mod well_known;

use cfg_if::cfg_if;
use tracing::debug;

pub use access_control_entry::{
    ACE_HEADER_LEN, AccessControlEntry, AccessMask, AceFlags, AceType, ObjectAceData,
    ObjectAceFlags,
};
pub use access_control_list::{ACL_HEADER_LEN, AccessControlList};
pub use error::{
    DecodeError, DescriptorField, ErrorKind, MalformedReason, Structure, UnsupportedReason,
};
pub use security_descriptor::{
    ControlFlags, DecoderOptions, PresenceFlagPolicy, SECURITY_DESCRIPTOR_HEADER_LEN,
    SecurityDescriptor,
};
pub use security_identifier::SecurityIdentifier;
pub use sid_string::format_sid;

/// Object and inherited-object type GUIDs of object ACEs.
pub use uuid::Uuid;

/// Identifier authority component of a SID (6-byte value).
///
/// See also: [`SecurityIdentifier::identifier_authority`].
pub use sid_identifier_authority::SidIdentifierAuthority;

/// Bounds-checked reads over a borrowed buffer, used by the `decode` methods.
pub use parsing::{ByteCursor, ByteStreamView, InvalidSidFormat, OutOfBounds};

cfg_if! {
    if #[cfg(feature = "serde")] {
        mod serde_impl;
    }
}

/// Builds a [`SecurityIdentifier`] from its string form at compile time.
///
/// ```rust
/// use win_security_descriptor::{sid, well_known};
/// assert_eq!(sid!("S-1-5-32-544"), well_known::BUILTIN_ADMINISTRATORS);
/// ```
#[cfg(feature = "macro")]
pub use sid_macro::sid;

/// Decodes a self-relative security descriptor with default options.
///
/// # Errors
/// See [`SecurityDescriptor::decode_with`].
#[inline]
pub fn decode_security_descriptor(bytes: &[u8]) -> Result<SecurityDescriptor, DecodeError> {
    SecurityDescriptor::decode(bytes)
}

/// Decodes a SID from the start of `bytes`; trailing bytes are ignored.
///
/// # Errors
/// See [`SecurityIdentifier::decode`].
///
/// # Examples
/// ```rust
/// # use win_security_descriptor::decode_security_identifier;
/// let sid = decode_security_identifier(&[1, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0]).unwrap();
/// assert_eq!(sid.to_string(), "S-1-1-0");
/// ```
#[inline]
pub fn decode_security_identifier(bytes: &[u8]) -> Result<SecurityIdentifier, DecodeError> {
    SecurityIdentifier::from_bytes(bytes).inspect_err(|err| {
        debug!(kind = %err.kind(), error = %err, len = bytes.len(), "security identifier decode failed");
    })
}
