//! Well-known SIDs definitions
//!
//! Source: <https://learn.microsoft.com/windows/win32/secauthz/well-known-sids>
//!
//! Handy when inspecting decoded descriptors, e.g. checking whether an owner
//! is `BUILTIN\Administrators` or which integrity level a mandatory label ACE
//! carries.

use crate::{SecurityIdentifier, SidIdentifierAuthority};

// ---- Basic Authorities ----

/// Null SID (S-1-0-0)
pub const NULL: SecurityIdentifier =
    SecurityIdentifier::from_array(SidIdentifierAuthority::NULL_AUTHORITY, [0]);

/// World SID (S-1-1-0)
pub const WORLD: SecurityIdentifier =
    SecurityIdentifier::from_array(SidIdentifierAuthority::SECURITY_WORLD_AUTHORITY, [0]);

/// Local SID (S-1-2-0)
pub const LOCAL: SecurityIdentifier =
    SecurityIdentifier::from_array(SidIdentifierAuthority::SECURITY_LOCAL_AUTHORITY, [0]);

/// Creator Owner SID (S-1-3-0)
pub const CREATOR_OWNER: SecurityIdentifier =
    SecurityIdentifier::from_array(SidIdentifierAuthority::SECURITY_CREATOR_AUTHORITY, [0]);

/// Creator Group SID (S-1-3-1)
pub const CREATOR_GROUP: SecurityIdentifier =
    SecurityIdentifier::from_array(SidIdentifierAuthority::SECURITY_CREATOR_AUTHORITY, [1]);

// ---- NT Authority (S-1-5) ----

/// Authenticated Users (S-1-5-11)
pub const AUTHENTICATED_USERS: SecurityIdentifier =
    SecurityIdentifier::from_array(SidIdentifierAuthority::NT_AUTHORITY, [11]);

/// Local System (S-1-5-18)
pub const LOCAL_SYSTEM: SecurityIdentifier =
    SecurityIdentifier::from_array(SidIdentifierAuthority::NT_AUTHORITY, [18]);

/// Local Service (S-1-5-19)
pub const LOCAL_SERVICE: SecurityIdentifier =
    SecurityIdentifier::from_array(SidIdentifierAuthority::NT_AUTHORITY, [19]);

/// Network Service (S-1-5-20)
pub const NETWORK_SERVICE: SecurityIdentifier =
    SecurityIdentifier::from_array(SidIdentifierAuthority::NT_AUTHORITY, [20]);

// ---- BUILTIN Domain (S-1-5-32) ----

/// BUILTIN\Administrators (S-1-5-32-544)
pub const BUILTIN_ADMINISTRATORS: SecurityIdentifier =
    SecurityIdentifier::from_array(SidIdentifierAuthority::NT_AUTHORITY, [32, 544]);

/// BUILTIN\Users (S-1-5-32-545)
pub const BUILTIN_USERS: SecurityIdentifier =
    SecurityIdentifier::from_array(SidIdentifierAuthority::NT_AUTHORITY, [32, 545]);

/// BUILTIN\Guests (S-1-5-32-546)
pub const BUILTIN_GUESTS: SecurityIdentifier =
    SecurityIdentifier::from_array(SidIdentifierAuthority::NT_AUTHORITY, [32, 546]);

/// BUILTIN\Power Users (S-1-5-32-547)
pub const BUILTIN_POWER_USERS: SecurityIdentifier =
    SecurityIdentifier::from_array(SidIdentifierAuthority::NT_AUTHORITY, [32, 547]);

// ---- Mandatory integrity levels (S-1-16) ----

/// Low Mandatory Level (S-1-16-4096)
pub const LOW_MANDATORY_LEVEL: SecurityIdentifier = SecurityIdentifier::from_array(
    SidIdentifierAuthority::SECURITY_MANDATORY_LABEL_AUTHORITY,
    [0x1000],
);

/// Medium Mandatory Level (S-1-16-8192)
pub const MEDIUM_MANDATORY_LEVEL: SecurityIdentifier = SecurityIdentifier::from_array(
    SidIdentifierAuthority::SECURITY_MANDATORY_LABEL_AUTHORITY,
    [0x2000],
);

/// High Mandatory Level (S-1-16-12288)
pub const HIGH_MANDATORY_LEVEL: SecurityIdentifier = SecurityIdentifier::from_array(
    SidIdentifierAuthority::SECURITY_MANDATORY_LABEL_AUTHORITY,
    [0x3000],
);

/// System Mandatory Level (S-1-16-16384)
pub const SYSTEM_MANDATORY_LEVEL: SecurityIdentifier = SecurityIdentifier::from_array(
    SidIdentifierAuthority::SECURITY_MANDATORY_LABEL_AUTHORITY,
    [0x4000],
);

#[cfg(all(test, feature = "macro"))]
mod test {
    use super::*;
    use crate::sid;

    const ADMINISTRATORS: SecurityIdentifier = sid!("S-1-5-32-544");

    #[test]
    fn sid_macro_expands_inside_the_crate() {
        assert_eq!(ADMINISTRATORS, BUILTIN_ADMINISTRATORS);
        assert_eq!(sid!("S-1-16-12288"), HIGH_MANDATORY_LEVEL);
        assert_eq!(
            sid!("S-1-5"),
            SecurityIdentifier::from_array::<0>(SidIdentifierAuthority::NT_AUTHORITY, [])
        );
    }
}
