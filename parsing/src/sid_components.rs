use core::str::FromStr;

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::{MAX_SUB_AUTHORITY_COUNT, authority_from_u64};

/// The parts of a SID written as `S-<revision>-<authority>-<sub1>-...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidComponents {
    /// The SID revision value, generally 1.
    pub revision: u8,
    /// The SID identifier authority, big-endian.
    pub identifier_authority: [u8; 6],
    /// The SID sub-authority values.
    pub sub_authority: ArrayVec<u32, { MAX_SUB_AUTHORITY_COUNT as usize }>,
}

/// Error returned when a SID string is not in the `S-R-I-S...` form.
///
/// This is used by `FromStr` for SID types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid format for SID string")]
pub struct InvalidSidFormat;

fn parse_authority(s: &str) -> Result<[u8; 6], InvalidSidFormat> {
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    }
    .map_err(|_| InvalidSidFormat)?;
    authority_from_u64(value).ok_or(InvalidSidFormat)
}

fn parse_decimal<T: FromStr>(s: &str) -> Result<T, InvalidSidFormat> {
    // `u32::from_str` accepts a leading '+', SID strings never carry one.
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidSidFormat);
    }
    s.parse::<T>().map_err(|_| InvalidSidFormat)
}

impl FromStr for SidComponents {
    type Err = InvalidSidFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('-');
        if !parts
            .next()
            .is_some_and(|head| head.eq_ignore_ascii_case("s"))
        {
            return Err(InvalidSidFormat);
        }
        let revision = parse_decimal::<u8>(parts.next().ok_or(InvalidSidFormat)?)?;
        let identifier_authority = parse_authority(parts.next().ok_or(InvalidSidFormat)?)?;

        let mut sub_authority = ArrayVec::new();
        for part in parts {
            let value = parse_decimal::<u32>(part)?;
            sub_authority.try_push(value).map_err(|_| InvalidSidFormat)?;
        }

        Ok(Self {
            revision,
            identifier_authority,
            sub_authority,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;

    #[test]
    fn parses_builtin_administrators() {
        let sid: SidComponents = "S-1-5-32-544".parse().unwrap();
        assert_eq!(sid.revision, 1);
        assert_eq!(sid.identifier_authority, [0, 0, 0, 0, 0, 5]);
        assert_eq!(sid.sub_authority.as_slice(), &[32, 544]);
    }

    #[test]
    fn accepts_lowercase_prefix_and_hex_authority() {
        let sid: SidComponents = "s-1-0x1F2E3D4C5B6A-7".parse().unwrap();
        assert_eq!(
            sid.identifier_authority,
            [0x1F, 0x2E, 0x3D, 0x4C, 0x5B, 0x6A]
        );
        assert_eq!(sid.sub_authority.as_slice(), &[7]);
    }

    #[test]
    fn accepts_no_sub_authority() {
        let sid: SidComponents = "S-1-5".parse().unwrap();
        assert!(sid.sub_authority.is_empty());
    }

    #[test]
    fn rejects_malformed_strings() {
        for input in [
            "",
            "S",
            "S-1",
            "X-1-5-32",
            "S-1-5-",
            "S-1-5--32",
            "S-1-5-+32",
            "S-256-5-32",
            "S-1-281474976710656-1",
            "S-1-5-4294967296",
            "S-1-5-1-2-3-4-5-6-7-8-9-10-11-12-13-14-15-16",
        ] {
            assert_eq!(
                input.parse::<SidComponents>(),
                Err(InvalidSidFormat),
                "{input:?} should be rejected"
            );
        }
    }
}
