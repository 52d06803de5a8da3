// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Encapsulation kind registry for the CDR stream header.
//!
//! Kind byte assignments follow DDS-XTypes 1.2 §7.4.3.4 ("Functions
//! related to data types and objects"); the CDR2 values are the decimal
//! interpretation verified against RTI Connext (0x11 in the table text
//! means decimal 11).

use crate::core::{CdrError, Result};

/// Size of the CDR encapsulation header (4 bytes).
///
/// Layout: `[reserved = 0x00][kind byte][u16 options, always 0]`.
pub const CDR_HEADER_SIZE: usize = 4;

/// CDR encapsulation kind.
///
/// A one-byte tag fixing, for the whole stream: the CDR major version
/// (1 or 2), the byte order, and the structural style (plain,
/// parameter-list, or delimited). None of these may change mid-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum EncapsulationKind {
    /// Plain CDR, big-endian
    CdrBe = 0,
    /// Plain CDR, little-endian
    #[default]
    CdrLe = 1,
    /// Parameter List CDR, big-endian
    PlCdrBe = 2,
    /// Parameter List CDR, little-endian
    PlCdrLe = 3,
    /// Plain CDR2, big-endian
    Cdr2Be = 10,
    /// Plain CDR2, little-endian
    Cdr2Le = 11,
    /// Parameter List CDR2, big-endian
    PlCdr2Be = 12,
    /// Parameter List CDR2, little-endian
    PlCdr2Le = 13,
    /// Delimited CDR2, big-endian
    DelimitedCdr2Be = 14,
    /// Delimited CDR2, little-endian
    DelimitedCdr2Le = 15,
}

impl EncapsulationKind {
    /// Check if this kind uses CDR2 (XCDR2) serialization rules.
    ///
    /// Every kind byte above the highest version-1 kind is version 2.
    #[must_use]
    pub const fn is_version2(self) -> bool {
        self as u8 > EncapsulationKind::PlCdrLe as u8
    }

    /// Check if this kind uses little-endian byte order.
    #[must_use]
    pub const fn is_little_endian(self) -> bool {
        matches!(
            self,
            Self::CdrLe | Self::PlCdrLe | Self::Cdr2Le | Self::PlCdr2Le | Self::DelimitedCdr2Le
        )
    }

    /// Check if aggregated payloads are prefixed with a delimiter header.
    ///
    /// True for delimited and mutable (parameter-list) CDR2 kinds.
    #[must_use]
    pub const fn uses_delimiter_header(self) -> bool {
        matches!(
            self,
            Self::DelimitedCdr2Be | Self::DelimitedCdr2Le | Self::PlCdr2Be | Self::PlCdr2Le
        )
    }

    /// Check if struct members carry per-member EMHEADERs.
    ///
    /// True for mutable kinds in both CDR versions.
    #[must_use]
    pub const fn uses_member_header(self) -> bool {
        matches!(
            self,
            Self::PlCdrBe | Self::PlCdrLe | Self::PlCdr2Be | Self::PlCdr2Le
        )
    }

    /// Alignment applied to 64-bit values under this kind.
    ///
    /// CDR1 aligns 64-bit values to 8 bytes, CDR2 to 4. The byte width
    /// is 8 either way.
    #[must_use]
    pub const fn eight_byte_alignment(self) -> usize {
        if self.is_version2() {
            4
        } else {
            8
        }
    }
}

impl TryFrom<u8> for EncapsulationKind {
    type Error = CdrError;

    /// Resolve a stream-header kind byte.
    ///
    /// Reserved or unassigned values fail fast; there is no default.
    fn try_from(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(Self::CdrBe),
            1 => Ok(Self::CdrLe),
            2 => Ok(Self::PlCdrBe),
            3 => Ok(Self::PlCdrLe),
            10 => Ok(Self::Cdr2Be),
            11 => Ok(Self::Cdr2Le),
            12 => Ok(Self::PlCdr2Be),
            13 => Ok(Self::PlCdr2Le),
            14 => Ok(Self::DelimitedCdr2Be),
            15 => Ok(Self::DelimitedCdr2Le),
            _ => Err(CdrError::InvalidKind { byte }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [EncapsulationKind; 10] = [
        EncapsulationKind::CdrBe,
        EncapsulationKind::CdrLe,
        EncapsulationKind::PlCdrBe,
        EncapsulationKind::PlCdrLe,
        EncapsulationKind::Cdr2Be,
        EncapsulationKind::Cdr2Le,
        EncapsulationKind::PlCdr2Be,
        EncapsulationKind::PlCdr2Le,
        EncapsulationKind::DelimitedCdr2Be,
        EncapsulationKind::DelimitedCdr2Le,
    ];

    #[test]
    fn test_kind_byte_round_trip() {
        for kind in ALL_KINDS {
            assert_eq!(EncapsulationKind::try_from(kind as u8).unwrap(), kind);
        }
    }

    #[test]
    fn test_reserved_bytes_rejected() {
        for byte in [4u8, 5, 6, 7, 8, 9, 16, 0x11, 0xff] {
            assert_eq!(
                EncapsulationKind::try_from(byte),
                Err(CdrError::InvalidKind { byte })
            );
        }
    }

    #[test]
    fn test_version_split() {
        assert!(!EncapsulationKind::CdrBe.is_version2());
        assert!(!EncapsulationKind::PlCdrLe.is_version2());
        assert!(EncapsulationKind::Cdr2Be.is_version2());
        assert!(EncapsulationKind::DelimitedCdr2Le.is_version2());
    }

    #[test]
    fn test_endianness() {
        for kind in ALL_KINDS {
            // The LE variants are exactly the odd kind bytes.
            assert_eq!(kind.is_little_endian(), (kind as u8) % 2 == 1);
        }
    }

    #[test]
    fn test_delimiter_header_usage() {
        assert!(EncapsulationKind::DelimitedCdr2Le.uses_delimiter_header());
        assert!(EncapsulationKind::PlCdr2Be.uses_delimiter_header());
        assert!(!EncapsulationKind::PlCdrLe.uses_delimiter_header());
        assert!(!EncapsulationKind::Cdr2Le.uses_delimiter_header());
    }

    #[test]
    fn test_member_header_usage() {
        assert!(EncapsulationKind::PlCdrBe.uses_member_header());
        assert!(EncapsulationKind::PlCdr2Le.uses_member_header());
        assert!(!EncapsulationKind::CdrLe.uses_member_header());
        assert!(!EncapsulationKind::DelimitedCdr2Be.uses_member_header());
    }

    #[test]
    fn test_eight_byte_alignment() {
        assert_eq!(EncapsulationKind::CdrLe.eight_byte_alignment(), 8);
        assert_eq!(EncapsulationKind::PlCdrBe.eight_byte_alignment(), 8);
        assert_eq!(EncapsulationKind::Cdr2Le.eight_byte_alignment(), 4);
        assert_eq!(EncapsulationKind::PlCdr2Be.eight_byte_alignment(), 4);
    }

    #[test]
    fn test_default_is_plain_little_endian() {
        let kind = EncapsulationKind::default();
        assert_eq!(kind, EncapsulationKind::CdrLe);
        assert!(kind.is_little_endian());
        assert!(!kind.is_version2());
    }
}
