// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Error types for CDR encoding and decoding.
//!
//! Two families of failures exist: malformed input (truncated buffers,
//! reserved parameter IDs, sentinel mismatches) and caller misuse
//! (out-of-range seeks, unencodable sizes). Both are fatal to the
//! current operation; no variant is recoverable mid-stream.

use thiserror::Error;

/// Errors that can occur while encoding or decoding CDR data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CdrError {
    /// Buffer too short for the requested read
    #[error("buffer too short: requested {requested} bytes at offset {cursor}, but only {available} available")]
    BufferTooShort {
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
        /// Cursor position when the error occurred
        cursor: usize,
    },

    /// Encapsulation kind byte is not one of the assigned values
    #[error("unrecognized encapsulation kind 0x{byte:02x}")]
    InvalidKind {
        /// The offending kind byte from the stream header
        byte: u8,
    },

    /// EMHEADER length code outside the supported range
    #[error("invalid length code {code} in member header at offset {offset}")]
    InvalidLengthCode {
        /// The 3-bit length code value
        code: u8,
        /// Offset of the header word
        offset: usize,
    },

    /// Explicit length code does not agree with the supplied object size
    #[error("length code {code} requires an object size of {expected}, got {actual}")]
    LengthCodeSizeMismatch {
        /// The requested length code
        code: u8,
        /// Size the code mandates
        expected: usize,
        /// Size the caller supplied
        actual: usize,
    },

    /// Value does not fit in an unsigned 32-bit wire field
    #[error("size {size} exceeds the maximum encodable value {max}")]
    ObjectSizeTooLarge {
        /// The unencodable size
        size: usize,
        /// Largest value the field can carry
        max: u64,
    },

    /// Member ID exceeds the 28-bit CDR2 ceiling
    #[error("member id {id} is too large, maximum is {max}")]
    MemberIdTooLarge {
        /// The offending member ID
        id: u32,
        /// Largest encodable member ID
        max: u32,
    },

    /// Parameter ID header uses a reserved or implementation-specific flag
    #[error("unsupported parameter id header 0x{id_header:04x}")]
    ReservedParameterId {
        /// The raw 16-bit ID field
        id_header: u16,
    },

    /// Sentinel PID found where a member header was expected
    #[error("expected a member header but found the sentinel PID at offset {offset}")]
    UnexpectedSentinel {
        /// Offset of the 16-bit ID field
        offset: usize,
    },

    /// Non-sentinel header found where the sentinel was expected
    #[error("expected sentinel PID 0x{expected:04x}, got 0x{actual:04x}")]
    SentinelMismatch {
        /// The reserved sentinel value
        expected: u16,
        /// The 16-bit field actually read
        actual: u16,
    },

    /// Delimiter header byte-order flag contradicts the stream header
    #[error("delimiter header at offset {offset} declares a different byte order; mid-stream endianness changes are unsupported")]
    EndiannessMismatch {
        /// Offset of the delimiter header word
        offset: usize,
    },

    /// Seek target outside the readable range
    #[error("seek target {target} is outside the readable range [4, {len})")]
    SeekOutOfRange {
        /// The requested absolute offset
        target: i64,
        /// Total buffer length
        len: usize,
    },

    /// Array or sequence length exceeded data bounds
    #[error("sequence of {length} elements at offset {position} exceeds buffer length {buffer_len}")]
    LengthExceeded {
        /// Element count that was requested
        length: usize,
        /// Position in the buffer
        position: usize,
        /// Buffer length
        buffer_len: usize,
    },

    /// String payload is not valid UTF-8
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 {
        /// Offset of the first string payload byte
        offset: usize,
    },
}

impl CdrError {
    /// Create a buffer too short error.
    pub fn buffer_too_short(requested: usize, available: usize, cursor: usize) -> Self {
        CdrError::BufferTooShort {
            requested,
            available,
            cursor,
        }
    }

    /// Create a length exceeded error.
    pub fn length_exceeded(length: usize, position: usize, buffer_len: usize) -> Self {
        CdrError::LengthExceeded {
            length,
            position,
            buffer_len,
        }
    }

    /// Create an object size error against the u32 field ceiling.
    pub fn size_over_u32(size: usize) -> Self {
        CdrError::ObjectSizeTooLarge {
            size,
            max: u64::from(u32::MAX),
        }
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CdrError>;
