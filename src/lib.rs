// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # cdrcodec
//!
//! Binary codec for the CDR (Common Data Representation) family of
//! wire formats used by DDS/RTPS-style middleware: plain CDR,
//! XCDR1/XCDR2, and the Parameter-List and Delimited variants.
//!
//! The crate converts typed primitive values, strings, and homogeneous
//! sequences to and from byte buffers under strict alignment,
//! endianness, and extensibility rules, and can compute the exact
//! encoded size of a message before allocating its output buffer.
//!
//! ## Components
//!
//! - [`CdrReader`] - stateful cursor decoding an existing buffer
//! - [`CdrWriter`] - growable buffer encoding the same vocabulary
//! - [`CdrSizeCalculator`] - size precomputation for exact allocation
//! - [`EncapsulationKind`] - format identifier registry
//!
//! ## Example
//!
//! ```
//! use cdrcodec::{CdrReader, CdrSizeCalculator, CdrWriter, EncapsulationKind};
//!
//! # fn main() -> cdrcodec::Result<()> {
//! // Size the message ahead of allocation
//! let mut calc = CdrSizeCalculator::new();
//! calc.uint32();
//! calc.string("hello".len());
//!
//! let mut writer = CdrWriter::with_capacity(EncapsulationKind::CdrLe, calc.size());
//! writer.uint32(42)?.string("hello")?;
//! assert_eq!(writer.size(), calc.size());
//!
//! let mut reader = CdrReader::new(writer.data())?;
//! assert_eq!(reader.uint32()?, 42);
//! assert_eq!(reader.string()?, "hello");
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

pub use core::{CdrError, Result};

// Codec implementation
pub mod cdr;

pub use cdr::{
    CdrReader, CdrSizeCalculator, CdrWriter, EmHeader, EncapsulationKind, CDR_HEADER_SIZE,
};
