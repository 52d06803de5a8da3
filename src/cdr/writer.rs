// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR writer for encoding CDR data into a growable buffer.
//!
//! Mirrors the reader's alignment, width, and byte-order rules
//! exactly; the two must agree byte-for-byte on every encoding
//! decision, including header placement and origin resets.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::trace;

use super::encapsulation::{EncapsulationKind, CDR_HEADER_SIZE};
use super::length_code::{
    length_code_for_object_size, object_size_for_length_code, DHEADER_ENDIANNESS_FLAG,
    EMHEADER_FLAG_MUST_UNDERSTAND, EMHEADER_ID_MASK, EMHEADER_LENGTH_CODE_SHIFT,
    PID_COMPACT_ID_MAX, PID_EXTENDED, PID_EXTENDED_BODY_LENGTH, PID_FLAG_MUST_UNDERSTAND,
    PID_SENTINEL,
};
use crate::core::{CdrError, Result};

/// Default initial capacity for the backing buffer.
const DEFAULT_CAPACITY: usize = 16;

/// Minimum element count before a matching-order array write switches
/// from element-wise serialization to a single aligned bulk copy.
const BUFFER_COPY_THRESHOLD: usize = 10;

/// CDR writer over a growable, exclusively owned byte buffer.
///
/// The 4-byte stream header is written at construction; every write
/// thereafter appends at the current offset, padding as the stream's
/// alignment rules require. The backing buffer grows geometrically and
/// growth preserves previously written bytes. Views obtained from
/// [`data()`](Self::data) are invalidated by any subsequent write, so
/// callers must not hold them across encode operations.
///
/// # Example
///
/// ```
/// use cdrcodec::CdrWriter;
///
/// # fn main() -> cdrcodec::Result<()> {
/// let mut writer = CdrWriter::new();
/// writer.int32(42)?.string("hello")?;
/// assert_eq!(writer.size(), 18);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CdrWriter {
    /// Backing buffer; `buffer.len()` is capacity, `offset` is logical length
    buffer: Vec<u8>,
    /// Current write position
    offset: usize,
    /// Origin for alignment calculation
    origin: usize,
    /// Encapsulation kind written to the stream header
    kind: EncapsulationKind,
    /// Whether the stream uses little-endian byte order
    little_endian: bool,
    /// Alignment of 64-bit values (8 for CDR1, 4 for CDR2)
    eight_byte_alignment: usize,
}

impl Default for CdrWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CdrWriter {
    /// Create a writer with the default kind (plain CDR, little-endian).
    #[must_use]
    pub fn new() -> Self {
        Self::with_kind(EncapsulationKind::default())
    }

    /// Create a writer for the given encapsulation kind.
    #[must_use]
    pub fn with_kind(kind: EncapsulationKind) -> Self {
        Self::init(kind, Vec::with_capacity(DEFAULT_CAPACITY))
    }

    /// Create a writer with a preallocated capacity.
    ///
    /// Pair with [`CdrSizeCalculator`](crate::CdrSizeCalculator) to
    /// size the buffer exactly and avoid the growth path entirely.
    #[must_use]
    pub fn with_capacity(kind: EncapsulationKind, capacity: usize) -> Self {
        Self::init(kind, Vec::with_capacity(capacity))
    }

    /// Create a writer reusing a caller-owned allocation.
    ///
    /// The buffer's contents are discarded; only its capacity is kept.
    #[must_use]
    pub fn with_buffer(kind: EncapsulationKind, buffer: Vec<u8>) -> Self {
        Self::init(kind, buffer)
    }

    fn init(kind: EncapsulationKind, mut buffer: Vec<u8>) -> Self {
        buffer.clear();
        buffer.push(0); // reserved
        buffer.push(kind as u8);
        buffer.push(0); // options, unused
        buffer.push(0);
        Self {
            buffer,
            offset: CDR_HEADER_SIZE,
            origin: CDR_HEADER_SIZE,
            little_endian: kind.is_little_endian(),
            eight_byte_alignment: kind.eight_byte_alignment(),
            kind,
        }
    }

    /// Get the encapsulation kind of the stream.
    #[must_use]
    pub const fn kind(&self) -> EncapsulationKind {
        self.kind
    }

    /// Get the logical length of the encoded data.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.offset
    }

    /// Get a view of the bytes written so far.
    ///
    /// Invalidated by any subsequent write that grows the buffer.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.buffer[..self.offset]
    }

    /// Consume the writer and return the encoded bytes.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        let mut buffer = self.buffer;
        buffer.truncate(self.offset);
        buffer
    }

    /// Reset for a new message, keeping the allocation and kind.
    pub fn reset(&mut self) {
        self.offset = CDR_HEADER_SIZE;
        self.origin = CDR_HEADER_SIZE;
    }

    /// Write an 8-bit signed integer. Never aligned.
    pub fn int8(&mut self, value: i8) -> Result<&mut Self> {
        self.uint8(value as u8)
    }

    /// Write an 8-bit unsigned integer. Never aligned.
    pub fn uint8(&mut self, value: u8) -> Result<&mut Self> {
        self.reserve(1);
        self.buffer[self.offset] = value;
        self.offset += 1;
        Ok(self)
    }

    /// Write a 16-bit signed integer.
    pub fn int16(&mut self, value: i16) -> Result<&mut Self> {
        self.align(2, 2);
        let mut bytes = [0u8; 2];
        if self.little_endian {
            LittleEndian::write_i16(&mut bytes, value);
        } else {
            BigEndian::write_i16(&mut bytes, value);
        }
        self.put(&bytes);
        Ok(self)
    }

    /// Write a 16-bit unsigned integer.
    pub fn uint16(&mut self, value: u16) -> Result<&mut Self> {
        self.align(2, 2);
        let mut bytes = [0u8; 2];
        if self.little_endian {
            LittleEndian::write_u16(&mut bytes, value);
        } else {
            BigEndian::write_u16(&mut bytes, value);
        }
        self.put(&bytes);
        Ok(self)
    }

    /// Write a 32-bit signed integer.
    pub fn int32(&mut self, value: i32) -> Result<&mut Self> {
        self.align(4, 4);
        let mut bytes = [0u8; 4];
        if self.little_endian {
            LittleEndian::write_i32(&mut bytes, value);
        } else {
            BigEndian::write_i32(&mut bytes, value);
        }
        self.put(&bytes);
        Ok(self)
    }

    /// Write a 32-bit unsigned integer.
    pub fn uint32(&mut self, value: u32) -> Result<&mut Self> {
        self.align(4, 4);
        let mut bytes = [0u8; 4];
        if self.little_endian {
            LittleEndian::write_u32(&mut bytes, value);
        } else {
            BigEndian::write_u32(&mut bytes, value);
        }
        self.put(&bytes);
        Ok(self)
    }

    /// Write a 64-bit signed integer.
    pub fn int64(&mut self, value: i64) -> Result<&mut Self> {
        self.align(self.eight_byte_alignment, 8);
        let mut bytes = [0u8; 8];
        if self.little_endian {
            LittleEndian::write_i64(&mut bytes, value);
        } else {
            BigEndian::write_i64(&mut bytes, value);
        }
        self.put(&bytes);
        Ok(self)
    }

    /// Write a 64-bit unsigned integer.
    pub fn uint64(&mut self, value: u64) -> Result<&mut Self> {
        self.align(self.eight_byte_alignment, 8);
        let mut bytes = [0u8; 8];
        if self.little_endian {
            LittleEndian::write_u64(&mut bytes, value);
        } else {
            BigEndian::write_u64(&mut bytes, value);
        }
        self.put(&bytes);
        Ok(self)
    }

    /// Write a 16-bit unsigned integer in big-endian order, regardless
    /// of the stream's declared byte order.
    pub fn uint16_be(&mut self, value: u16) -> Result<&mut Self> {
        self.align(2, 2);
        self.put(&value.to_be_bytes());
        Ok(self)
    }

    /// Write a 32-bit unsigned integer in big-endian order.
    pub fn uint32_be(&mut self, value: u32) -> Result<&mut Self> {
        self.align(4, 4);
        self.put(&value.to_be_bytes());
        Ok(self)
    }

    /// Write a 64-bit unsigned integer in big-endian order.
    pub fn uint64_be(&mut self, value: u64) -> Result<&mut Self> {
        self.align(self.eight_byte_alignment, 8);
        self.put(&value.to_be_bytes());
        Ok(self)
    }

    /// Write a 32-bit float.
    pub fn float32(&mut self, value: f32) -> Result<&mut Self> {
        self.align(4, 4);
        let mut bytes = [0u8; 4];
        if self.little_endian {
            LittleEndian::write_f32(&mut bytes, value);
        } else {
            BigEndian::write_f32(&mut bytes, value);
        }
        self.put(&bytes);
        Ok(self)
    }

    /// Write a 64-bit double.
    pub fn float64(&mut self, value: f64) -> Result<&mut Self> {
        self.align(self.eight_byte_alignment, 8);
        let mut bytes = [0u8; 8];
        if self.little_endian {
            LittleEndian::write_f64(&mut bytes, value);
        } else {
            BigEndian::write_f64(&mut bytes, value);
        }
        self.put(&bytes);
        Ok(self)
    }

    /// Write a length-prefixed, NUL-terminated string.
    ///
    /// The length field is `byte length + 1` for the terminator; no
    /// alignment is applied beyond the length field's own.
    pub fn string(&mut self, value: &str) -> Result<&mut Self> {
        let strlen = value.len();
        let prefixed = u32::try_from(strlen + 1).map_err(|_| CdrError::size_over_u32(strlen))?;
        self.uint32(prefixed)?;
        self.reserve(strlen + 1);
        self.buffer[self.offset..self.offset + strlen].copy_from_slice(value.as_bytes());
        self.buffer[self.offset + strlen] = 0;
        self.offset += strlen + 1;
        Ok(self)
    }

    /// Write a sequence length (element count of an upcoming sequence).
    pub fn sequence_length(&mut self, count: usize) -> Result<&mut Self> {
        let value = u32::try_from(count).map_err(|_| CdrError::size_over_u32(count))?;
        self.uint32(value)
    }

    /// Write an array of 8-bit signed integers.
    pub fn int8_array(&mut self, values: &[i8], write_length: bool) -> Result<&mut Self> {
        if write_length {
            self.sequence_length(values.len())?;
        }
        let bytes: &[u8] = bytemuck::cast_slice(values);
        self.reserve(bytes.len());
        self.put(bytes);
        Ok(self)
    }

    /// Write an array of 8-bit unsigned integers.
    pub fn uint8_array(&mut self, values: &[u8], write_length: bool) -> Result<&mut Self> {
        if write_length {
            self.sequence_length(values.len())?;
        }
        self.reserve(values.len());
        self.put(values);
        Ok(self)
    }

    /// Write an array of 16-bit signed integers.
    pub fn int16_array(&mut self, values: &[i16], write_length: bool) -> Result<&mut Self> {
        self.numeric_array(values, 2, write_length, Self::int16)?;
        Ok(self)
    }

    /// Write an array of 16-bit unsigned integers.
    pub fn uint16_array(&mut self, values: &[u16], write_length: bool) -> Result<&mut Self> {
        self.numeric_array(values, 2, write_length, Self::uint16)?;
        Ok(self)
    }

    /// Write an array of 32-bit signed integers.
    pub fn int32_array(&mut self, values: &[i32], write_length: bool) -> Result<&mut Self> {
        self.numeric_array(values, 4, write_length, Self::int32)?;
        Ok(self)
    }

    /// Write an array of 32-bit unsigned integers.
    pub fn uint32_array(&mut self, values: &[u32], write_length: bool) -> Result<&mut Self> {
        self.numeric_array(values, 4, write_length, Self::uint32)?;
        Ok(self)
    }

    /// Write an array of 64-bit signed integers.
    pub fn int64_array(&mut self, values: &[i64], write_length: bool) -> Result<&mut Self> {
        self.numeric_array(values, self.eight_byte_alignment, write_length, Self::int64)?;
        Ok(self)
    }

    /// Write an array of 64-bit unsigned integers.
    pub fn uint64_array(&mut self, values: &[u64], write_length: bool) -> Result<&mut Self> {
        self.numeric_array(values, self.eight_byte_alignment, write_length, Self::uint64)?;
        Ok(self)
    }

    /// Write an array of 32-bit floats.
    pub fn float32_array(&mut self, values: &[f32], write_length: bool) -> Result<&mut Self> {
        self.numeric_array(values, 4, write_length, Self::float32)?;
        Ok(self)
    }

    /// Write an array of 64-bit doubles.
    pub fn float64_array(&mut self, values: &[f64], write_length: bool) -> Result<&mut Self> {
        self.numeric_array(values, self.eight_byte_alignment, write_length, Self::float64)?;
        Ok(self)
    }

    /// Write a delimiter header (DHEADER) carrying the payload size.
    ///
    /// CDR2 streams use the full 32-bit word. Version-1 streams use
    /// the legacy combined form: the top bit carries the stream's own
    /// byte order and the low 31 bits the size.
    pub fn d_header(&mut self, object_size: usize) -> Result<&mut Self> {
        let size = u32::try_from(object_size).map_err(|_| CdrError::size_over_u32(object_size))?;
        if self.kind.is_version2() {
            return self.uint32(size);
        }
        if size & DHEADER_ENDIANNESS_FLAG != 0 {
            return Err(CdrError::ObjectSizeTooLarge {
                size: object_size,
                max: u64::from(!DHEADER_ENDIANNESS_FLAG),
            });
        }
        let flag = if self.little_endian {
            DHEADER_ENDIANNESS_FLAG
        } else {
            0
        };
        self.uint32(flag | size)
    }

    /// Write a member header (EMHEADER), dispatching on the CDR version.
    ///
    /// `length_code` is honored only by CDR2 streams; `None` selects
    /// the default code for the object size. Explicit codes 0-3 demand
    /// an exactly matching size, and codes 6/7 a size divisible by the
    /// scale factor.
    pub fn em_header(
        &mut self,
        must_understand: bool,
        id: u32,
        object_size: usize,
        length_code: Option<u8>,
    ) -> Result<&mut Self> {
        if self.kind.is_version2() {
            self.member_header_v2(must_understand, id, object_size, length_code)
        } else {
            self.member_header_v1(must_understand, id, object_size)
        }
    }

    /// Write the sentinel terminating an XCDR1 parameter list.
    ///
    /// No-op on CDR2 streams.
    pub fn sentinel_header(&mut self) -> Result<&mut Self> {
        if self.kind.is_version2() {
            return Ok(self);
        }
        self.align(4, 4);
        self.uint16(PID_SENTINEL)?;
        self.uint16(0)?;
        Ok(self)
    }

    /// Pad to `size` and make room for `bytes_to_write` more bytes.
    ///
    /// Padding is computed relative to the current alignment origin,
    /// zero-filled, and consumed; the reserved `bytes_to_write` region
    /// is left for subsequent writes. Passing the full byte length of
    /// a bulk write here means the buffer grows at most once.
    pub fn align(&mut self, size: usize, bytes_to_write: usize) {
        let alignment = (self.offset - self.origin) % size;
        let padding = if alignment > 0 { size - alignment } else { 0 };
        self.reserve(padding + bytes_to_write);
        if padding > 0 {
            self.buffer[self.offset..self.offset + padding].fill(0);
            self.offset += padding;
        }
    }

    /// XCDR1 parameter-list member header; switches to the extended
    /// form when the ID or size overflows the compact field widths.
    fn member_header_v1(
        &mut self,
        must_understand: bool,
        id: u32,
        object_size: usize,
    ) -> Result<&mut Self> {
        self.align(4, 4);
        let must_understand_flag = if must_understand {
            PID_FLAG_MUST_UNDERSTAND
        } else {
            0
        };
        let use_extended =
            id > u32::from(PID_COMPACT_ID_MAX) || object_size > usize::from(u16::MAX);
        if use_extended {
            let size =
                u32::try_from(object_size).map_err(|_| CdrError::size_over_u32(object_size))?;
            self.uint16(must_understand_flag | PID_EXTENDED)?;
            self.uint16(PID_EXTENDED_BODY_LENGTH)?;
            self.uint32(id)?;
            self.uint32(size)?;
        } else {
            self.uint16(must_understand_flag | id as u16)?;
            self.uint16(object_size as u16)?;
        }
        // Fresh alignment frame for the member payload
        self.origin = self.offset;
        Ok(self)
    }

    /// CDR2 mutable member header: one 32-bit word, plus a NEXTINT
    /// when the length code calls for one.
    fn member_header_v2(
        &mut self,
        must_understand: bool,
        id: u32,
        object_size: usize,
        length_code: Option<u8>,
    ) -> Result<&mut Self> {
        if id > EMHEADER_ID_MASK {
            return Err(CdrError::MemberIdTooLarge {
                id,
                max: EMHEADER_ID_MASK,
            });
        }
        let code = match length_code {
            Some(code) => code,
            None => length_code_for_object_size(object_size)?,
        };
        let must_understand_flag = if must_understand {
            EMHEADER_FLAG_MUST_UNDERSTAND
        } else {
            0
        };
        let header = must_understand_flag | (u32::from(code) << EMHEADER_LENGTH_CODE_SHIFT) | id;
        self.uint32(header)?;
        match code {
            0..=3 => {
                if let Some(expected) = object_size_for_length_code(code) {
                    if object_size != expected {
                        return Err(CdrError::LengthCodeSizeMismatch {
                            code,
                            expected,
                            actual: object_size,
                        });
                    }
                }
            }
            4 | 5 => {
                let size = u32::try_from(object_size)
                    .map_err(|_| CdrError::size_over_u32(object_size))?;
                self.uint32(size)?;
            }
            6 => {
                if object_size % 4 != 0 {
                    return Err(CdrError::LengthCodeSizeMismatch {
                        code,
                        expected: object_size / 4 * 4,
                        actual: object_size,
                    });
                }
                let scaled = u32::try_from(object_size / 4)
                    .map_err(|_| CdrError::size_over_u32(object_size))?;
                self.uint32(scaled)?;
            }
            7 => {
                if object_size % 8 != 0 {
                    return Err(CdrError::LengthCodeSizeMismatch {
                        code,
                        expected: object_size / 8 * 8,
                        actual: object_size,
                    });
                }
                let scaled = u32::try_from(object_size / 8)
                    .map_err(|_| CdrError::size_over_u32(object_size))?;
                self.uint32(scaled)?;
            }
            _ => {
                return Err(CdrError::InvalidLengthCode {
                    code,
                    offset: self.offset,
                })
            }
        }
        Ok(self)
    }

    /// Shared numeric-array write.
    ///
    /// When the stream's byte order matches the host and the count
    /// meets [`BUFFER_COPY_THRESHOLD`], alignment is applied once for
    /// the first element and the whole range is bulk-copied; otherwise
    /// each element is serialized individually.
    fn numeric_array<T: bytemuck::Pod>(
        &mut self,
        values: &[T],
        alignment: usize,
        write_length: bool,
        write_one: fn(&mut Self, T) -> Result<&mut Self>,
    ) -> Result<()> {
        if write_length {
            self.sequence_length(values.len())?;
        }
        let host_little_endian = cfg!(target_endian = "little");
        if self.little_endian == host_little_endian && values.len() >= BUFFER_COPY_THRESHOLD {
            let bytes: &[u8] = bytemuck::cast_slice(values);
            self.align(alignment, bytes.len());
            self.put(bytes);
        } else {
            for &value in values {
                write_one(self, value)?;
            }
        }
        Ok(())
    }

    /// Grow the buffer so `additional` more bytes fit at the offset.
    ///
    /// Doubles the current capacity, or grows to the exact requirement
    /// if doubling is not enough. Existing bytes are preserved.
    fn reserve(&mut self, additional: usize) {
        let needed = self.offset + additional;
        if needed > self.buffer.len() {
            let new_capacity = needed.max(self.buffer.len() * 2);
            trace!(
                capacity = self.buffer.len(),
                new_capacity,
                "growing write buffer"
            );
            self.buffer.resize(new_capacity, 0);
        }
    }

    /// Copy bytes at the offset. Capacity must already be reserved.
    fn put(&mut self, bytes: &[u8]) {
        self.buffer[self.offset..self.offset + bytes.len()].copy_from_slice(bytes);
        self.offset += bytes.len();
    }
}
