// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR reader for decoding CDR-encoded data with proper alignment.
//!
//! The reader is a stateful cursor over an immutable byte buffer. It
//! tracks an `offset` (current read position) and an `origin` (the
//! point alignment is measured from). Alignment is always calculated
//! as `(offset - origin) % width`, which matches the DDS-XTypes rule
//! for parameter-list member payloads: XCDR1 EMHEADERs reset the
//! origin to the start of the member that follows.

use std::borrow::Cow;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::trace;

use super::encapsulation::{EncapsulationKind, CDR_HEADER_SIZE};
use super::length_code::{
    object_size_for_length_code, EMHEADER_FLAG_MUST_UNDERSTAND, EMHEADER_ID_MASK,
    EMHEADER_LENGTH_CODE_MASK, EMHEADER_LENGTH_CODE_SHIFT, DHEADER_ENDIANNESS_FLAG,
    PID_EXTENDED, PID_FLAG_IMPLEMENTATION_SPECIFIC, PID_FLAG_MUST_UNDERSTAND, PID_IGNORE,
    PID_MASK, PID_SENTINEL,
};
use crate::core::{CdrError, Result};

/// Below this element count, decoding a misaligned array element by
/// element beats copying the byte range first.
const ELEMENT_DECODE_THRESHOLD: usize = 10;

/// Decoded member header (EMHEADER).
///
/// One shape serves both header generations: CDR2 headers populate
/// `length_code`, XCDR1 parameter headers leave it `None`. Callers
/// branch on presence rather than on the stream version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmHeader {
    /// Whether the member must be understood by the receiver
    pub must_understand: bool,
    /// Member ID
    pub id: u32,
    /// Byte length of the member payload that follows
    pub object_size: usize,
    /// The 3-bit length code, CDR2 headers only
    pub length_code: Option<u8>,
}

/// CDR reader over an existing byte buffer.
///
/// Decodes primitives, strings, homogeneous sequences, and
/// extensibility headers. Byte order and CDR version are fixed by the
/// stream header at construction and never change mid-stream.
///
/// Typed-array reads return [`Cow`] views: borrowed directly from the
/// buffer when the stream's byte order matches the host and the data
/// happens to start on a naturally aligned address, owned otherwise.
/// Since the reader never mutates or reallocates its buffer, borrowed
/// views stay valid for the reader's whole lifetime.
///
/// # Example
///
/// ```
/// use cdrcodec::CdrReader;
///
/// # fn main() -> cdrcodec::Result<()> {
/// let data = vec![0x00, 0x01, 0x00, 0x00, 0x2a, 0x00, 0x00, 0x00];
/// let mut reader = CdrReader::new(&data)?;
/// assert_eq!(reader.uint32()?, 42);
/// # Ok(())
/// # }
/// ```
pub struct CdrReader<'a> {
    /// The data buffer, including the 4-byte stream header
    data: &'a [u8],
    /// Current read position
    offset: usize,
    /// Origin for alignment calculation
    origin: usize,
    /// Encapsulation kind from the stream header
    kind: EncapsulationKind,
    /// Whether the stream uses little-endian byte order
    little_endian: bool,
    /// Alignment of 64-bit values (8 for CDR1, 4 for CDR2)
    eight_byte_alignment: usize,
}

impl<'a> CdrReader<'a> {
    /// Create a new reader over CDR-encoded data.
    ///
    /// Fails if the buffer cannot hold the mandatory 4-byte stream
    /// header or if the kind byte is unassigned.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() < CDR_HEADER_SIZE {
            return Err(CdrError::buffer_too_short(CDR_HEADER_SIZE, data.len(), 0));
        }
        let kind = EncapsulationKind::try_from(data[1])?;
        Ok(Self {
            data,
            offset: CDR_HEADER_SIZE,
            origin: CDR_HEADER_SIZE,
            kind,
            little_endian: kind.is_little_endian(),
            eight_byte_alignment: kind.eight_byte_alignment(),
        })
    }

    /// Get the encapsulation kind of the stream.
    #[must_use]
    pub const fn kind(&self) -> EncapsulationKind {
        self.kind
    }

    /// Get the underlying buffer, including the stream header.
    #[must_use]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Get the number of bytes decoded so far (the current offset).
    #[must_use]
    pub const fn decoded_bytes(&self) -> usize {
        self.offset
    }

    /// Get the number of bytes left to read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Read an 8-bit signed integer. Never aligned.
    pub fn int8(&mut self) -> Result<i8> {
        Ok(self.uint8()? as i8)
    }

    /// Read an 8-bit unsigned integer. Never aligned.
    pub fn uint8(&mut self) -> Result<u8> {
        if self.offset >= self.data.len() {
            return Err(CdrError::buffer_too_short(1, 0, self.offset));
        }
        let value = self.data[self.offset];
        self.offset += 1;
        Ok(value)
    }

    /// Read a 16-bit signed integer.
    pub fn int16(&mut self) -> Result<i16> {
        let start = self.aligned_offset(2, 2)?;
        let value = decode_i16(&self.data[start..start + 2], self.little_endian);
        self.offset = start + 2;
        Ok(value)
    }

    /// Read a 16-bit unsigned integer.
    pub fn uint16(&mut self) -> Result<u16> {
        let start = self.aligned_offset(2, 2)?;
        let value = decode_u16(&self.data[start..start + 2], self.little_endian);
        self.offset = start + 2;
        Ok(value)
    }

    /// Read a 32-bit signed integer.
    pub fn int32(&mut self) -> Result<i32> {
        let start = self.aligned_offset(4, 4)?;
        let value = decode_i32(&self.data[start..start + 4], self.little_endian);
        self.offset = start + 4;
        Ok(value)
    }

    /// Read a 32-bit unsigned integer.
    pub fn uint32(&mut self) -> Result<u32> {
        let start = self.aligned_offset(4, 4)?;
        let value = decode_u32(&self.data[start..start + 4], self.little_endian);
        self.offset = start + 4;
        Ok(value)
    }

    /// Read a 64-bit signed integer.
    pub fn int64(&mut self) -> Result<i64> {
        let start = self.aligned_offset(8, self.eight_byte_alignment)?;
        let value = decode_i64(&self.data[start..start + 8], self.little_endian);
        self.offset = start + 8;
        Ok(value)
    }

    /// Read a 64-bit unsigned integer.
    pub fn uint64(&mut self) -> Result<u64> {
        let start = self.aligned_offset(8, self.eight_byte_alignment)?;
        let value = decode_u64(&self.data[start..start + 8], self.little_endian);
        self.offset = start + 8;
        Ok(value)
    }

    /// Read a 16-bit unsigned integer in big-endian order, regardless
    /// of the stream's declared byte order.
    pub fn uint16_be(&mut self) -> Result<u16> {
        let start = self.aligned_offset(2, 2)?;
        let value = BigEndian::read_u16(&self.data[start..start + 2]);
        self.offset = start + 2;
        Ok(value)
    }

    /// Read a 32-bit unsigned integer in big-endian order.
    pub fn uint32_be(&mut self) -> Result<u32> {
        let start = self.aligned_offset(4, 4)?;
        let value = BigEndian::read_u32(&self.data[start..start + 4]);
        self.offset = start + 4;
        Ok(value)
    }

    /// Read a 64-bit unsigned integer in big-endian order.
    pub fn uint64_be(&mut self) -> Result<u64> {
        let start = self.aligned_offset(8, self.eight_byte_alignment)?;
        let value = BigEndian::read_u64(&self.data[start..start + 8]);
        self.offset = start + 8;
        Ok(value)
    }

    /// Read a 32-bit float.
    pub fn float32(&mut self) -> Result<f32> {
        let start = self.aligned_offset(4, 4)?;
        let value = decode_f32(&self.data[start..start + 4], self.little_endian);
        self.offset = start + 4;
        Ok(value)
    }

    /// Read a 64-bit double.
    pub fn float64(&mut self) -> Result<f64> {
        let start = self.aligned_offset(8, self.eight_byte_alignment)?;
        let value = decode_f64(&self.data[start..start + 8], self.little_endian);
        self.offset = start + 8;
        Ok(value)
    }

    /// Read a length-prefixed, NUL-terminated string.
    ///
    /// The returned `&str` borrows directly from the buffer.
    pub fn string(&mut self) -> Result<&'a str> {
        let length = self.sequence_length()?;
        self.string_with_length(length)
    }

    /// Read a string whose length prefix was already consumed.
    ///
    /// Used when a caller has read a shared length (for example a
    /// value serving as both sequence count and string length) and
    /// must not consume a second prefix. A length of 0 or 1 yields an
    /// empty string and still advances by that length; longer strings
    /// hold `length - 1` UTF-8 bytes plus a terminator byte that is
    /// consumed without validating its value.
    pub fn string_with_length(&mut self, length: usize) -> Result<&'a str> {
        let data: &'a [u8] = self.data;
        if length > self.remaining() {
            return Err(CdrError::buffer_too_short(
                length,
                self.remaining(),
                self.offset,
            ));
        }
        if length <= 1 {
            self.offset += length;
            return Ok("");
        }
        let payload = &data[self.offset..self.offset + length - 1];
        let value = std::str::from_utf8(payload)
            .map_err(|_| CdrError::InvalidUtf8 { offset: self.offset })?;
        self.offset += length;
        Ok(value)
    }

    /// Read a sequence length (element count of an upcoming sequence).
    pub fn sequence_length(&mut self) -> Result<usize> {
        Ok(self.uint32()? as usize)
    }

    /// Read an array of 8-bit signed integers as a zero-copy view.
    pub fn int8_array(&mut self, count: Option<usize>) -> Result<&'a [i8]> {
        Ok(bytemuck::cast_slice(self.uint8_array(count)?))
    }

    /// Read an array of 8-bit unsigned integers as a zero-copy view.
    pub fn uint8_array(&mut self, count: Option<usize>) -> Result<&'a [u8]> {
        let data: &'a [u8] = self.data;
        let count = match count {
            Some(count) => count,
            None => self.sequence_length()?,
        };
        if count > self.remaining() {
            return Err(CdrError::length_exceeded(
                count,
                self.offset,
                self.data.len(),
            ));
        }
        let view = &data[self.offset..self.offset + count];
        self.offset += count;
        Ok(view)
    }

    /// Read an array of 16-bit signed integers.
    pub fn int16_array(&mut self, count: Option<usize>) -> Result<Cow<'a, [i16]>> {
        self.typed_array(count, 2, decode_i16)
    }

    /// Read an array of 16-bit unsigned integers.
    pub fn uint16_array(&mut self, count: Option<usize>) -> Result<Cow<'a, [u16]>> {
        self.typed_array(count, 2, decode_u16)
    }

    /// Read an array of 32-bit signed integers.
    pub fn int32_array(&mut self, count: Option<usize>) -> Result<Cow<'a, [i32]>> {
        self.typed_array(count, 4, decode_i32)
    }

    /// Read an array of 32-bit unsigned integers.
    pub fn uint32_array(&mut self, count: Option<usize>) -> Result<Cow<'a, [u32]>> {
        self.typed_array(count, 4, decode_u32)
    }

    /// Read an array of 64-bit signed integers.
    pub fn int64_array(&mut self, count: Option<usize>) -> Result<Cow<'a, [i64]>> {
        self.typed_array(count, self.eight_byte_alignment, decode_i64)
    }

    /// Read an array of 64-bit unsigned integers.
    pub fn uint64_array(&mut self, count: Option<usize>) -> Result<Cow<'a, [u64]>> {
        self.typed_array(count, self.eight_byte_alignment, decode_u64)
    }

    /// Read an array of 32-bit floats.
    pub fn float32_array(&mut self, count: Option<usize>) -> Result<Cow<'a, [f32]>> {
        self.typed_array(count, 4, decode_f32)
    }

    /// Read an array of 64-bit doubles.
    pub fn float64_array(&mut self, count: Option<usize>) -> Result<Cow<'a, [f64]>> {
        self.typed_array(count, self.eight_byte_alignment, decode_f64)
    }

    /// Read an array of strings.
    pub fn string_array(&mut self, count: Option<usize>) -> Result<Vec<&'a str>> {
        let count = match count {
            Some(count) => count,
            None => self.sequence_length()?,
        };
        let mut values = Vec::with_capacity(count.min(self.remaining() / 4 + 1));
        for _ in 0..count {
            values.push(self.string()?);
        }
        Ok(values)
    }

    /// Read a delimiter header (DHEADER) and return the payload size.
    ///
    /// CDR2 streams carry the object size in the full 32-bit word. In
    /// the legacy combined form used by version-1 streams the top bit
    /// is an endianness flag; a flag that contradicts the stream
    /// header is rejected, since byte order cannot change mid-stream.
    pub fn d_header(&mut self) -> Result<usize> {
        let header = self.uint32()?;
        if self.kind.is_version2() {
            return Ok(header as usize);
        }
        let flags_little_endian = header & DHEADER_ENDIANNESS_FLAG != 0;
        if flags_little_endian != self.little_endian {
            return Err(CdrError::EndiannessMismatch {
                offset: self.offset - 4,
            });
        }
        Ok((header & !DHEADER_ENDIANNESS_FLAG) as usize)
    }

    /// Read a member header (EMHEADER), dispatching on the CDR version.
    pub fn em_header(&mut self) -> Result<EmHeader> {
        if self.kind.is_version2() {
            self.member_header_v2()
        } else {
            self.member_header_v1()
        }
    }

    /// XCDR1 parameter-list member header.
    ///
    /// Layout: `u16 idFlags` + `u16 size`, or the extended form
    /// `u16 idFlags(PID_EXTENDED)` + `u16 bodyLen` + `u32 id` +
    /// `u32 size` for IDs or sizes beyond the compact field widths.
    fn member_header_v1(&mut self) -> Result<EmHeader> {
        self.align(4)?;
        let id_header = self.uint16()?;
        let must_understand = id_header & PID_FLAG_MUST_UNDERSTAND != 0;
        let pid = id_header & PID_MASK;
        if pid == PID_SENTINEL {
            return Err(CdrError::UnexpectedSentinel {
                offset: self.offset - 2,
            });
        }
        if id_header & PID_FLAG_IMPLEMENTATION_SPECIFIC != 0 || pid == PID_IGNORE {
            return Err(CdrError::ReservedParameterId { id_header });
        }
        let header = if pid == PID_EXTENDED {
            self.uint16()?; // length of the extended body, always 8
            let id = self.uint32()?;
            let object_size = self.uint32()? as usize;
            EmHeader {
                must_understand,
                id,
                object_size,
                length_code: None,
            }
        } else {
            let object_size = self.uint16()? as usize;
            EmHeader {
                must_understand,
                id: u32::from(pid),
                object_size,
                length_code: None,
            }
        };
        // PUSH(ORIGIN=0): the member payload gets a fresh alignment frame
        self.origin = self.offset;
        Ok(header)
    }

    /// CDR2 mutable member header: one 32-bit word, plus a NEXTINT
    /// when the length code calls for one.
    fn member_header_v2(&mut self) -> Result<EmHeader> {
        let header = self.uint32()?;
        let must_understand = header & EMHEADER_FLAG_MUST_UNDERSTAND != 0;
        let length_code = ((header >> EMHEADER_LENGTH_CODE_SHIFT) & EMHEADER_LENGTH_CODE_MASK) as u8;
        let id = header & EMHEADER_ID_MASK;
        let object_size = self.em_header_object_size(length_code)?;
        Ok(EmHeader {
            must_understand,
            id,
            object_size,
            length_code: Some(length_code),
        })
    }

    /// Resolve the object size a length code stands for, consuming the
    /// NEXTINT word when the code requires one.
    fn em_header_object_size(&mut self, length_code: u8) -> Result<usize> {
        if let Some(size) = object_size_for_length_code(length_code) {
            return Ok(size);
        }
        match length_code {
            4 | 5 => Ok(self.uint32()? as usize),
            6 => Ok(self.uint32()? as usize * 4),
            7 => Ok(self.uint32()? as usize * 8),
            _ => Err(CdrError::InvalidLengthCode {
                code: length_code,
                offset: self.offset.saturating_sub(4),
            }),
        }
    }

    /// Read the sentinel that terminates an XCDR1 parameter list.
    ///
    /// No-op on CDR2 streams, where the end of the member list is
    /// implicit in the delimiter header's length.
    pub fn sentinel_header(&mut self) -> Result<()> {
        if self.kind.is_version2() {
            return Ok(());
        }
        self.align(4)?;
        let header = self.uint16()?;
        if header & PID_MASK != PID_SENTINEL {
            return Err(CdrError::SentinelMismatch {
                expected: PID_SENTINEL,
                actual: header,
            });
        }
        self.uint16()?; // trailing padding field
        Ok(())
    }

    /// Seek relative to the current position.
    ///
    /// Targets before the stream header or at/after the end of the
    /// buffer are rejected; a position at end-of-buffer is invalid
    /// because no subsequent read could succeed there.
    pub fn seek(&mut self, relative: isize) -> Result<()> {
        self.seek_checked(self.offset as i64 + relative as i64)
    }

    /// Seek to an absolute position in `[4, len)`.
    pub fn seek_to(&mut self, offset: usize) -> Result<()> {
        self.seek_checked(offset as i64)
    }

    fn seek_checked(&mut self, target: i64) -> Result<()> {
        if target < CDR_HEADER_SIZE as i64 || target >= self.data.len() as i64 {
            return Err(CdrError::SeekOutOfRange {
                target,
                len: self.data.len(),
            });
        }
        self.offset = target as usize;
        Ok(())
    }

    /// Compute the padded start for a value of `width` bytes, without
    /// committing the cursor. Errors if padding plus value would run
    /// past the buffer, leaving the cursor untouched.
    fn aligned_offset(&self, width: usize, alignment: usize) -> Result<usize> {
        let misalignment = (self.offset - self.origin) % alignment;
        let start = if misalignment > 0 {
            self.offset + (alignment - misalignment)
        } else {
            self.offset
        };
        if start + width > self.data.len() {
            return Err(CdrError::buffer_too_short(
                width,
                self.data.len().saturating_sub(start),
                self.offset,
            ));
        }
        Ok(start)
    }

    /// Advance the cursor to the given alignment boundary.
    fn align(&mut self, alignment: usize) -> Result<()> {
        self.offset = self.aligned_offset(0, alignment)?;
        Ok(())
    }

    /// Shared typed-array decode.
    ///
    /// Three strategies: element-wise when the stream's byte order
    /// differs from the host's; a zero-copy cast when the order
    /// matches and the aligned start lands on a multiple of the
    /// element width; otherwise element-wise below
    /// [`ELEMENT_DECODE_THRESHOLD`] and copy-then-cast above it.
    fn typed_array<T: bytemuck::Pod>(
        &mut self,
        count: Option<usize>,
        alignment: usize,
        decode_one: fn(&[u8], bool) -> T,
    ) -> Result<Cow<'a, [T]>> {
        let data: &'a [u8] = self.data;
        let count = match count {
            Some(count) => count,
            None => self.sequence_length()?,
        };
        if count == 0 {
            return Ok(Cow::Borrowed(&[]));
        }
        let width = std::mem::size_of::<T>();
        let byte_len = count
            .checked_mul(width)
            .ok_or_else(|| CdrError::length_exceeded(count, self.offset, data.len()))?;
        let start = self
            .aligned_offset(byte_len, alignment)
            .map_err(|_| CdrError::length_exceeded(count, self.offset, data.len()))?;
        let host_little_endian = cfg!(target_endian = "little");
        if self.little_endian != host_little_endian {
            self.offset = start;
            trace!(count, width, "typed array: foreign byte order, element-wise decode");
            return Ok(Cow::Owned(self.decode_elements(count, width, decode_one)));
        }
        let bytes = &data[start..start + byte_len];
        match bytemuck::try_cast_slice::<u8, T>(bytes) {
            Ok(view) => {
                self.offset = start + byte_len;
                Ok(Cow::Borrowed(view))
            }
            Err(_) if count < ELEMENT_DECODE_THRESHOLD => {
                self.offset = start;
                Ok(Cow::Owned(self.decode_elements(count, width, decode_one)))
            }
            Err(_) => {
                // Misaligned start on a large array: one copy of the
                // byte range, then reinterpret the aligned copy.
                self.offset = start + byte_len;
                Ok(Cow::Owned(bytemuck::pod_collect_to_vec(bytes)))
            }
        }
    }

    /// Element-wise decode. Bounds were checked by the caller; the
    /// result is not exposed until every element decoded.
    fn decode_elements<T>(
        &mut self,
        count: usize,
        width: usize,
        decode_one: fn(&[u8], bool) -> T,
    ) -> Vec<T> {
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(decode_one(
                &self.data[self.offset..self.offset + width],
                self.little_endian,
            ));
            self.offset += width;
        }
        values
    }
}

fn decode_u16(bytes: &[u8], little_endian: bool) -> u16 {
    if little_endian {
        LittleEndian::read_u16(bytes)
    } else {
        BigEndian::read_u16(bytes)
    }
}

fn decode_i16(bytes: &[u8], little_endian: bool) -> i16 {
    if little_endian {
        LittleEndian::read_i16(bytes)
    } else {
        BigEndian::read_i16(bytes)
    }
}

fn decode_u32(bytes: &[u8], little_endian: bool) -> u32 {
    if little_endian {
        LittleEndian::read_u32(bytes)
    } else {
        BigEndian::read_u32(bytes)
    }
}

fn decode_i32(bytes: &[u8], little_endian: bool) -> i32 {
    if little_endian {
        LittleEndian::read_i32(bytes)
    } else {
        BigEndian::read_i32(bytes)
    }
}

fn decode_u64(bytes: &[u8], little_endian: bool) -> u64 {
    if little_endian {
        LittleEndian::read_u64(bytes)
    } else {
        BigEndian::read_u64(bytes)
    }
}

fn decode_i64(bytes: &[u8], little_endian: bool) -> i64 {
    if little_endian {
        LittleEndian::read_i64(bytes)
    } else {
        BigEndian::read_i64(bytes)
    }
}

fn decode_f32(bytes: &[u8], little_endian: bool) -> f32 {
    if little_endian {
        LittleEndian::read_f32(bytes)
    } else {
        BigEndian::read_f32(bytes)
    }
}

fn decode_f64(bytes: &[u8], little_endian: bool) -> f64 {
    if little_endian {
        LittleEndian::read_f64(bytes)
    } else {
        BigEndian::read_f64(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_buffer(payload: &[u8]) -> Vec<u8> {
        let mut data = vec![0x00, 0x01, 0x00, 0x00];
        data.extend_from_slice(payload);
        data
    }

    fn be_buffer(payload: &[u8]) -> Vec<u8> {
        let mut data = vec![0x00, 0x00, 0x00, 0x00];
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn test_new_rejects_short_buffer() {
        assert!(CdrReader::new(&[0x00, 0x01]).is_err());
        assert!(CdrReader::new(&[]).is_err());
    }

    #[test]
    fn test_new_rejects_unknown_kind() {
        let result = CdrReader::new(&[0x00, 0x09, 0x00, 0x00]);
        assert_eq!(result.err(), Some(CdrError::InvalidKind { byte: 0x09 }));
    }

    #[test]
    fn test_read_primitives_little_endian() {
        let mut payload = Vec::new();
        payload.push(0x2au8);
        payload.push(0x00); // padding to 2
        payload.extend_from_slice(&0x0302u16.to_le_bytes());
        payload.extend_from_slice(&0x0706_0504u32.to_le_bytes());
        payload.extend_from_slice(&0x0f0e_0d0c_0b0a_0908u64.to_le_bytes());
        let data = le_buffer(&payload);
        let mut reader = CdrReader::new(&data).unwrap();
        assert_eq!(reader.uint8().unwrap(), 0x2a);
        assert_eq!(reader.uint16().unwrap(), 0x0302);
        assert_eq!(reader.uint32().unwrap(), 0x0706_0504);
        assert_eq!(reader.uint64().unwrap(), 0x0f0e_0d0c_0b0a_0908);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_read_primitives_big_endian() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&0x1234u16.to_be_bytes());
        payload.extend_from_slice(&[0x00, 0x00]); // padding to 4
        payload.extend_from_slice(&0x1234_5678u32.to_be_bytes());
        let data = be_buffer(&payload);
        let mut reader = CdrReader::new(&data).unwrap();
        assert_eq!(reader.uint16().unwrap(), 0x1234);
        assert_eq!(reader.uint32().unwrap(), 0x1234_5678);
    }

    #[test]
    fn test_signed_extremes() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&i32::MIN.to_le_bytes());
        payload.extend_from_slice(&[0x00; 4]); // pad to the 8-byte unit
        payload.extend_from_slice(&i64::MAX.to_le_bytes());
        let data = le_buffer(&payload);
        let mut reader = CdrReader::new(&data).unwrap();
        assert_eq!(reader.int32().unwrap(), i32::MIN);
        assert_eq!(reader.int64().unwrap(), i64::MAX);
    }

    #[test]
    fn test_big_endian_variants_in_little_endian_stream() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&0xbeefu16.to_be_bytes());
        payload.extend_from_slice(&[0x00, 0x00]);
        payload.extend_from_slice(&0xdead_beefu32.to_be_bytes());
        let data = le_buffer(&payload);
        let mut reader = CdrReader::new(&data).unwrap();
        assert_eq!(reader.uint16_be().unwrap(), 0xbeef);
        assert_eq!(reader.uint32_be().unwrap(), 0xdead_beef);
    }

    #[test]
    fn test_read_floats() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&1.25f32.to_le_bytes());
        payload.extend_from_slice(&[0x00; 4]); // pad to 8 for CDR1
        payload.extend_from_slice(&(-2.5f64).to_le_bytes());
        let data = le_buffer(&payload);
        let mut reader = CdrReader::new(&data).unwrap();
        assert!((reader.float32().unwrap() - 1.25).abs() < f32::EPSILON);
        assert!((reader.float64().unwrap() + 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cdr2_uses_four_byte_alignment_for_doubles() {
        let mut data = vec![0x00, 11, 0x00, 0x00]; // plain CDR2, little-endian
        data.extend_from_slice(&7u32.to_le_bytes());
        // No padding: (8 - 4) % 4 == 0 under CDR2
        data.extend_from_slice(&3.5f64.to_le_bytes());
        let mut reader = CdrReader::new(&data).unwrap();
        assert_eq!(reader.uint32().unwrap(), 7);
        assert!((reader.float64().unwrap() - 3.5).abs() < f64::EPSILON);
        assert_eq!(reader.decoded_bytes(), 16);
    }

    #[test]
    fn test_string() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&6u32.to_le_bytes());
        payload.extend_from_slice(b"hello\0");
        let data = le_buffer(&payload);
        let mut reader = CdrReader::new(&data).unwrap();
        assert_eq!(reader.string().unwrap(), "hello");
        assert_eq!(reader.decoded_bytes(), 14);
    }

    #[test]
    fn test_empty_string_lengths() {
        // length 0: no payload at all
        let data = le_buffer(&0u32.to_le_bytes());
        let mut reader = CdrReader::new(&data).unwrap();
        assert_eq!(reader.string().unwrap(), "");
        assert_eq!(reader.decoded_bytes(), 8);

        // length 1: bare terminator
        let mut payload = Vec::new();
        payload.extend_from_slice(&1u32.to_le_bytes());
        payload.push(0x00);
        let data = le_buffer(&payload);
        let mut reader = CdrReader::new(&data).unwrap();
        assert_eq!(reader.string().unwrap(), "");
        assert_eq!(reader.decoded_bytes(), 9);
    }

    #[test]
    fn test_string_with_preread_length() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&4u32.to_le_bytes());
        payload.extend_from_slice(b"abc\0");
        let data = le_buffer(&payload);
        let mut reader = CdrReader::new(&data).unwrap();
        let shared = reader.sequence_length().unwrap();
        assert_eq!(reader.string_with_length(shared).unwrap(), "abc");
    }

    #[test]
    fn test_string_invalid_utf8() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&3u32.to_le_bytes());
        payload.extend_from_slice(&[0xff, 0xfe, 0x00]);
        let data = le_buffer(&payload);
        let mut reader = CdrReader::new(&data).unwrap();
        assert!(matches!(
            reader.string(),
            Err(CdrError::InvalidUtf8 { .. })
        ));
    }

    #[test]
    fn test_uint8_array_is_zero_copy() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&3u32.to_le_bytes());
        payload.extend_from_slice(&[1, 2, 3]);
        let data = le_buffer(&payload);
        let mut reader = CdrReader::new(&data).unwrap();
        let view = reader.uint8_array(None).unwrap();
        assert_eq!(view, &[1, 2, 3]);
        assert!(std::ptr::eq(view.as_ptr(), &data[8]));
    }

    #[test]
    fn test_int8_array() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&2u32.to_le_bytes());
        payload.extend_from_slice(&[0xff, 0x7f]);
        let data = le_buffer(&payload);
        let mut reader = CdrReader::new(&data).unwrap();
        assert_eq!(reader.int8_array(None).unwrap(), &[-1, 127]);
    }

    #[test]
    fn test_typed_array_explicit_count() {
        let mut payload = Vec::new();
        for v in [10u32, 20, 30] {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        let data = le_buffer(&payload);
        let mut reader = CdrReader::new(&data).unwrap();
        let values = reader.uint32_array(Some(3)).unwrap();
        assert_eq!(values.as_ref(), &[10, 20, 30]);
    }

    #[test]
    fn test_typed_array_empty_does_not_align() {
        let data = le_buffer(&0u32.to_le_bytes());
        let mut reader = CdrReader::new(&data).unwrap();
        let values = reader.float64_array(None).unwrap();
        assert!(values.is_empty());
        assert_eq!(reader.decoded_bytes(), 8);
    }

    #[test]
    fn test_typed_array_foreign_order_decodes_elementwise() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&2u32.to_be_bytes());
        payload.extend_from_slice(&0x1122u16.to_be_bytes());
        payload.extend_from_slice(&0x3344u16.to_be_bytes());
        let data = be_buffer(&payload);
        let mut reader = CdrReader::new(&data).unwrap();
        let values = reader.uint16_array(None).unwrap();
        assert_eq!(values.as_ref(), &[0x1122, 0x3344]);
        if cfg!(target_endian = "little") {
            assert!(matches!(values, Cow::Owned(_)));
        }
    }

    #[test]
    fn test_typed_array_count_exceeding_buffer() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&100u32.to_le_bytes());
        payload.extend_from_slice(&[0u8; 8]);
        let data = le_buffer(&payload);
        let mut reader = CdrReader::new(&data).unwrap();
        assert!(matches!(
            reader.uint32_array(None),
            Err(CdrError::LengthExceeded { .. })
        ));
    }

    #[test]
    fn test_string_array() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&2u32.to_le_bytes());
        payload.extend_from_slice(&2u32.to_le_bytes());
        payload.extend_from_slice(b"a\0");
        payload.extend_from_slice(&[0x00, 0x00]); // pad length prefix
        payload.extend_from_slice(&3u32.to_le_bytes());
        payload.extend_from_slice(b"bc\0");
        let data = le_buffer(&payload);
        let mut reader = CdrReader::new(&data).unwrap();
        assert_eq!(reader.string_array(None).unwrap(), vec!["a", "bc"]);
    }

    #[test]
    fn test_seek_bounds() {
        let data = le_buffer(&[1, 2, 3, 4]);
        let mut reader = CdrReader::new(&data).unwrap();
        assert!(reader.seek_to(3).is_err());
        assert!(reader.seek_to(8).is_err()); // end-of-buffer is invalid
        assert!(reader.seek_to(7).is_ok());
        assert!(reader.seek(-4).is_err());
        assert!(reader.seek(-3).is_ok());
        assert_eq!(reader.decoded_bytes(), 4);
    }

    #[test]
    fn test_reread_after_seek() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&11u32.to_le_bytes());
        payload.extend_from_slice(&22u32.to_le_bytes());
        let data = le_buffer(&payload);
        let mut reader = CdrReader::new(&data).unwrap();
        assert_eq!(reader.uint32().unwrap(), 11);
        assert_eq!(reader.uint32().unwrap(), 22);
        reader.seek_to(4).unwrap();
        assert_eq!(reader.uint32().unwrap(), 11);
    }

    #[test]
    fn test_read_past_end() {
        let data = le_buffer(&[0x01]);
        let mut reader = CdrReader::new(&data).unwrap();
        assert!(reader.uint32().is_err());
        assert_eq!(reader.decoded_bytes(), 4); // cursor untouched on failure
        assert_eq!(reader.uint8().unwrap(), 1);
        assert!(reader.uint8().is_err());
    }
}
