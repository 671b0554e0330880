//! Bounds-checked little-endian field reads over a raw image buffer.
//!
//! Every fixed-offset access in the decoders goes through these helpers, so
//! a truncated or hostile buffer surfaces as
//! [`ImageError::TruncatedBuffer`](crate::ImageError::TruncatedBuffer)
//! instead of a panic.

use crate::error::ImageError;
use byteorder::{ByteOrder, LE};

/// Borrows `len` bytes at `offset`, or fails if the range leaves the buffer.
pub(crate) fn bytes_at(data: &[u8], offset: usize, len: usize) -> Result<&[u8], ImageError> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(ImageError::TruncatedBuffer)
}

/// Reads the byte at `offset`.
pub(crate) fn u8_at(data: &[u8], offset: usize) -> Result<u8, ImageError> {
    Ok(bytes_at(data, offset, 1)?[0])
}

/// Reads a little-endian `u16` at `offset`.
pub(crate) fn u16_at(data: &[u8], offset: usize) -> Result<u16, ImageError> {
    Ok(LE::read_u16(bytes_at(data, offset, 2)?))
}

/// Reads a little-endian `u32` at `offset`.
pub(crate) fn u32_at(data: &[u8], offset: usize) -> Result<u32, ImageError> {
    Ok(LE::read_u32(bytes_at(data, offset, 4)?))
}

/// Reads a little-endian `u64` at `offset`.
pub(crate) fn u64_at(data: &[u8], offset: usize) -> Result<u64, ImageError> {
    Ok(LE::read_u64(bytes_at(data, offset, 8)?))
}

/// Offset of a field `delta` bytes into a structure that starts at `base`.
pub(crate) fn field(base: usize, delta: usize) -> Result<usize, ImageError> {
    base.checked_add(delta).ok_or(ImageError::TruncatedBuffer)
}

/// Converts a file-offset field into a slice index.
///
/// An offset wider than the address space cannot lie inside the buffer, so
/// the failure classifies as truncation.
pub(crate) fn to_index(offset: u64) -> Result<usize, ImageError> {
    usize::try_from(offset).map_err(|_| ImageError::TruncatedBuffer)
}

/// Compares a fixed-width name field against `name` followed by NUL padding.
pub(crate) fn padded_name_is(name_field: &[u8], name: &[u8]) -> bool {
    name.len() <= name_field.len()
        && name_field[..name.len()] == *name
        && name_field[name.len()..].iter().all(|&b| b == 0)
}
