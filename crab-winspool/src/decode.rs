//! Fixed-record decoding for spooler result buffers
//!
//! All reads are explicit byte-offset reads in native byte order. Nothing in
//! here reinterprets the buffer as a Rust struct.

use serde::Serialize;

use crate::error::{SpoolError, SpoolResult};

/// Pointer width of the running process, which is the width the spooler uses
/// for pointers inside result buffers
pub const PTR_SIZE: usize = std::mem::size_of::<usize>();

/// Size of one `PRINTER_INFO_5W` record: two string pointers followed by
/// three `DWORD`s, padded to pointer alignment
pub const PRINTER_INFO_5_STRIDE: usize = (2 * PTR_SIZE + 12).next_multiple_of(PTR_SIZE);

/// Width of one paper name slot, in UTF-16 units
pub const PAPER_NAME_LEN: usize = 64;

/// Byte strides of the `DeviceCapabilitiesW` arrays
pub(crate) const PAPER_NAME_STRIDE: usize = PAPER_NAME_LEN * 2;
pub(crate) const PAPER_ID_STRIDE: usize = 2;
pub(crate) const POINT_STRIDE: usize = 8;

/// Printer descriptor from enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrinterInfo {
    pub name: String,
    /// First entry of the printer's port list
    pub port: String,
    pub attributes: u32,
}

fn read_array<const N: usize>(buf: &[u8], offset: usize) -> SpoolResult<[u8; N]> {
    offset
        .checked_add(N)
        .and_then(|end| buf.get(offset..end))
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| {
            SpoolError::Decode(format!(
                "{N}-byte read at offset {offset} outside {}-byte buffer",
                buf.len()
            ))
        })
}

pub(crate) fn read_u16(buf: &[u8], offset: usize) -> SpoolResult<u16> {
    read_array(buf, offset).map(u16::from_ne_bytes)
}

pub(crate) fn read_i16(buf: &[u8], offset: usize) -> SpoolResult<i16> {
    read_array(buf, offset).map(i16::from_ne_bytes)
}

pub(crate) fn read_u32(buf: &[u8], offset: usize) -> SpoolResult<u32> {
    read_array(buf, offset).map(u32::from_ne_bytes)
}

pub(crate) fn read_i32(buf: &[u8], offset: usize) -> SpoolResult<i32> {
    read_array(buf, offset).map(i32::from_ne_bytes)
}

pub(crate) fn read_usize(buf: &[u8], offset: usize) -> SpoolResult<usize> {
    read_array(buf, offset).map(usize::from_ne_bytes)
}

/// Read a NUL-terminated UTF-16 string starting at `offset`
pub(crate) fn read_wide_str(buf: &[u8], offset: usize) -> SpoolResult<String> {
    let mut units = Vec::new();
    let mut pos = offset;
    loop {
        let unit = read_u16(buf, pos).map_err(|_| {
            SpoolError::Decode(format!("unterminated wide string at offset {offset}"))
        })?;
        if unit == 0 {
            break;
        }
        units.push(unit);
        pos += 2;
    }
    Ok(String::from_utf16_lossy(&units))
}

/// Read a NUL-terminated UTF-16 string referenced by a pointer into `buf`.
///
/// `base` is the address `buf` had when the OS filled it. A null pointer
/// reads as an empty string.
pub(crate) fn read_wide_str_ptr(buf: &[u8], base: usize, ptr: usize) -> SpoolResult<String> {
    if ptr == 0 {
        return Ok(String::new());
    }
    let offset = ptr
        .checked_sub(base)
        .filter(|off| *off < buf.len())
        .ok_or_else(|| SpoolError::Decode(format!("string pointer {ptr:#x} outside buffer")))?;
    read_wide_str(buf, offset)
}

/// Decode a fixed-width UTF-16 slot, stopping at the first NUL
fn read_wide_slot(buf: &[u8], offset: usize, len: usize) -> SpoolResult<String> {
    let mut units = Vec::with_capacity(len);
    for i in 0..len {
        let unit = read_u16(buf, offset + i * 2)?;
        if unit == 0 {
            break;
        }
        units.push(unit);
    }
    Ok(String::from_utf16_lossy(&units))
}

fn check_len(buf: &[u8], count: usize, stride: usize, what: &str) -> SpoolResult<()> {
    let required = count
        .checked_mul(stride)
        .ok_or_else(|| SpoolError::Decode(format!("{what}: count {count} overflows")))?;
    if buf.len() < required {
        return Err(SpoolError::Decode(format!(
            "{what}: {count} records need {required} bytes, buffer has {}",
            buf.len()
        )));
    }
    Ok(())
}

/// Decode `count` `PRINTER_INFO_5W` records.
///
/// The port string is cut at the first `,`.
pub(crate) fn decode_printer_info_5(buf: &[u8], base: usize, count: usize) -> SpoolResult<Vec<PrinterInfo>> {
    check_len(buf, count, PRINTER_INFO_5_STRIDE, "PRINTER_INFO_5")?;

    (0..count)
        .map(|i| {
            let rec = i * PRINTER_INFO_5_STRIDE;
            let name = read_wide_str_ptr(buf, base, read_usize(buf, rec)?)?;
            let ports = read_wide_str_ptr(buf, base, read_usize(buf, rec + PTR_SIZE)?)?;
            let attributes = read_u32(buf, rec + 2 * PTR_SIZE)?;
            Ok::<_, SpoolError>(PrinterInfo {
                name,
                port: first_port(&ports).to_string(),
                attributes,
            })
        })
        .collect()
}

/// First entry of a comma-separated port list
pub(crate) fn first_port(ports: &str) -> &str {
    ports.split(',').next().unwrap_or(ports)
}

/// Decode `count` 64-unit paper name slots
pub(crate) fn decode_paper_names(buf: &[u8], count: usize) -> SpoolResult<Vec<String>> {
    check_len(buf, count, PAPER_NAME_STRIDE, "paper names")?;
    (0..count)
        .map(|i| read_wide_slot(buf, i * PAPER_NAME_STRIDE, PAPER_NAME_LEN))
        .collect()
}

/// Decode `count` 16-bit paper ids
pub(crate) fn decode_paper_ids(buf: &[u8], count: usize) -> SpoolResult<Vec<i32>> {
    check_len(buf, count, PAPER_ID_STRIDE, "paper ids")?;
    (0..count)
        .map(|i| read_u16(buf, i * PAPER_ID_STRIDE).map(i32::from))
        .collect()
}

fn decode_pairs<T>(
    buf: &[u8],
    count: usize,
    what: &str,
    read: fn(&[u8], usize) -> SpoolResult<T>,
) -> SpoolResult<Vec<T>> {
    check_len(buf, count, POINT_STRIDE, what)?;
    let mut out = Vec::with_capacity(count * 2);
    for i in 0..count {
        let rec = i * POINT_STRIDE;
        out.push(read(buf, rec)?);
        out.push(read(buf, rec + 4)?);
    }
    Ok(out)
}

/// Decode `count` signed 32-bit (X, Y) pairs into a flat `X,Y,X,Y…` list
pub(crate) fn decode_points(buf: &[u8], count: usize) -> SpoolResult<Vec<i32>> {
    decode_pairs(buf, count, "points", read_i32)
}

/// Decode `count` paper sizes (width, height in tenths of a millimetre).
///
/// Same layout as [`decode_points`] but the values are unsigned.
pub(crate) fn decode_paper_sizes(buf: &[u8], count: usize) -> SpoolResult<Vec<u32>> {
    decode_pairs(buf, count, "paper sizes", read_u32)
}
