//! Zig-zag variable-length integer encoding.
//!
//! Ints and longs are zig-zag mapped to unsigned values, then written as
//! base-128 varints, least significant group first, with the continuation
//! bit (0x80) set on every byte but the last:
//! - zig-zag: 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...
//! - encode: `(n << 1) ^ (n >> (bits - 1))`
//! - decode: `(n >> 1) ^ -(n & 1)`
//!
//! Decoding accepts over-long encodings (extra continuation groups carrying
//! only zero bits): `[0x8a, 0x80, 0x80, 0x80, 0x00]` is 5, same as `[0x0a]`.
//! A varint needing more than 5 groups (int) or 10 groups (long), or carrying
//! value bits beyond the type's width, is a [`DecodeError::VarintOverflow`].

use crate::codec::reader::ByteReader;
use crate::error::DecodeError;

/// Read the raw unsigned varint beneath a zig-zag value.
///
/// `bits` is the width of the target type (32 or 64) and bounds both the
/// group count and the accepted value range.
fn read_raw(r: &mut ByteReader<'_>, bits: u32) -> Result<u64, DecodeError> {
    let start = r.position();
    let max_groups = (bits as usize + 6) / 7;
    let mut value: u64 = 0;
    let mut shift: u32 = 0;

    for _ in 0..max_groups {
        let byte = r.read_byte()?;
        let chunk = (byte & 0x7f) as u64;

        // The final group of a 64-bit varint has one usable bit; anything
        // above it cannot be represented.
        if shift + 7 > 64 && (chunk >> (64 - shift)) != 0 {
            return Err(DecodeError::VarintOverflow {
                offset: start,
                bits,
            });
        }
        value |= chunk << shift;

        if byte & 0x80 == 0 {
            if bits == 32 && value > u32::MAX as u64 {
                return Err(DecodeError::VarintOverflow {
                    offset: start,
                    bits,
                });
            }
            return Ok(value);
        }
        shift += 7;
    }

    Err(DecodeError::VarintOverflow {
        offset: start,
        bits,
    })
}

/// Decode a zig-zag varint into an `i64`.
pub fn read_long(r: &mut ByteReader<'_>) -> Result<i64, DecodeError> {
    let unsigned = read_raw(r, 64)?;
    Ok(((unsigned >> 1) as i64) ^ (-((unsigned & 1) as i64)))
}

/// Decode a zig-zag varint into an `i32`.
pub fn read_int(r: &mut ByteReader<'_>) -> Result<i32, DecodeError> {
    let unsigned = read_raw(r, 32)? as u32;
    Ok(((unsigned >> 1) as i32) ^ (-((unsigned & 1) as i32)))
}

/// Skip one varint without decoding it.
pub fn skip_varint(r: &mut ByteReader<'_>) -> Result<(), DecodeError> {
    let start = r.position();
    for _ in 0..10 {
        if r.read_byte()? & 0x80 == 0 {
            return Ok(());
        }
    }
    Err(DecodeError::VarintOverflow {
        offset: start,
        bits: 64,
    })
}

/// Append a raw unsigned varint.
pub fn write_raw(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Append a zig-zag encoded `i64`.
pub fn write_long(out: &mut Vec<u8>, value: i64) {
    write_raw(out, ((value << 1) ^ (value >> 63)) as u64);
}

/// Append a zig-zag encoded `i32`.
pub fn write_int(out: &mut Vec<u8>, value: i32) {
    write_raw(out, ((value << 1) ^ (value >> 31)) as u32 as u64);
}
