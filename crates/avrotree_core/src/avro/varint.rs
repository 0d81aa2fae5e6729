//! Zig-zag variable-length integers.
//!
//! Every `int`/`long` scalar and every length or block-count prefix uses this
//! encoding: the signed value is zig-zag mapped (`n >= 0 -> 2n`,
//! `n < 0 -> -2n-1`) and then emitted seven bits at a time, least significant
//! group first, with `0x80` marking that another byte follows.

use crate::avro::io::AvroRead;
use crate::avro::{AvroError, Result};

/// Longest encoding of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

/// Map a signed value onto the unsigned zig-zag domain.
pub fn zigzag(value: i64) -> u64 {
	((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag`].
pub fn unzigzag(value: u64) -> i64 {
	((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Append the encoding of `value` to `out`, returning the number of bytes written.
pub fn write_long(out: &mut Vec<u8>, value: i64) -> usize {
	let mut raw = zigzag(value);
	let start = out.len();
	loop {
		let byte = (raw & 0x7f) as u8;
		raw >>= 7;
		if raw == 0 {
			out.push(byte);
			break;
		}
		out.push(byte | 0x80);
	}
	out.len() - start
}

/// Encode `value` into a fresh buffer.
pub fn encode_long(value: i64) -> Vec<u8> {
	let mut out = Vec::with_capacity(MAX_VARINT_LEN);
	write_long(&mut out, value);
	out
}

/// Decode one value from the front of `bytes`, returning it with the number of bytes consumed.
pub fn decode_long(bytes: &[u8]) -> Result<(i64, usize)> {
	let mut raw = 0_u64;
	for (idx, byte) in bytes.iter().copied().enumerate() {
		raw = accumulate(raw, idx, byte, 0)?;
		if byte & 0x80 == 0 {
			return Ok((unzigzag(raw), idx + 1));
		}
	}
	Err(AvroError::TruncatedInput {
		at: bytes.len() as u64,
		need: 1,
	})
}

/// Read one `long` from a stream.
pub fn read_long<R: AvroRead + ?Sized>(reader: &mut R) -> Result<i64> {
	let at = reader.position();
	let mut raw = 0_u64;
	for idx in 0..MAX_VARINT_LEN {
		let byte = reader.read_u8()?;
		raw = accumulate(raw, idx, byte, at)?;
		if byte & 0x80 == 0 {
			return Ok(unzigzag(raw));
		}
	}
	Err(AvroError::VarintOverflow { at })
}

/// Read one `int`, rejecting values outside the 32-bit range.
pub fn read_int<R: AvroRead + ?Sized>(reader: &mut R) -> Result<i32> {
	let value = read_long(reader)?;
	i32::try_from(value).map_err(|_| AvroError::IntOverflow { value })
}

/// Advance past one varint without interpreting it.
pub fn skip_varint<R: AvroRead + ?Sized>(reader: &mut R) -> Result<()> {
	let at = reader.position();
	for _ in 0..MAX_VARINT_LEN {
		if reader.read_u8()? & 0x80 == 0 {
			return Ok(());
		}
	}
	Err(AvroError::VarintOverflow { at })
}

fn accumulate(raw: u64, idx: usize, byte: u8, at: u64) -> Result<u64> {
	if idx >= MAX_VARINT_LEN {
		return Err(AvroError::VarintOverflow { at });
	}
	let group = u64::from(byte & 0x7f);
	// The tenth byte may only carry the single remaining bit.
	if idx == MAX_VARINT_LEN - 1 && group > 1 {
		return Err(AvroError::VarintOverflow { at });
	}
	Ok(raw | (group << (7 * idx)))
}

#[cfg(test)]
mod tests;
