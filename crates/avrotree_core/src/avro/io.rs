use std::io::{ErrorKind as IoErrorKind, Read, Write};

use crate::avro::varint;
use crate::avro::{AvroError, Result};

/// Byte source consumed by value nodes.
///
/// Implementations report a short stream as [`AvroError::TruncatedInput`] and
/// any other transport failure as [`AvroError::Io`].
pub trait AvroRead {
	/// Fill `buf` completely or fail.
	fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

	/// Advance `n` bytes without returning them.
	fn skip_bytes(&mut self, n: u64) -> Result<()>;

	/// Number of bytes consumed so far.
	fn position(&self) -> u64;

	/// Read a single byte.
	fn read_u8(&mut self) -> Result<u8> {
		let mut buf = [0_u8; 1];
		self.read_exact(&mut buf)?;
		Ok(buf[0])
	}

	/// Read exactly `n` bytes into a fresh buffer.
	fn read_vec(&mut self, n: usize) -> Result<Vec<u8>> {
		let mut out = vec![0_u8; n];
		self.read_exact(&mut out)?;
		Ok(out)
	}

	/// Read one zig-zag `long`.
	fn read_long(&mut self) -> Result<i64> {
		varint::read_long(self)
	}

	/// Read one zig-zag `int`.
	fn read_int(&mut self) -> Result<i32> {
		varint::read_int(self)
	}
}

/// Byte sink written by value nodes.
pub trait AvroWrite {
	/// Write all of `bytes` or fail.
	fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

	/// Write one zig-zag `long`.
	fn write_long(&mut self, value: i64) -> Result<()> {
		let mut buf = Vec::with_capacity(varint::MAX_VARINT_LEN);
		varint::write_long(&mut buf, value);
		self.write_bytes(&buf)
	}
}

impl<W: Write + ?Sized> AvroWrite for W {
	fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
		self.write_all(bytes)?;
		Ok(())
	}
}

/// Bounded cursor over an immutable byte slice.
pub struct SliceReader<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> SliceReader<'a> {
	/// Create a reader at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Whether every byte has been consumed.
	pub fn is_empty(&self) -> bool {
		self.remaining() == 0
	}

	/// Borrow exactly `n` bytes and advance.
	pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(AvroError::TruncatedInput {
				at: self.pos as u64,
				need: n - self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}
}

impl AvroRead for SliceReader<'_> {
	fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
		let raw = self.take(buf.len())?;
		buf.copy_from_slice(raw);
		Ok(())
	}

	fn skip_bytes(&mut self, n: u64) -> Result<()> {
		let n = usize::try_from(n).unwrap_or(usize::MAX);
		let _ = self.take(n)?;
		Ok(())
	}

	fn position(&self) -> u64 {
		self.pos as u64
	}
}

/// Adapter turning any [`Read`] into an [`AvroRead`], tracking the byte offset.
pub struct StreamReader<R> {
	inner: R,
	pos: u64,
}

impl<R: Read> StreamReader<R> {
	/// Wrap `inner`, starting the offset at 0.
	pub fn new(inner: R) -> Self {
		Self { inner, pos: 0 }
	}

	/// Unwrap the underlying reader.
	pub fn into_inner(self) -> R {
		self.inner
	}

	/// Report whether a buffered stream is exhausted without consuming anything.
	pub fn at_eof(&mut self) -> Result<bool>
	where
		R: std::io::BufRead,
	{
		Ok(self.inner.fill_buf()?.is_empty())
	}
}

impl<R: Read> AvroRead for StreamReader<R> {
	fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
		let mut filled = 0;
		while filled < buf.len() {
			match self.inner.read(&mut buf[filled..]) {
				Ok(0) => {
					self.pos += filled as u64;
					return Err(AvroError::TruncatedInput {
						at: self.pos,
						need: buf.len() - filled,
					});
				}
				Ok(n) => filled += n,
				Err(err) if err.kind() == IoErrorKind::Interrupted => {}
				Err(err) => return Err(AvroError::Io(err)),
			}
		}
		self.pos += filled as u64;
		Ok(())
	}

	fn skip_bytes(&mut self, n: u64) -> Result<()> {
		let copied = std::io::copy(&mut (&mut self.inner).take(n), &mut std::io::sink())?;
		self.pos += copied;
		if copied < n {
			return Err(AvroError::TruncatedInput {
				at: self.pos,
				need: usize::try_from(n - copied).unwrap_or(usize::MAX),
			});
		}
		Ok(())
	}

	fn position(&self) -> u64 {
		self.pos
	}
}
