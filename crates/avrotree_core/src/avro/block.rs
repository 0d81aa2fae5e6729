//! Block framing shared by arrays and maps.
//!
//! A container is a run of blocks closed by a zero count. A positive count `n`
//! is followed by `n` items. A negative count `-n` is followed by the block's
//! byte size and then `n` items, which lets a skipper jump over the block.

use crate::avro::io::{AvroRead, AvroWrite};
use crate::avro::{AvroError, Result, ValueOptions};

/// Decoded block prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockHeader {
	/// Number of items in the block.
	pub(crate) count: u64,
	/// Byte size of the items, when the writer recorded it.
	pub(crate) size: Option<u64>,
}

/// Read the next block prefix; `None` marks the terminating zero count.
pub(crate) fn read_block_header(reader: &mut dyn AvroRead) -> Result<Option<BlockHeader>> {
	let raw = reader.read_long()?;
	if raw == 0 {
		return Ok(None);
	}
	if raw > 0 {
		return Ok(Some(BlockHeader { count: raw as u64, size: None }));
	}

	let count = raw.unsigned_abs();
	let size = reader.read_long()?;
	if size < 0 {
		return Err(AvroError::InvalidBlockSize { size, count });
	}
	Ok(Some(BlockHeader {
		count,
		size: Some(size as u64),
	}))
}

/// Reject counts above the configured ceiling before allocating for them.
pub(crate) fn check_block_count(header: BlockHeader, options: &ValueOptions) -> Result<usize> {
	match usize::try_from(header.count) {
		Ok(count) if count <= options.max_block_items => Ok(count),
		_ => Err(AvroError::BlockTooLarge {
			count: header.count,
			max: options.max_block_items,
		}),
	}
}

/// Write `items` as blocks per `options`, then the terminating zero count.
///
/// `write_item` encodes one item into the supplied sink.
pub(crate) fn write_blocks<T>(
	writer: &mut dyn AvroWrite,
	items: &[T],
	options: &ValueOptions,
	mut write_item: impl FnMut(&T, &mut dyn AvroWrite) -> Result<()>,
) -> Result<()> {
	if !items.is_empty() {
		let chunk = options.write_block_items.map_or(items.len(), |limit| limit.get());
		let mut scratch: Vec<u8> = Vec::new();
		for block in items.chunks(chunk) {
			if options.write_block_sizes {
				scratch.clear();
				for item in block {
					write_item(item, &mut scratch as &mut dyn AvroWrite)?;
				}
				writer.write_long(-(block.len() as i64))?;
				writer.write_long(scratch.len() as i64)?;
				writer.write_bytes(&scratch)?;
			} else {
				writer.write_long(block.len() as i64)?;
				for item in block {
					write_item(item, &mut *writer)?;
				}
			}
			tracing::trace!(items = block.len(), sized = options.write_block_sizes, "wrote block");
		}
	}
	writer.write_long(0)
}
