use crate::avro::block::{check_block_count, read_block_header};
use crate::avro::io::AvroRead;
use crate::avro::named::{enum_symbols, fixed_size};
use crate::avro::record::record_fields;
use crate::avro::scalar::read_len;
use crate::avro::varint::skip_varint;
use crate::avro::{AvroError, Result, SchemaKind, SchemaNode, ValueContext, ValueOptions};

/// Advance `reader` past one value of `schema` without building any node.
///
/// Blocks that carry a byte size are jumped over whole; the rest are walked
/// item by item.
pub(crate) fn skip_value<'s>(cx: &ValueContext<'s>, schema: SchemaNode<'s>, reader: &mut dyn AvroRead, depth: u32) -> Result<()> {
	let max_depth = cx.options().max_depth;
	if depth > max_depth {
		return Err(AvroError::DepthExceeded { max_depth });
	}

	let (kind, def) = cx.resolve(schema)?;
	match kind {
		SchemaKind::Null => Ok(()),
		SchemaKind::Boolean => reader.skip_bytes(1),
		SchemaKind::Int | SchemaKind::Long => skip_varint(reader),
		SchemaKind::Float => reader.skip_bytes(4),
		SchemaKind::Double => reader.skip_bytes(8),
		SchemaKind::Bytes | SchemaKind::String => {
			let len = read_len(reader, cx.options())?;
			reader.skip_bytes(len as u64)
		}
		SchemaKind::Fixed => reader.skip_bytes(fixed_size(def)? as u64),
		SchemaKind::Enum => {
			let symbols = enum_symbols(def.attr("symbols").ok_or(AvroError::MissingAttribute { kind, attr: "symbols" })?)?;
			let index = reader.read_int()?;
			if usize::try_from(index).map_or(true, |idx| idx >= symbols.len()) {
				return Err(AvroError::EnumIndexOutOfRange {
					index: i64::from(index),
					symbols: symbols.len(),
				});
			}
			Ok(())
		}
		SchemaKind::Array => {
			let items = def.attr("items").ok_or(AvroError::MissingAttribute { kind, attr: "items" })?;
			skip_blocks(reader, cx.options(), |reader| skip_value(cx, items, reader, depth + 1))
		}
		SchemaKind::Map => {
			let values = def.attr("values").ok_or(AvroError::MissingAttribute { kind, attr: "values" })?;
			skip_blocks(reader, cx.options(), |reader| {
				let len = read_len(reader, cx.options())?;
				reader.skip_bytes(len as u64)?;
				skip_value(cx, values, reader, depth + 1)
			})
		}
		SchemaKind::Record => {
			for (_, ty) in record_fields(def)? {
				skip_value(cx, ty, reader, depth + 1)?;
			}
			Ok(())
		}
		SchemaKind::Union => {
			let branches: Vec<_> = def.list().map(Iterator::collect).unwrap_or_default();
			let raw = reader.read_long()?;
			let branch = usize::try_from(raw).ok().and_then(|idx| branches.get(idx).copied());
			let Some(branch) = branch else {
				return Err(AvroError::UnionBranchOutOfRange {
					index: raw,
					branches: branches.len(),
				});
			};
			skip_value(cx, branch, reader, depth + 1)
		}
	}
}

fn skip_blocks(reader: &mut dyn AvroRead, options: &ValueOptions, mut skip_item: impl FnMut(&mut dyn AvroRead) -> Result<()>) -> Result<()> {
	while let Some(header) = read_block_header(reader)? {
		check_block_count(header, options)?;
		match header.size {
			Some(size) => {
				tracing::trace!(count = header.count, size, "skipping sized block");
				reader.skip_bytes(size)?;
			}
			None => {
				tracing::trace!(count = header.count, "skipping block item by item");
				for _ in 0..header.count {
					skip_item(&mut *reader)?;
				}
			}
		}
	}
	Ok(())
}
