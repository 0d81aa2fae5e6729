use std::sync::Arc;

use crate::avro::arena::Arena;
use crate::avro::block::{check_block_count, read_block_header, write_blocks};
use crate::avro::context::Builder;
use crate::avro::io::{AvroRead, AvroWrite};
use crate::avro::scalar::{read_string, write_len_prefixed};
use crate::avro::value::ValueType;
use crate::avro::{AvroError, Datum, ParentLink, Result, SchemaKind, SchemaNode, ValueContext, ValueNode};

/// One decoded map entry.
pub struct MapEntry<'s> {
	key: String,
	value: ValueNode<'s>,
}

impl<'s> MapEntry<'s> {
	/// Entry key.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Entry value node.
	pub fn value(&self) -> &ValueNode<'s> {
		&self.value
	}

	fn clear(&mut self) {
		self.key.clear();
		self.value.clear();
	}
}

/// Map state: decoded entries plus the blueprint for entry values.
pub(crate) struct MapValue<'s> {
	pub(crate) template: Box<ValueNode<'s>>,
	pub(crate) entries: Arena<MapEntry<'s>>,
	pub(crate) set: bool,
	link: ParentLink,
}

impl<'s> MapValue<'s> {
	pub(crate) fn create(builder: &mut Builder<'_, 's>, schema: SchemaNode<'s>, link: ParentLink) -> Result<Self> {
		let values = schema.attr("values").ok_or(AvroError::MissingAttribute {
			kind: SchemaKind::Map,
			attr: "values",
		})?;
		let template = builder.node(values, Some(link))?;
		Ok(Self {
			template: Box::new(template),
			entries: Arena::new(),
			set: false,
			link,
		})
	}

	fn push_entry(&mut self, cx: &Arc<ValueContext<'s>>, key: String) -> Result<&mut MapEntry<'s>> {
		let Self { template, entries, link, .. } = self;
		let entry = entries.alloc_with(
			|| {
				Ok(MapEntry {
					key: String::new(),
					value: cx.build(template.schema(), Some(*link))?,
				})
			},
			MapEntry::clear,
		)?;
		entry.key = key;
		Ok(entry)
	}
}

impl<'s> ValueType<'s> for MapValue<'s> {
	fn is_set(&self) -> bool {
		self.set
	}

	fn reset(&mut self) {
		self.entries.clear();
		self.set = false;
	}

	fn read(&mut self, cx: &Arc<ValueContext<'s>>, reader: &mut dyn AvroRead) -> Result<()> {
		self.reset();
		while let Some(header) = read_block_header(reader)? {
			let count = check_block_count(header, cx.options())?;
			tracing::trace!(count, sized = header.size.is_some(), "map block");
			for _ in 0..count {
				let key = read_string(reader, cx.options())?;
				self.push_entry(cx, key)?.value.read_dyn(reader)?;
			}
		}
		self.set = true;
		Ok(())
	}

	fn write(&self, cx: &ValueContext<'s>, writer: &mut dyn AvroWrite) -> Result<()> {
		if !self.set {
			return Err(AvroError::ValueNotSet { kind: SchemaKind::Map });
		}
		write_blocks(writer, self.entries.live(), cx.options(), |entry, out| {
			write_len_prefixed(out, entry.key.as_bytes())?;
			entry.value.write_dyn(out)
		})
	}

	fn get(&self) -> Result<Datum> {
		if !self.set {
			return Err(AvroError::ValueNotSet { kind: SchemaKind::Map });
		}
		let entries = self
			.entries
			.live()
			.iter()
			.map(|entry| Ok((entry.key.clone(), entry.value.get()?)))
			.collect::<Result<Vec<_>>>()?;
		Ok(Datum::Map(entries))
	}

	fn set(&mut self, cx: &Arc<ValueContext<'s>>, datum: &Datum) -> Result<()> {
		let Datum::Map(entries) = datum else {
			return Err(AvroError::mismatch(SchemaKind::Map, datum.label()));
		};
		self.reset();
		for (key, value) in entries {
			self.push_entry(cx, key.clone())?.value.set(value)?;
		}
		self.set = true;
		Ok(())
	}
}
