use std::sync::Arc;

use crate::avro::io::{AvroRead, AvroWrite};
use crate::avro::value::ValueType;
use crate::avro::{AvroError, Datum, Result, SchemaKind, SchemaNode, ValueContext};

/// Enum symbol index over the declared symbol table.
pub(crate) struct EnumValue<'s> {
	pub(crate) symbols: Vec<&'s str>,
	pub(crate) index: Option<usize>,
}

impl<'s> EnumValue<'s> {
	pub(crate) fn create(schema: SchemaNode<'s>) -> Result<Self> {
		let symbols = schema.attr("symbols").ok_or(AvroError::MissingAttribute {
			kind: SchemaKind::Enum,
			attr: "symbols",
		})?;
		let symbols = enum_symbols(symbols)?;
		Ok(Self { symbols, index: None })
	}

	/// Symbol currently held.
	pub(crate) fn symbol(&self) -> Option<&'s str> {
		self.index.and_then(|idx| self.symbols.get(idx).copied())
	}
}

/// Validate and collect an enum `symbols` list.
pub(crate) fn enum_symbols(node: SchemaNode<'_>) -> Result<Vec<&str>> {
	let list = node.json().as_array().ok_or_else(|| AvroError::attr(SchemaKind::Enum, "symbols", "expected a list"))?;
	let mut symbols = Vec::with_capacity(list.len());
	for item in list {
		let symbol = item.as_str().ok_or_else(|| AvroError::attr(SchemaKind::Enum, "symbols", format!("non-string symbol {item}")))?;
		if symbols.contains(&symbol) {
			return Err(AvroError::attr(SchemaKind::Enum, "symbols", format!("duplicate symbol {symbol:?}")));
		}
		symbols.push(symbol);
	}
	Ok(symbols)
}

impl<'s> ValueType<'s> for EnumValue<'s> {
	fn is_set(&self) -> bool {
		self.index.is_some()
	}

	fn reset(&mut self) {
		self.index = None;
	}

	fn read(&mut self, _cx: &Arc<ValueContext<'s>>, reader: &mut dyn AvroRead) -> Result<()> {
		self.index = None;
		let index = reader.read_int()?;
		let idx = usize::try_from(index).ok().filter(|idx| *idx < self.symbols.len()).ok_or(AvroError::EnumIndexOutOfRange {
			index: i64::from(index),
			symbols: self.symbols.len(),
		})?;
		self.index = Some(idx);
		Ok(())
	}

	fn write(&self, _cx: &ValueContext<'s>, writer: &mut dyn AvroWrite) -> Result<()> {
		match self.index {
			Some(idx) => writer.write_long(idx as i64),
			None => Err(AvroError::ValueNotSet { kind: SchemaKind::Enum }),
		}
	}

	fn get(&self) -> Result<Datum> {
		self.symbol()
			.map(|symbol| Datum::Enum(symbol.to_owned()))
			.ok_or(AvroError::ValueNotSet { kind: SchemaKind::Enum })
	}

	fn set(&mut self, _cx: &Arc<ValueContext<'s>>, datum: &Datum) -> Result<()> {
		let Datum::Enum(symbol) = datum else {
			return Err(AvroError::mismatch(SchemaKind::Enum, datum.label()));
		};
		let idx = self
			.symbols
			.iter()
			.position(|item| *item == symbol.as_str())
			.ok_or_else(|| AvroError::mismatch(SchemaKind::Enum, format!("unknown symbol {symbol:?}")))?;
		self.index = Some(idx);
		Ok(())
	}
}

/// Fixed-size byte payload.
pub(crate) struct FixedValue {
	pub(crate) size: usize,
	pub(crate) bytes: Vec<u8>,
	pub(crate) set: bool,
}

impl FixedValue {
	pub(crate) fn create(schema: SchemaNode<'_>) -> Result<Self> {
		let size = fixed_size(schema)?;
		Ok(Self {
			size,
			bytes: Vec::with_capacity(size),
			set: false,
		})
	}
}

/// Validate and return a fixed `size` attribute.
pub(crate) fn fixed_size(schema: SchemaNode<'_>) -> Result<usize> {
	if schema.attr("size").is_none() {
		return Err(AvroError::MissingAttribute {
			kind: SchemaKind::Fixed,
			attr: "size",
		});
	}
	schema
		.attr_u64("size")
		.and_then(|size| usize::try_from(size).ok())
		.ok_or_else(|| AvroError::attr(SchemaKind::Fixed, "size", "expected a non-negative integer"))
}

impl<'s> ValueType<'s> for FixedValue {
	fn is_set(&self) -> bool {
		self.set
	}

	fn reset(&mut self) {
		self.set = false;
	}

	fn read(&mut self, _cx: &Arc<ValueContext<'s>>, reader: &mut dyn AvroRead) -> Result<()> {
		self.set = false;
		self.bytes.resize(self.size, 0);
		reader.read_exact(&mut self.bytes)?;
		self.set = true;
		Ok(())
	}

	fn write(&self, _cx: &ValueContext<'s>, writer: &mut dyn AvroWrite) -> Result<()> {
		if !self.set {
			return Err(AvroError::ValueNotSet { kind: SchemaKind::Fixed });
		}
		writer.write_bytes(&self.bytes)
	}

	fn get(&self) -> Result<Datum> {
		if !self.set {
			return Err(AvroError::ValueNotSet { kind: SchemaKind::Fixed });
		}
		Ok(Datum::Fixed(self.bytes.clone()))
	}

	fn set(&mut self, _cx: &Arc<ValueContext<'s>>, datum: &Datum) -> Result<()> {
		let (Datum::Fixed(bytes) | Datum::Bytes(bytes)) = datum else {
			return Err(AvroError::mismatch(SchemaKind::Fixed, datum.label()));
		};
		if bytes.len() != self.size {
			return Err(AvroError::FixedSizeMismatch {
				expected: self.size,
				got: bytes.len(),
			});
		}
		self.bytes.clear();
		self.bytes.extend_from_slice(bytes);
		self.set = true;
		Ok(())
	}
}
