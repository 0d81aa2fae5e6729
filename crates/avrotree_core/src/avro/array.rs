use std::sync::Arc;

use crate::avro::arena::Arena;
use crate::avro::block::{check_block_count, read_block_header, write_blocks};
use crate::avro::context::Builder;
use crate::avro::io::{AvroRead, AvroWrite};
use crate::avro::value::ValueType;
use crate::avro::{AvroError, Datum, ParentLink, Result, SchemaKind, SchemaNode, ValueContext, ValueNode};

/// Array state: decoded elements plus the blueprint used to build more.
pub(crate) struct ArrayValue<'s> {
	pub(crate) template: Box<ValueNode<'s>>,
	pub(crate) elements: Arena<ValueNode<'s>>,
	pub(crate) set: bool,
	link: ParentLink,
}

impl<'s> ArrayValue<'s> {
	pub(crate) fn create(builder: &mut Builder<'_, 's>, schema: SchemaNode<'s>, link: ParentLink) -> Result<Self> {
		let items = schema.attr("items").ok_or(AvroError::MissingAttribute {
			kind: SchemaKind::Array,
			attr: "items",
		})?;
		let template = builder.node(items, Some(link))?;
		Ok(Self {
			template: Box::new(template),
			elements: Arena::new(),
			set: false,
			link,
		})
	}

	/// Append an element built from the template's schema, recycling a retired one when possible.
	fn push_element(&mut self, cx: &Arc<ValueContext<'s>>) -> Result<&mut ValueNode<'s>> {
		let Self { template, elements, link, .. } = self;
		elements.alloc_with(|| cx.build(template.schema(), Some(*link)), ValueNode::clear)
	}
}

impl<'s> ValueType<'s> for ArrayValue<'s> {
	fn is_set(&self) -> bool {
		self.set
	}

	fn reset(&mut self) {
		self.elements.clear();
		self.set = false;
	}

	fn read(&mut self, cx: &Arc<ValueContext<'s>>, reader: &mut dyn AvroRead) -> Result<()> {
		self.reset();
		while let Some(header) = read_block_header(reader)? {
			let count = check_block_count(header, cx.options())?;
			tracing::trace!(count, sized = header.size.is_some(), "array block");
			for _ in 0..count {
				self.push_element(cx)?.read_dyn(reader)?;
			}
		}
		self.set = true;
		Ok(())
	}

	fn write(&self, cx: &ValueContext<'s>, writer: &mut dyn AvroWrite) -> Result<()> {
		if !self.set {
			return Err(AvroError::ValueNotSet { kind: SchemaKind::Array });
		}
		write_blocks(writer, self.elements.live(), cx.options(), |item, out| item.write_dyn(out))
	}

	fn get(&self) -> Result<Datum> {
		if !self.set {
			return Err(AvroError::ValueNotSet { kind: SchemaKind::Array });
		}
		let items = self.elements.live().iter().map(ValueNode::get).collect::<Result<Vec<_>>>()?;
		Ok(Datum::Array(items))
	}

	fn set(&mut self, cx: &Arc<ValueContext<'s>>, datum: &Datum) -> Result<()> {
		let Datum::Array(items) = datum else {
			return Err(AvroError::mismatch(SchemaKind::Array, datum.label()));
		};
		self.reset();
		for item in items {
			self.push_element(cx)?.set(item)?;
		}
		self.set = true;
		Ok(())
	}
}
