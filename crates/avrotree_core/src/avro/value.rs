use std::fmt;
use std::sync::Arc;

use crate::avro::array::ArrayValue;
use crate::avro::io::{AvroRead, AvroWrite};
use crate::avro::map::{MapEntry, MapValue};
use crate::avro::named::{EnumValue, FixedValue};
use crate::avro::print::{PrintOptions, Printer};
use crate::avro::record::{RecordField, RecordValue};
use crate::avro::scalar::Scalar;
use crate::avro::union::UnionValue;
use crate::avro::{AvroError, Datum, Result, SchemaKind, SchemaNode, ValueContext, skip};

/// Non-owning handle from a node to its parent position.
///
/// Parents always outlive their children, so the handle only records what
/// diagnostics need: the parent's type and its distance from the tree root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
	/// Parent node type.
	pub kind: SchemaKind,
	/// Parent depth; the root sits at 0.
	pub depth: u32,
}

/// Runtime value built from one schema position.
///
/// A node is created once by a [`ValueContext`] and then read, skipped,
/// written and printed any number of times. Containers keep their elements in
/// an arena that is reset before every decode.
pub struct ValueNode<'s> {
	pub(crate) cx: Arc<ValueContext<'s>>,
	pub(crate) schema: SchemaNode<'s>,
	pub(crate) kind: SchemaKind,
	pub(crate) parent: Option<ParentLink>,
	pub(crate) state: State<'s>,
}

pub(crate) enum State<'s> {
	Null(Scalar<()>),
	Boolean(Scalar<bool>),
	Int(Scalar<i32>),
	Long(Scalar<i64>),
	Float(Scalar<f32>),
	Double(Scalar<f64>),
	Bytes(Scalar<Vec<u8>>),
	String(Scalar<String>),
	Fixed(FixedValue),
	Enum(EnumValue<'s>),
	Array(ArrayValue<'s>),
	Map(MapValue<'s>),
	Record(RecordValue<'s>),
	Union(UnionValue<'s>),
	Deferred(DeferredValue<'s>),
}

/// Per-type half of the node contract; [`ValueNode`] dispatches to it.
pub(crate) trait ValueType<'s> {
	/// Whether a value is currently held.
	fn is_set(&self) -> bool;

	/// Drop the current value and release transient children.
	fn reset(&mut self);

	/// Decode this type's binary layout.
	fn read(&mut self, cx: &Arc<ValueContext<'s>>, reader: &mut dyn AvroRead) -> Result<()>;

	/// Encode the current value.
	fn write(&self, cx: &ValueContext<'s>, writer: &mut dyn AvroWrite) -> Result<()>;

	/// Snapshot the current value.
	fn get(&self) -> Result<Datum>;

	/// Replace the current value.
	fn set(&mut self, cx: &Arc<ValueContext<'s>>, datum: &Datum) -> Result<()>;
}

impl<'s> State<'s> {
	fn as_dyn(&self) -> &dyn ValueType<'s> {
		match self {
			Self::Null(value) => value,
			Self::Boolean(value) => value,
			Self::Int(value) => value,
			Self::Long(value) => value,
			Self::Float(value) => value,
			Self::Double(value) => value,
			Self::Bytes(value) => value,
			Self::String(value) => value,
			Self::Fixed(value) => value,
			Self::Enum(value) => value,
			Self::Array(value) => value,
			Self::Map(value) => value,
			Self::Record(value) => value,
			Self::Union(value) => value,
			Self::Deferred(value) => value,
		}
	}

	fn as_dyn_mut(&mut self) -> &mut dyn ValueType<'s> {
		match self {
			Self::Null(value) => value,
			Self::Boolean(value) => value,
			Self::Int(value) => value,
			Self::Long(value) => value,
			Self::Float(value) => value,
			Self::Double(value) => value,
			Self::Bytes(value) => value,
			Self::String(value) => value,
			Self::Fixed(value) => value,
			Self::Enum(value) => value,
			Self::Array(value) => value,
			Self::Map(value) => value,
			Self::Record(value) => value,
			Self::Union(value) => value,
			Self::Deferred(value) => value,
		}
	}
}

impl<'s> ValueNode<'s> {
	/// Type of this node; always the kind of its schema definition.
	pub fn kind(&self) -> SchemaKind {
		self.kind
	}

	/// Schema definition this node was built from.
	pub fn schema(&self) -> SchemaNode<'s> {
		self.schema
	}

	/// Context the node was built by.
	pub fn context(&self) -> &Arc<ValueContext<'s>> {
		&self.cx
	}

	/// Handle to the parent position, `None` for a tree root.
	pub fn parent(&self) -> Option<ParentLink> {
		self.parent
	}

	/// Distance from the tree root.
	pub fn depth(&self) -> u32 {
		self.parent.map_or(0, |parent| parent.depth + 1)
	}

	/// Whether the node holds a value that can be written.
	pub fn is_set(&self) -> bool {
		self.state.as_dyn().is_set()
	}

	/// Drop the current value; containers release their elements.
	pub fn clear(&mut self) {
		self.state.as_dyn_mut().reset();
	}

	/// Decode one value from `reader`, replacing whatever the node held.
	///
	/// On failure the node is left unset. Containers keep the elements decoded
	/// before the failure so callers can inspect them alongside the error.
	pub fn read(&mut self, reader: &mut impl AvroRead) -> Result<()> {
		self.read_dyn(reader)
	}

	pub(crate) fn read_dyn(&mut self, reader: &mut dyn AvroRead) -> Result<()> {
		let Self { cx, state, .. } = self;
		state.as_dyn_mut().read(cx, reader)
	}

	/// Advance `reader` past one encoded value without keeping it.
	///
	/// Scalars keep their current value. Arrays, maps, records and unions are
	/// cleared through their whole subtree and become unset.
	pub fn skip(&mut self, reader: &mut impl AvroRead) -> Result<()> {
		self.skip_dyn(reader)
	}

	pub(crate) fn skip_dyn(&mut self, reader: &mut dyn AvroRead) -> Result<()> {
		if matches!(self.kind, SchemaKind::Array | SchemaKind::Map | SchemaKind::Record | SchemaKind::Union) {
			self.clear();
		}
		skip::skip_value(&self.cx, self.schema, reader, self.depth())
	}

	/// Encode the current value.
	pub fn write(&self, writer: &mut impl AvroWrite) -> Result<()> {
		self.write_dyn(writer)
	}

	pub(crate) fn write_dyn(&self, writer: &mut dyn AvroWrite) -> Result<()> {
		if !self.is_set() {
			return Err(AvroError::ValueNotSet { kind: self.kind });
		}
		self.state.as_dyn().write(&self.cx, writer)
	}

	/// Encode the current value into a fresh buffer.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		let mut out = Vec::new();
		self.write_dyn(&mut out)?;
		Ok(out)
	}

	/// Snapshot the current value.
	pub fn get(&self) -> Result<Datum> {
		self.state.as_dyn().get()
	}

	/// Assign a value, checking it against the schema.
	///
	/// On failure the node is left unset.
	pub fn set(&mut self, datum: &Datum) -> Result<()> {
		let Self { cx, state, .. } = self;
		let out = state.as_dyn_mut().set(cx, datum);
		if out.is_err() {
			state.as_dyn_mut().reset();
		}
		out
	}

	/// Write an indented structural dump to `sink`.
	pub fn print(&self, sink: &mut dyn fmt::Write) -> fmt::Result {
		self.print_with(sink, PrintOptions::default())
	}

	/// [`ValueNode::print`] with explicit truncation limits.
	pub fn print_with(&self, sink: &mut dyn fmt::Write, options: PrintOptions) -> fmt::Result {
		Printer::new(sink, options, self.depth()).node(self, None)
	}

	/// Node a materialized deferred position stands for; `self` otherwise.
	pub fn resolved(&self) -> &ValueNode<'s> {
		match &self.state {
			State::Deferred(DeferredValue { node: Some(inner), .. }) => inner.resolved(),
			_ => self,
		}
	}

	fn resolved_mut(&mut self) -> &mut ValueNode<'s> {
		match self.state {
			State::Deferred(DeferredValue { node: Some(ref mut inner), .. }) => inner.resolved_mut(),
			_ => self,
		}
	}

	/// Decoded array elements; empty for other kinds.
	pub fn elements(&self) -> &[ValueNode<'s>] {
		match &self.resolved().state {
			State::Array(array) => array.elements.live(),
			_ => &[],
		}
	}

	/// Array element at `index`.
	pub fn element(&self, index: usize) -> Option<&ValueNode<'s>> {
		self.elements().get(index)
	}

	/// Decoded map entries in stream order; empty for other kinds.
	pub fn entries(&self) -> &[MapEntry<'s>] {
		match &self.resolved().state {
			State::Map(map) => map.entries.live(),
			_ => &[],
		}
	}

	/// Record fields in declared order; empty for other kinds.
	pub fn fields(&self) -> &[RecordField<'s>] {
		match &self.resolved().state {
			State::Record(record) => &record.fields,
			_ => &[],
		}
	}

	/// Record field by name.
	pub fn field(&self, name: &str) -> Option<&ValueNode<'s>> {
		self.fields().iter().find(|field| field.name() == name).map(RecordField::value)
	}

	/// Mutable record field by name.
	pub fn field_mut(&mut self, name: &str) -> Option<&mut ValueNode<'s>> {
		match &mut self.resolved_mut().state {
			State::Record(record) => record.fields.iter_mut().find(|field| field.name() == name).map(RecordField::value_mut),
			_ => None,
		}
	}

	/// Selected union branch index and node.
	pub fn branch(&self) -> Option<(usize, &ValueNode<'s>)> {
		match &self.resolved().state {
			State::Union(union) => union.selected.as_ref().map(|(idx, node)| (*idx, &**node)),
			_ => None,
		}
	}

	/// Select union branch `index`, keeping the branch node if it is already selected.
	pub fn select_branch(&mut self, index: usize) -> Result<&mut ValueNode<'s>> {
		let node = self.resolved_mut();
		let kind = node.kind;
		let Self { cx, state, .. } = node;
		match state {
			State::Union(union) => union.select(cx, index),
			_ => Err(AvroError::mismatch(kind, "union branch selection")),
		}
	}

	/// Blueprint element of an array or map.
	pub fn template(&self) -> Option<&ValueNode<'s>> {
		match &self.resolved().state {
			State::Array(array) => Some(&array.template),
			State::Map(map) => Some(&map.template),
			_ => None,
		}
	}

	/// Element, entry or field count.
	pub fn len(&self) -> usize {
		match &self.resolved().state {
			State::Array(array) => array.elements.len(),
			State::Map(map) => map.entries.len(),
			State::Record(record) => record.fields.len(),
			_ => 0,
		}
	}

	/// Whether [`ValueNode::len`] is zero.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Arena generation of an array or map; advances on every decode.
	pub fn arena_generation(&self) -> Option<u64> {
		match &self.resolved().state {
			State::Array(array) => Some(array.elements.generation()),
			State::Map(map) => Some(map.entries.generation()),
			_ => None,
		}
	}

	/// Whether this position is a not-yet-built recursive reference.
	pub fn is_deferred(&self) -> bool {
		matches!(self.state, State::Deferred(DeferredValue { node: None, .. }))
	}
}

impl fmt::Display for ValueNode<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.print(f)
	}
}

impl fmt::Debug for ValueNode<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ValueNode")
			.field("kind", &self.kind)
			.field("depth", &self.depth())
			.field("set", &self.is_set())
			.finish()
	}
}

/// Stand-in for a recursive named-type reference, built on first use.
pub(crate) struct DeferredValue<'s> {
	pub(crate) kind: SchemaKind,
	pub(crate) target: SchemaNode<'s>,
	pub(crate) parent: Option<ParentLink>,
	pub(crate) node: Option<Box<ValueNode<'s>>>,
}

impl<'s> DeferredValue<'s> {
	fn materialize(&mut self, cx: &Arc<ValueContext<'s>>) -> Result<&mut ValueNode<'s>> {
		if self.node.is_none() {
			tracing::trace!(kind = %self.kind, "materializing deferred node");
			self.node = Some(Box::new(cx.build(self.target, self.parent)?));
		}
		match self.node.as_deref_mut() {
			Some(node) => Ok(node),
			None => Err(AvroError::ValueNotSet { kind: self.kind }),
		}
	}
}

impl<'s> ValueType<'s> for DeferredValue<'s> {
	fn is_set(&self) -> bool {
		self.node.as_ref().is_some_and(|node| node.is_set())
	}

	fn reset(&mut self) {
		if let Some(node) = self.node.as_mut() {
			node.clear();
		}
	}

	fn read(&mut self, cx: &Arc<ValueContext<'s>>, reader: &mut dyn AvroRead) -> Result<()> {
		self.materialize(cx)?.read_dyn(reader)
	}

	fn write(&self, _cx: &ValueContext<'s>, writer: &mut dyn AvroWrite) -> Result<()> {
		match &self.node {
			Some(node) => node.write_dyn(writer),
			None => Err(AvroError::ValueNotSet { kind: self.kind }),
		}
	}

	fn get(&self) -> Result<Datum> {
		match &self.node {
			Some(node) => node.get(),
			None => Err(AvroError::ValueNotSet { kind: self.kind }),
		}
	}

	fn set(&mut self, cx: &Arc<ValueContext<'s>>, datum: &Datum) -> Result<()> {
		self.materialize(cx)?.set(datum)
	}
}

#[cfg(test)]
mod tests;
