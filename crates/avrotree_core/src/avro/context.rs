use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::avro::array::ArrayValue;
use crate::avro::map::MapValue;
use crate::avro::named::{EnumValue, FixedValue};
use crate::avro::record::RecordValue;
use crate::avro::scalar::Scalar;
use crate::avro::union::UnionValue;
use crate::avro::value::{DeferredValue, State};
use crate::avro::{AvroError, ParentLink, Result, Schema, SchemaKind, SchemaNode, Shape, ValueNode};

/// Runtime limits and encoder switches shared by every node of a tree.
#[derive(Debug, Clone)]
pub struct ValueOptions {
	/// Maximum node depth, bounding recursion through self-referential schemas.
	pub max_depth: u32,
	/// Maximum item count accepted in one array or map block.
	pub max_block_items: usize,
	/// Maximum accepted `bytes`/`string` length.
	pub max_bytes_len: usize,
	/// Split written arrays and maps into blocks of at most this many items.
	pub write_block_items: Option<NonZeroUsize>,
	/// Write negative block counts followed by the block byte size.
	pub write_block_sizes: bool,
}

impl Default for ValueOptions {
	fn default() -> Self {
		Self {
			max_depth: 1024,
			max_block_items: 1 << 20,
			max_bytes_len: 64 << 20,
			write_block_items: None,
			write_block_sizes: false,
		}
	}
}

impl ValueOptions {
	/// Preset producing output readers can skip block by block.
	pub fn for_skippable_output() -> Self {
		Self {
			write_block_items: NonZeroUsize::new(1024),
			write_block_sizes: true,
			..Self::default()
		}
	}
}

/// Tree builder and named-type registry for one schema.
///
/// The context is immutable once built and shared by every node it creates;
/// containers call back into it to build elements during decode.
#[derive(Debug)]
pub struct ValueContext<'s> {
	root: SchemaNode<'s>,
	named: HashMap<String, SchemaNode<'s>>,
	options: ValueOptions,
}

impl<'s> ValueContext<'s> {
	/// Register the schema's named types using default options.
	pub fn new(schema: &'s Schema) -> Result<Arc<Self>> {
		Self::with_options(schema, ValueOptions::default())
	}

	/// Register the schema's named types.
	pub fn with_options(schema: &'s Schema, options: ValueOptions) -> Result<Arc<Self>> {
		let root = schema.root();
		let mut named = HashMap::new();
		register(root, &mut named)?;
		tracing::debug!(named = named.len(), "value context ready");
		Ok(Arc::new(Self { root, named, options }))
	}

	/// Limits and encoder switches.
	pub fn options(&self) -> &ValueOptions {
		&self.options
	}

	/// Schema root the context was built from.
	pub fn root_schema(&self) -> SchemaNode<'s> {
		self.root
	}

	/// Definition of a named type by full name.
	pub fn lookup(&self, fullname: &str) -> Option<SchemaNode<'s>> {
		self.named.get(fullname).copied()
	}

	/// Full names of every registered type, sorted.
	pub fn named_types(&self) -> Vec<&str> {
		let mut out: Vec<&str> = self.named.keys().map(String::as_str).collect();
		out.sort_unstable();
		out
	}

	/// Follow references and wrappers to the defining node and its kind.
	pub fn resolve(&self, schema: SchemaNode<'s>) -> Result<(SchemaKind, SchemaNode<'s>)> {
		let mut node = schema;
		loop {
			match node.shape()? {
				Shape::Kind(kind) => return Ok((kind, node)),
				Shape::Wrapped(inner) => node = inner,
				Shape::Reference(name) => {
					let candidates = node.qualify(name);
					let found = candidates.iter().find_map(|candidate| self.lookup(candidate));
					let Some(found) = found else {
						return Err(AvroError::UnknownType {
							name: candidates.into_iter().next().unwrap_or_default(),
						});
					};
					node = found;
				}
			}
		}
	}

	/// Build the value tree for the schema root.
	pub fn create_root(self: &Arc<Self>) -> Result<ValueNode<'s>> {
		let root = self.build(self.root, None)?;
		tracing::debug!(kind = %root.kind(), "built value tree");
		Ok(root)
	}

	/// Build a standalone tree for any node of this context's schema.
	pub fn create(self: &Arc<Self>, schema: SchemaNode<'s>) -> Result<ValueNode<'s>> {
		self.build(schema, None)
	}

	/// Build one node under `parent`, with a fresh recursion guard.
	pub(crate) fn build(self: &Arc<Self>, schema: SchemaNode<'s>, parent: Option<ParentLink>) -> Result<ValueNode<'s>> {
		Builder { cx: self, building: Vec::new() }.node(schema, parent)
	}
}

fn register<'s>(node: SchemaNode<'s>, named: &mut HashMap<String, SchemaNode<'s>>) -> Result<()> {
	let kind = match node.shape()? {
		Shape::Reference(_) => return Ok(()),
		Shape::Wrapped(inner) => return register(inner, named),
		Shape::Kind(kind) => kind,
	};

	if kind.is_named() {
		let name = node.fullname().ok_or(AvroError::MissingAttribute { kind, attr: "name" })?;
		tracing::debug!(name = %name, %kind, "registered named type");
		if named.insert(name.clone(), node).is_some() {
			return Err(AvroError::DuplicateName { name });
		}
	}

	match kind {
		SchemaKind::Array => {
			if let Some(items) = node.attr("items") {
				register(items, named)?;
			}
		}
		SchemaKind::Map => {
			if let Some(values) = node.attr("values") {
				register(values, named)?;
			}
		}
		SchemaKind::Record => {
			if let Some(fields) = node.attr("fields").and_then(|fields| fields.list()) {
				for ty in fields.filter_map(|field| field.attr("type")) {
					register(ty, named)?;
				}
			}
		}
		SchemaKind::Union => {
			if let Some(branches) = node.list() {
				for branch in branches {
					register(branch, named)?;
				}
			}
		}
		_ => {}
	}
	Ok(())
}

/// Recursive node construction with a guard against re-entering named types.
pub(crate) struct Builder<'c, 's> {
	cx: &'c Arc<ValueContext<'s>>,
	building: Vec<String>,
}

impl<'c, 's> Builder<'c, 's> {
	pub(crate) fn context(&self) -> &ValueContext<'s> {
		self.cx
	}

	/// Build the node for `schema`.
	///
	/// A named type already under construction on this path becomes a deferred
	/// node, built the first time it is read or assigned.
	pub(crate) fn node(&mut self, schema: SchemaNode<'s>, parent: Option<ParentLink>) -> Result<ValueNode<'s>> {
		let (kind, def) = self.cx.resolve(schema)?;
		let depth = parent.map_or(0, |parent| parent.depth + 1);
		if depth > self.cx.options.max_depth {
			return Err(AvroError::DepthExceeded {
				max_depth: self.cx.options.max_depth,
			});
		}

		let name = if kind.is_named() { def.fullname() } else { None };
		if let Some(name) = &name
			&& self.building.contains(name)
		{
			return Ok(ValueNode {
				cx: Arc::clone(self.cx),
				schema: def,
				kind,
				parent,
				state: State::Deferred(DeferredValue {
					kind,
					target: def,
					parent,
					node: None,
				}),
			});
		}

		if let Some(name) = &name {
			self.building.push(name.clone());
		}
		let state = self.state(kind, def, ParentLink { kind, depth });
		if name.is_some() {
			self.building.pop();
		}

		Ok(ValueNode {
			cx: Arc::clone(self.cx),
			schema: def,
			kind,
			parent,
			state: state?,
		})
	}

	fn state(&mut self, kind: SchemaKind, def: SchemaNode<'s>, link: ParentLink) -> Result<State<'s>> {
		Ok(match kind {
			SchemaKind::Null => State::Null(Scalar::new()),
			SchemaKind::Boolean => State::Boolean(Scalar::new()),
			SchemaKind::Int => State::Int(Scalar::new()),
			SchemaKind::Long => State::Long(Scalar::new()),
			SchemaKind::Float => State::Float(Scalar::new()),
			SchemaKind::Double => State::Double(Scalar::new()),
			SchemaKind::Bytes => State::Bytes(Scalar::new()),
			SchemaKind::String => State::String(Scalar::new()),
			SchemaKind::Fixed => State::Fixed(FixedValue::create(def)?),
			SchemaKind::Enum => State::Enum(EnumValue::create(def)?),
			SchemaKind::Array => State::Array(ArrayValue::create(self, def, link)?),
			SchemaKind::Map => State::Map(MapValue::create(self, def, link)?),
			SchemaKind::Record => State::Record(RecordValue::create(self, def, link)?),
			SchemaKind::Union => State::Union(UnionValue::create(self, def, link)?),
		})
	}
}
